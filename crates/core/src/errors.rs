use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Per-field validation failures for a schedule submission. Date and time
/// problems are reported separately so the client can highlight the right
/// input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleFieldErrors {
    pub date: Option<String>,
    pub time: Option<String>,
}

impl ScheduleFieldErrors {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.time.is_none()
    }
}

impl fmt::Display for ScheduleFieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self
            .date
            .iter()
            .chain(self.time.iter())
            .map(String::as_str)
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Error, Debug)]
pub enum SpeakError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid schedule: {0}")]
    Schedule(ScheduleFieldErrors),

    #[error("Room at capacity: {0}")]
    Capacity(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type SpeakResult<T> = Result<T, SpeakError>;
