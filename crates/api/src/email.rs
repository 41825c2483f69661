//! Outbound email side channel for scheduled-session notifications.
//!
//! The endpoint is a plain HTTP service; a failed send is logged by the
//! caller and never rolls back the already-persisted request.

use chrono::{NaiveDate, NaiveTime};
use eyre::Result;
use serde::Serialize;

/// Payload accepted by the email notification endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEmail {
    pub receiver_email: String,
    pub receiver_name: String,
    pub sender_name: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct EmailClient {
    http: reqwest::Client,
    endpoint: String,
}

impl EmailClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    pub async fn send_schedule_notification(&self, email: &ScheduleEmail) -> Result<()> {
        tracing::debug!(
            "Sending schedule notification email to {}",
            email.receiver_email
        );

        let response = self.http.post(&self.endpoint).json(email).send().await?;
        response.error_for_status()?;

        Ok(())
    }
}
