use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Splits a single display name into (first, last) at the first space.
/// A name without a space becomes (name, "").
pub fn split_display_name(display_name: &str) -> (String, String) {
    match display_name.trim().split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (display_name.trim().to_string(), String::new()),
    }
}
