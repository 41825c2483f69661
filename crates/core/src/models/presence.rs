use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user liveness record, one row per user, upserted on every room
/// transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presence {
    pub user_id: Uuid,
    pub is_online: bool,
    pub last_seen: DateTime<Utc>,
    pub in_room: bool,
    pub room_code: Option<String>,
    pub room_entered_at: Option<DateTime<Utc>>,
}

/// The mutable half of a presence row. `last_seen` is stamped at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceUpdate {
    pub is_online: bool,
    pub in_room: bool,
    pub room_code: Option<String>,
    pub room_entered_at: Option<DateTime<Utc>>,
}

impl PresenceUpdate {
    /// Presence written when a user enters a room.
    pub fn entered_room(code: &str, at: DateTime<Utc>) -> Self {
        Self {
            is_online: true,
            in_room: true,
            room_code: Some(code.to_string()),
            room_entered_at: Some(at),
        }
    }

    /// Presence written when a user leaves a room.
    pub fn left_room() -> Self {
        Self {
            is_online: true,
            in_room: false,
            room_code: None,
            room_entered_at: None,
        }
    }
}
