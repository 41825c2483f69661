use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notify channels fed by the schema triggers.
pub const ROOM_CHANGES_CHANNEL: &str = "room_changes";
pub const PARTICIPANT_CHANGES_CHANNEL: &str = "participant_changes";
pub const PRESENCE_CHANGES_CHANNEL: &str = "presence_changes";

/// Envelope published by the `notify_row_change` trigger.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeEnvelope {
    pub op: String,
    pub record: serde_json::Value,
}

/// Typed events delivered to a room's change-feed subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RoomEvent {
    StatusChanged {
        status: String,
    },
    ParticipantJoined {
        user_id: Uuid,
        role: String,
    },
    ParticipantLeft {
        user_id: Uuid,
    },
    PresenceUpdated {
        user_id: Uuid,
        is_online: bool,
        in_room: bool,
    },
}
