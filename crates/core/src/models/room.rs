use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Default number of open participants a room accepts.
pub const DEFAULT_ROOM_CAPACITY: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Active,
    Ended,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Active => "active",
            RoomStatus::Ended => "ended",
        }
    }
}

impl FromStr for RoomStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RoomStatus::Active),
            "ended" => Ok(RoomStatus::Ended),
            other => Err(format!("unknown room status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Instant,
    Scheduled,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Instant => "instant",
            RoomType::Scheduled => "scheduled",
        }
    }
}

impl FromStr for RoomType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instant" => Ok(RoomType::Instant),
            "scheduled" => Ok(RoomType::Scheduled),
            other => Err(format!("unknown room type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Creator,
    Participant,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Creator => "creator",
            ParticipantRole::Participant => "participant",
        }
    }
}

impl FromStr for ParticipantRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creator" => Ok(ParticipantRole::Creator),
            "participant" => Ok(ParticipantRole::Participant),
            other => Err(format!("unknown participant role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub code: String,
    pub created_by: Uuid,
    pub status: RoomStatus,
    pub room_type: RoomType,
    pub capacity: i32,
    pub media_channel: String,
    pub created_at: DateTime<Utc>,
}

/// The room URL is the only persisted cross-reference between a request and
/// its live session.
pub fn room_url(code: &str) -> String {
    format!("/speaking/room/{code}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub user_a: Uuid,
    pub user_b: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room_code: String,
    pub room_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub success: bool,
    pub room_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRoomRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRoomResponse {
    pub success: bool,
}

/// Flat participant view joined across room, open participants and profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomParticipantView {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub gender: Option<String>,
    pub role: ParticipantRole,
    pub joined_at: DateTime<Utc>,
    pub online: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomParticipantsResponse {
    pub participants: Vec<RoomParticipantView>,
}
