use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Maximum length of the optional message attached to a scheduled request.
pub const MAX_SCHEDULE_MESSAGE_LEN: usize = 500;

/// Scheduled requests expire this many days after creation. Expiry
/// enforcement is external; the timestamp is persisted at submission.
pub const SCHEDULED_REQUEST_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(format!("unknown request status: {other}")),
        }
    }
}

/// A live speaking request requiring immediate accept/decline. Transient:
/// superseded by a room once accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakingRequest {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSpeakingRequest {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptRequestResponse {
    pub room_code: String,
    pub room_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclineRequestResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRequestsResponse {
    pub requests: Vec<SpeakingRequest>,
}

/// A future-dated invitation, accepted separately at/near the scheduled
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledSpeakingRequest {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub scheduled_at: DateTime<Utc>,
    pub timezone: String,
    pub message: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Submission payload for scheduling a future session. Date, hour and minute
/// are optional on the wire so missing fields produce per-field errors
/// rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSessionRequest {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub date: Option<NaiveDate>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub timezone: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSessionResponse {
    pub request: ScheduledSpeakingRequest,
}
