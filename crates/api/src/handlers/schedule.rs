//! Scheduled-session submission: validates the zone-local date and time,
//! persists the request, and dispatches the email notification as a
//! best-effort side effect.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use speakmatch_core::{
    errors::SpeakError,
    models::request::{
        RequestStatus, ScheduleSessionRequest, ScheduleSessionResponse,
        ScheduledSpeakingRequest, SCHEDULED_REQUEST_TTL_DAYS,
    },
    timeclock,
};
use speakmatch_db::models::DbScheduledRequest;
use speakmatch_db::repositories;

use crate::email::ScheduleEmail;
use crate::{middleware::error_handling::AppError, ApiState};

use super::spawn_best_effort;

fn to_model(row: DbScheduledRequest) -> ScheduledSpeakingRequest {
    ScheduledSpeakingRequest {
        id: row.id,
        sender_id: row.sender_id,
        receiver_id: row.receiver_id,
        scheduled_date: row.scheduled_date,
        scheduled_time: row.scheduled_time,
        scheduled_at: row.scheduled_at,
        timezone: row.timezone,
        message: row.message,
        status: row.status.parse().unwrap_or(RequestStatus::Pending),
        created_at: row.created_at,
        expires_at: row.expires_at,
    }
}

#[axum::debug_handler]
pub async fn schedule_session(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<ScheduleSessionRequest>,
) -> Result<Json<ScheduleSessionResponse>, AppError> {
    let now = Utc::now();
    let valid = timeclock::validate_submission(&payload, now)?;

    let expires_at = now + chrono::Duration::days(SCHEDULED_REQUEST_TTL_DAYS);
    let row = repositories::scheduled_request::create_scheduled_request(
        &state.db_pool,
        payload.sender_id,
        payload.receiver_id,
        valid.date,
        valid.time,
        valid.scheduled_at,
        &payload.timezone,
        payload.message.as_deref(),
        expires_at,
    )
    .await
    .map_err(SpeakError::Database)?;

    // The request is created at this point; everything below is
    // best-effort and only logs on failure.
    dispatch_email(&state, &row);

    Ok(Json(ScheduleSessionResponse {
        request: to_model(row),
    }))
}

/// Lookup used when an invitee opens a scheduled invitation near its time;
/// accepting it goes through the live-request room-creation path.
#[axum::debug_handler]
pub async fn get_scheduled_session(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleSessionResponse>, AppError> {
    let row = repositories::scheduled_request::get_scheduled_request_by_id(&state.db_pool, id)
        .await
        .map_err(SpeakError::Database)?
        .ok_or_else(|| SpeakError::NotFound(format!("Scheduled request {id} not found")))?;

    Ok(Json(ScheduleSessionResponse {
        request: to_model(row),
    }))
}

fn dispatch_email(state: &Arc<ApiState>, row: &DbScheduledRequest) {
    let Some(mailer) = state.mailer.clone() else {
        tracing::debug!("No email endpoint configured; skipping schedule notification");
        return;
    };

    let pool = state.db_pool.clone();
    let sender_id = row.sender_id;
    let receiver_id = row.receiver_id;
    let scheduled_date = row.scheduled_date;
    let scheduled_time = row.scheduled_time;
    let timezone = row.timezone.clone();
    let message = row.message.clone();

    spawn_best_effort("schedule email dispatch", async move {
        let sender = repositories::profile::get_user_by_id(&pool, sender_id)
            .await?
            .ok_or_else(|| eyre::eyre!("Sender profile {sender_id} not found"))?;
        let receiver = repositories::profile::get_user_by_id(&pool, receiver_id)
            .await?
            .ok_or_else(|| eyre::eyre!("Receiver profile {receiver_id} not found"))?;

        mailer
            .send_schedule_notification(&ScheduleEmail {
                receiver_email: receiver.email,
                receiver_name: receiver.display_name,
                sender_name: sender.display_name,
                scheduled_date,
                scheduled_time,
                timezone,
                message,
            })
            .await
    });
}
