//! Live speaking-request handlers: creating a request raises the
//! receiver's alert; accepting reuses the room-creation path; declining
//! only flips the status. Every action clears the alert and stops its
//! sound as the first effect, so double-invocations are inert.

use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use speakmatch_core::{
    errors::SpeakError,
    models::{
        request::{
            AcceptRequestResponse, CreateSpeakingRequest, DeclineRequestResponse,
            PendingRequestsResponse, RequestStatus, SpeakingRequest,
        },
        room::room_url,
    },
};
use speakmatch_db::models::DbSpeakingRequest;
use speakmatch_db::repositories;
use speakmatch_realtime::notify::AlertEvent;

use crate::{middleware::error_handling::AppError, ApiState};

use super::rooms::create_room_and_add_users;

fn to_model(row: DbSpeakingRequest) -> SpeakingRequest {
    SpeakingRequest {
        id: row.id,
        sender_id: row.sender_id,
        receiver_id: row.receiver_id,
        status: row.status.parse().unwrap_or(RequestStatus::Pending),
        created_at: row.created_at,
    }
}

#[axum::debug_handler]
pub async fn create_request(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateSpeakingRequest>,
) -> Result<Json<SpeakingRequest>, AppError> {
    let sender = repositories::profile::get_user_by_id(&state.db_pool, payload.sender_id)
        .await
        .map_err(SpeakError::Database)?
        .ok_or_else(|| {
            SpeakError::NotFound(format!("User {} not found", payload.sender_id))
        })?;

    let row = repositories::request::create_request(
        &state.db_pool,
        payload.sender_id,
        payload.receiver_id,
    )
    .await
    .map_err(SpeakError::Database)?;

    state
        .notifier
        .show_speaking_request(&sender.display_name, row.id, row.receiver_id);

    Ok(Json(to_model(row)))
}

#[axum::debug_handler]
pub async fn accept_request(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AcceptRequestResponse>, AppError> {
    // First effect: clear the alert and stop its sound.
    state.notifier.dismiss_speaking_request(id);

    // Re-fetch: the request must still exist.
    let request = repositories::request::get_request_by_id(&state.db_pool, id)
        .await
        .map_err(SpeakError::Database)?
        .ok_or_else(|| SpeakError::NotFound("Speaking request no longer exists".to_string()))?;

    // A room-creation failure surfaces here and leaves the request
    // untouched.
    let room_code =
        create_room_and_add_users(&state.db_pool, request.sender_id, request.receiver_id).await?;

    repositories::request::update_request_status(
        &state.db_pool,
        id,
        RequestStatus::Accepted.as_str(),
    )
    .await
    .map_err(SpeakError::Database)?;

    Ok(Json(AcceptRequestResponse {
        room_url: room_url(&room_code),
        room_code,
    }))
}

#[axum::debug_handler]
pub async fn decline_request(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeclineRequestResponse>, AppError> {
    state.notifier.dismiss_speaking_request(id);

    let affected = repositories::request::update_request_status(
        &state.db_pool,
        id,
        RequestStatus::Rejected.as_str(),
    )
    .await
    .map_err(SpeakError::Database)?;
    if affected == 0 {
        return Err(AppError(SpeakError::NotFound(
            "Speaking request no longer exists".to_string(),
        )));
    }

    Ok(Json(DeclineRequestResponse { success: true }))
}

/// The view-all listing destination.
#[axum::debug_handler]
pub async fn list_pending_requests(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PendingRequestsResponse>, AppError> {
    let rows = repositories::request::list_pending_for_receiver(&state.db_pool, user_id)
        .await
        .map_err(SpeakError::Database)?;

    Ok(Json(PendingRequestsResponse {
        requests: rows.into_iter().map(to_model).collect(),
    }))
}

/// External dismissal: clears the alert without resolving the request's
/// status. Unknown ids are a no-op.
#[axum::debug_handler]
pub async fn dismiss_notification(
    State(state): State<Arc<ApiState>>,
    Path(request_id): Path<Uuid>,
) -> StatusCode {
    state.notifier.dismiss_speaking_request(request_id);
    StatusCode::NO_CONTENT
}

/// SSE feed of one viewer's alert events. Alerts for other viewers are
/// filtered out; ring/dismiss events pass through for request ids this
/// stream has already surfaced.
#[axum::debug_handler]
pub async fn notification_stream(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.notifier.subscribe();
    let seen: HashSet<Uuid> = HashSet::new();

    let stream = stream::unfold((rx, seen), move |(mut rx, mut seen)| async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Notification stream lagged by {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => return None,
            };

            let relevant = match &event {
                AlertEvent::RequestAlert { viewer_id, .. } => {
                    if *viewer_id != user_id {
                        false
                    } else {
                        seen.insert(event.request_id());
                        true
                    }
                }
                _ => seen.contains(&event.request_id()),
            };
            if !relevant {
                continue;
            }

            match Event::default().json_data(&event) {
                Ok(sse) => return Some((Ok(sse), (rx, seen))),
                Err(e) => {
                    tracing::warn!("Failed to encode notification event: {}", e);
                    continue;
                }
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
