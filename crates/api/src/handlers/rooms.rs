//! Room lifecycle handlers: create/join/leave, the participant view, and
//! the SSE streams backed by the realtime subsystem.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::Utc;
use futures_util::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use speakmatch_core::{
    errors::SpeakError,
    models::{
        presence::PresenceUpdate,
        room::{
            room_url, CreateRoomRequest, CreateRoomResponse, JoinRoomRequest, JoinRoomResponse,
            LeaveRoomRequest, LeaveRoomResponse, ParticipantRole, Room, RoomParticipantView,
            RoomParticipantsResponse, RoomStatus, RoomType, DEFAULT_ROOM_CAPACITY,
        },
        user::split_display_name,
    },
    room_code,
};
use speakmatch_db::{repositories, DbPool};
use speakmatch_realtime::{
    feed,
    presence::{subscribe_to_room_presence, PresenceEvent},
};

use crate::{middleware::error_handling::AppError, ApiState};

use super::{broadcast_sse, spawn_best_effort};

/// Bound on generate-and-check attempts before giving up on a unique code.
pub const ROOM_CODE_ATTEMPTS: usize = 10;

/// Generates room codes until one has no active room, bounded at
/// [`ROOM_CODE_ATTEMPTS`] tries. The check-then-insert race is accepted.
async fn allocate_room_code(pool: &DbPool) -> Result<String, SpeakError> {
    for _ in 0..ROOM_CODE_ATTEMPTS {
        let code = room_code::generate();
        let existing = repositories::room::get_active_room_by_code(pool, &code)
            .await
            .map_err(SpeakError::Database)?;
        if existing.is_none() {
            return Ok(code);
        }
        tracing::debug!("Room code collision, retrying: {}", code);
    }

    Err(SpeakError::Conflict(
        "Could not allocate a unique room code".to_string(),
    ))
}

/// Creates a room for the matched pair and opens both participant rows.
///
/// The room insert and the participant batch are must-succeed: if the
/// participants cannot be written the fresh room row is deleted again so no
/// orphan rooms survive a partial failure. The presence upserts afterwards
/// are best-effort.
pub(crate) async fn create_room_and_add_users(
    pool: &DbPool,
    user_a: Uuid,
    user_b: Uuid,
) -> Result<String, SpeakError> {
    let code = allocate_room_code(pool).await?;

    let room = repositories::room::create_room(pool, &code, user_a, DEFAULT_ROOM_CAPACITY)
        .await
        .map_err(SpeakError::Database)?;

    if let Err(e) = repositories::participant::add_room_pair(pool, room.id, user_a, user_b).await
    {
        // Compensating delete: the room must not outlive its failed setup.
        if let Err(delete_err) = repositories::room::delete_room(pool, room.id).await {
            tracing::error!(
                "Compensating room delete failed for {}: {}",
                room.id,
                delete_err
            );
        }
        return Err(SpeakError::Database(e));
    }

    let now = Utc::now();
    for user_id in [user_a, user_b] {
        let pool = pool.clone();
        let code = code.clone();
        spawn_best_effort("presence upsert", async move {
            repositories::presence::upsert_presence(
                &pool,
                user_id,
                &PresenceUpdate::entered_room(&code, now),
            )
            .await
            .map(|_| ())
        });
    }

    Ok(code)
}

#[axum::debug_handler]
pub async fn create_room(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<Json<CreateRoomResponse>, AppError> {
    let room_code = create_room_and_add_users(&state.db_pool, payload.user_a, payload.user_b).await?;

    Ok(Json(CreateRoomResponse {
        room_url: room_url(&room_code),
        room_code,
    }))
}

#[axum::debug_handler]
pub async fn join_room(
    State(state): State<Arc<ApiState>>,
    Path(code): Path<String>,
    Json(payload): Json<JoinRoomRequest>,
) -> Result<Json<JoinRoomResponse>, AppError> {
    let room = repositories::room::get_active_room_by_code(&state.db_pool, &code)
        .await
        .map_err(SpeakError::Database)?
        .ok_or_else(|| SpeakError::NotFound(format!("Room {code} not found or already ended")))?;

    // Soft capacity check; two racing joins may both pass it.
    let open = repositories::participant::count_open_participants(&state.db_pool, room.id)
        .await
        .map_err(SpeakError::Database)?;
    if open >= i64::from(room.capacity) {
        return Err(AppError(SpeakError::Capacity(format!(
            "Room {code} is full"
        ))));
    }

    repositories::participant::add_participant(&state.db_pool, room.id, payload.user_id)
        .await
        .map_err(SpeakError::Database)?;

    let pool = state.db_pool.clone();
    let room_code = room.code.clone();
    let user_id = payload.user_id;
    spawn_best_effort("presence upsert", async move {
        repositories::presence::upsert_presence(
            &pool,
            user_id,
            &PresenceUpdate::entered_room(&room_code, Utc::now()),
        )
        .await
        .map(|_| ())
    });

    Ok(Json(JoinRoomResponse {
        success: true,
        room_code: room.code,
    }))
}

#[axum::debug_handler]
pub async fn leave_room(
    State(state): State<Arc<ApiState>>,
    Path(code): Path<String>,
    Json(payload): Json<LeaveRoomRequest>,
) -> Result<Json<LeaveRoomResponse>, AppError> {
    let room = repositories::room::get_room_by_code(&state.db_pool, &code)
        .await
        .map_err(SpeakError::Database)?
        .ok_or_else(|| SpeakError::NotFound(format!("Room {code} not found")))?;

    // Zero rows affected means the user had already left: still a success.
    let affected = repositories::participant::close_open_participant(
        &state.db_pool,
        room.id,
        payload.user_id,
        Utc::now(),
    )
    .await
    .map_err(SpeakError::Database)?;
    if affected == 0 {
        tracing::debug!(
            "No open participant row for user {} in room {}",
            payload.user_id,
            code
        );
    }

    let pool = state.db_pool.clone();
    let user_id = payload.user_id;
    spawn_best_effort("presence upsert", async move {
        repositories::presence::upsert_presence(&pool, user_id, &PresenceUpdate::left_room())
            .await
            .map(|_| ())
    });

    // Torn down whether or not the update touched a row.
    state.channels.unsubscribe_from_room(&code);

    Ok(Json(LeaveRoomResponse { success: true }))
}

#[axum::debug_handler]
pub async fn get_room(
    State(state): State<Arc<ApiState>>,
    Path(code): Path<String>,
) -> Result<Json<Room>, AppError> {
    let row = repositories::room::get_room_by_code(&state.db_pool, &code)
        .await
        .map_err(SpeakError::Database)?
        .ok_or_else(|| SpeakError::NotFound(format!("Room {code} not found")))?;

    let status: RoomStatus = row
        .status
        .parse()
        .map_err(|e: String| SpeakError::Internal(e.into()))?;
    let room_type: RoomType = row
        .room_type
        .parse()
        .map_err(|e: String| SpeakError::Internal(e.into()))?;

    Ok(Json(Room {
        id: row.id,
        code: row.code,
        created_by: row.created_by,
        status,
        room_type,
        capacity: row.capacity,
        media_channel: row.media_channel,
        created_at: row.created_at,
    }))
}

#[axum::debug_handler]
pub async fn get_room_participants(
    State(state): State<Arc<ApiState>>,
    Path(code): Path<String>,
) -> Result<Json<RoomParticipantsResponse>, AppError> {
    let room = repositories::room::get_room_by_code(&state.db_pool, &code)
        .await
        .map_err(SpeakError::Database)?
        .ok_or_else(|| SpeakError::NotFound(format!("Room {code} not found")))?;

    let members =
        repositories::participant::get_open_participants_with_profiles(&state.db_pool, room.id)
            .await
            .map_err(SpeakError::Database)?;

    let participants = members
        .into_iter()
        .map(|member| {
            let (first_name, last_name) = split_display_name(&member.display_name);
            RoomParticipantView {
                user_id: member.user_id,
                first_name,
                last_name,
                avatar_url: member.avatar_url,
                gender: member.gender,
                role: member.role.parse().unwrap_or(ParticipantRole::Participant),
                joined_at: member.joined_at,
                online: member.online,
            }
        })
        .collect();

    Ok(Json(RoomParticipantsResponse { participants }))
}

/// SSE stream of the room's change feed (status, participant join/leave,
/// presence rows). Subscribing again for the same code replaces the
/// previous feed.
#[axum::debug_handler]
pub async fn room_events(
    State(state): State<Arc<ApiState>>,
    Path(code): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    repositories::room::get_active_room_by_code(&state.db_pool, &code)
        .await
        .map_err(SpeakError::Database)?
        .ok_or_else(|| SpeakError::NotFound(format!("Room {code} not found or already ended")))?;

    let subscription = feed::subscribe_to_room(&state.db_pool, &state.channels, &code)
        .await
        .map_err(SpeakError::Database)?;

    Ok(Sse::new(broadcast_sse(subscription.events)).keep_alive(KeepAlive::default()))
}

#[derive(Debug, Deserialize)]
pub struct PresenceParams {
    pub user_id: Uuid,
}

/// SSE stream of the room's ephemeral presence channel. The caller's own
/// presence is tracked into the channel on subscribe; the first event is
/// the member snapshot (sync), followed by join/leave events.
#[axum::debug_handler]
pub async fn room_presence(
    State(state): State<Arc<ApiState>>,
    Path(code): Path<String>,
    Query(params): Query<PresenceParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    repositories::room::get_active_room_by_code(&state.db_pool, &code)
        .await
        .map_err(SpeakError::Database)?
        .ok_or_else(|| SpeakError::NotFound(format!("Room {code} not found or already ended")))?;

    let subscription =
        subscribe_to_room_presence(&state.presence, &state.channels, &code, params.user_id);

    let sync = PresenceEvent::Sync {
        members: subscription.members.clone(),
    };
    let first = stream::iter(Event::default().json_data(&sync).ok().map(Ok));

    Ok(Sse::new(first.chain(broadcast_sse(subscription.events)))
        .keep_alive(KeepAlive::default()))
}
