//! User lookups backing the matchmaking UI: the profile card and the
//! presence record peers check before sending a live request.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use speakmatch_core::{
    errors::SpeakError,
    models::{presence::Presence, user::UserProfile},
};
use speakmatch_db::repositories;

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn get_user_profile(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    let user = repositories::profile::get_user_by_id(&state.db_pool, id)
        .await
        .map_err(SpeakError::Database)?
        .ok_or_else(|| SpeakError::NotFound(format!("User {id} not found")))?;

    Ok(Json(UserProfile {
        id: user.id,
        display_name: user.display_name,
        email: user.email,
        avatar_url: user.avatar_url,
        gender: user.gender,
        created_at: user.created_at,
    }))
}

#[axum::debug_handler]
pub async fn get_user_presence(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Presence>, AppError> {
    let presence = repositories::presence::get_presence(&state.db_pool, id)
        .await
        .map_err(SpeakError::Database)?
        .ok_or_else(|| SpeakError::NotFound(format!("No presence recorded for user {id}")))?;

    Ok(Json(Presence {
        user_id: presence.user_id,
        is_online: presence.is_online,
        last_seen: presence.last_seen,
        in_room: presence.in_room,
        room_code: presence.room_code,
        room_entered_at: presence.room_entered_at,
    }))
}
