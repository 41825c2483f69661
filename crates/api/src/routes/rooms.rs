use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/rooms", post(handlers::rooms::create_room))
        .route("/api/rooms/:code", get(handlers::rooms::get_room))
        .route("/api/rooms/:code/join", post(handlers::rooms::join_room))
        .route("/api/rooms/:code/leave", post(handlers::rooms::leave_room))
        .route(
            "/api/rooms/:code/participants",
            get(handlers::rooms::get_room_participants),
        )
        .route("/api/rooms/:code/events", get(handlers::rooms::room_events))
        .route(
            "/api/rooms/:code/presence",
            get(handlers::rooms::room_presence),
        )
}
