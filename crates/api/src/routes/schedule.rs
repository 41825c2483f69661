use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/schedule", post(handlers::schedule::schedule_session))
        .route(
            "/api/schedule/:id",
            get(handlers::schedule::get_scheduled_session),
        )
}
