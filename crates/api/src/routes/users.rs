use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/users/:id", get(handlers::users::get_user_profile))
        .route(
            "/api/users/:id/presence",
            get(handlers::users::get_user_presence),
        )
}
