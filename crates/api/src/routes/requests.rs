use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/requests", post(handlers::requests::create_request))
        .route(
            "/api/requests/:id/accept",
            post(handlers::requests::accept_request),
        )
        .route(
            "/api/requests/:id/decline",
            post(handlers::requests::decline_request),
        )
        .route(
            "/api/requests/pending/:user_id",
            get(handlers::requests::list_pending_requests),
        )
        .route(
            "/api/notifications/:request_id",
            delete(handlers::requests::dismiss_notification),
        )
        .route(
            "/api/notifications/stream/:user_id",
            get(handlers::requests::notification_stream),
        )
}
