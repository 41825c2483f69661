pub mod requests;
pub mod rooms;
pub mod schedule;
pub mod users;

use std::convert::Infallible;
use std::future::Future;

use axum::response::sse::Event;
use futures_util::stream::{self, Stream};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Runs a best-effort side effect (presence upserts, email dispatch) as a
/// fire-and-forget task. Failures go to the log sink only and never reach
/// the caller; must-succeed calls stay inline and propagate instead.
pub(crate) fn spawn_best_effort<F>(context: &'static str, fut: F)
where
    F: Future<Output = eyre::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = fut.await {
            tracing::warn!("Best-effort {} failed: {}", context, e);
        }
    });
}

/// Adapts a broadcast receiver into an SSE stream of JSON events. Lagged
/// receivers skip ahead; the stream ends when the sender is gone.
pub(crate) fn broadcast_sse<T>(
    rx: broadcast::Receiver<T>,
) -> impl Stream<Item = Result<Event, Infallible>>
where
    T: Clone + serde::Serialize + Send + 'static,
{
    stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match Event::default().json_data(&event) {
                    Ok(sse) => return Some((Ok(sse), rx)),
                    Err(e) => {
                        tracing::warn!("Failed to encode SSE event: {}", e);
                        continue;
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("SSE receiver lagged by {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}
