use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// How long the audible alert plays before stopping on its own. The visual
/// alert persists until an explicit action or dismissal.
pub const RING_DURATION: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AlertEvent {
    /// An incoming live speaking request for `viewer_id`.
    RequestAlert {
        request_id: Uuid,
        viewer_id: Uuid,
        sender_name: String,
    },
    /// The audible alert for a request stopped (timer or dismissal).
    RingStopped { request_id: Uuid },
    /// The alert was cleared without the viewer acting on it here.
    AlertDismissed { request_id: Uuid },
}

impl AlertEvent {
    pub fn request_id(&self) -> Uuid {
        match self {
            AlertEvent::RequestAlert { request_id, .. }
            | AlertEvent::RingStopped { request_id }
            | AlertEvent::AlertDismissed { request_id } => *request_id,
        }
    }
}

struct ActiveAlert {
    viewer_id: Uuid,
    ring_task: Option<JoinHandle<()>>,
}

struct Inner {
    alerts: Mutex<HashMap<Uuid, ActiveAlert>>,
    events: broadcast::Sender<AlertEvent>,
    ring_duration: Duration,
}

/// Registry of live-request alerts, keyed by request id. Raising an alert
/// starts an independent ring timer; accept/decline/dismiss paths clear the
/// registry entry and stop the ring as their first effect, so a second
/// invocation for the same request is inert.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::with_ring_duration(RING_DURATION)
    }

    pub fn with_ring_duration(ring_duration: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Inner {
                alerts: Mutex::new(HashMap::new()),
                events,
                ring_duration,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.inner.events.subscribe()
    }

    /// Raises the alert for an incoming live request. Returns false when an
    /// alert for this request id is already showing (deduplicated).
    pub fn show_speaking_request(
        &self,
        sender_name: &str,
        request_id: Uuid,
        viewer_id: Uuid,
    ) -> bool {
        {
            let mut alerts = self.lock();
            if alerts.contains_key(&request_id) {
                tracing::debug!("Alert already showing for request {}", request_id);
                return false;
            }

            let center = self.clone();
            let ring_duration = self.inner.ring_duration;
            let ring_task = tokio::spawn(async move {
                tokio::time::sleep(ring_duration).await;
                center.stop_ring(request_id);
            });

            alerts.insert(
                request_id,
                ActiveAlert {
                    viewer_id,
                    ring_task: Some(ring_task),
                },
            );
        }

        let _ = self.inner.events.send(AlertEvent::RequestAlert {
            request_id,
            viewer_id,
            sender_name: sender_name.to_string(),
        });
        true
    }

    /// Clears the alert and stops its ring. Unknown request ids are a
    /// no-op; returns whether an alert was actually dismissed.
    pub fn dismiss_speaking_request(&self, request_id: Uuid) -> bool {
        let removed = { self.lock().remove(&request_id) };
        match removed {
            Some(alert) => {
                if let Some(task) = alert.ring_task {
                    task.abort();
                }
                let _ = self
                    .inner
                    .events
                    .send(AlertEvent::AlertDismissed { request_id });
                true
            }
            None => false,
        }
    }

    /// Ring timer expiry: the sound stops, the visual alert stays.
    fn stop_ring(&self, request_id: Uuid) {
        let stopped = {
            let mut alerts = self.lock();
            match alerts.get_mut(&request_id) {
                Some(alert) if alert.ring_task.is_some() => {
                    alert.ring_task = None;
                    true
                }
                _ => false,
            }
        };
        if stopped {
            let _ = self.inner.events.send(AlertEvent::RingStopped { request_id });
        }
    }

    pub fn is_active(&self, request_id: Uuid) -> bool {
        self.lock().contains_key(&request_id)
    }

    /// Whether the audible alert for a request is still playing.
    pub fn is_ringing(&self, request_id: Uuid) -> bool {
        self.lock()
            .get(&request_id)
            .is_some_and(|alert| alert.ring_task.is_some())
    }

    pub fn active_count(&self) -> usize {
        self.lock().len()
    }

    /// The viewer an active alert belongs to, if any.
    pub fn viewer_of(&self, request_id: Uuid) -> Option<Uuid> {
        self.lock().get(&request_id).map(|alert| alert.viewer_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, ActiveAlert>> {
        self.inner
            .alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
