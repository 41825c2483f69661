use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::presence::PresenceHub;

pub fn room_channel_name(code: &str) -> String {
    format!("room:{code}")
}

pub fn presence_channel_name(code: &str) -> String {
    format!("presence:{code}")
}

/// A live subscription tracked by the registry.
pub enum ChannelHandle {
    /// Change-feed listener task.
    Feed { task: JoinHandle<()> },
    /// Membership in the ephemeral presence hub.
    Presence {
        hub: PresenceHub,
        code: String,
        user_id: Uuid,
    },
}

impl ChannelHandle {
    fn close(self) {
        match self {
            ChannelHandle::Feed { task } => task.abort(),
            ChannelHandle::Presence { hub, code, user_id } => hub.leave(&code, user_id),
        }
    }
}

/// Process-scoped table of active channels, keyed by `room:<code>` and
/// `presence:<code>`. Constructed explicitly and injected so tests can run
/// independent instances.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    inner: Arc<Mutex<HashMap<String, ChannelHandle>>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handle under `name`. Any prior handle for the same name
    /// is torn down first so duplicate listeners never accumulate.
    pub fn register(&self, name: String, handle: ChannelHandle) {
        let previous = {
            let mut channels = self.lock();
            channels.insert(name.clone(), handle)
        };
        if let Some(previous) = previous {
            tracing::debug!("Replacing existing channel: {}", name);
            previous.close();
        }
    }

    /// Removes and closes the named channel. Returns false if it was not
    /// registered.
    pub fn unsubscribe(&self, name: &str) -> bool {
        let removed = { self.lock().remove(name) };
        match removed {
            Some(handle) => {
                handle.close();
                true
            }
            None => false,
        }
    }

    /// Tears down both the data-change and presence channels for a room
    /// code, tolerating the absence of either.
    pub fn unsubscribe_from_room(&self, code: &str) {
        self.unsubscribe(&room_channel_name(code));
        self.unsubscribe(&presence_channel_name(code));
    }

    /// Closes every tracked channel and clears the table. The collection is
    /// snapshotted before any handle is closed so teardown callbacks cannot
    /// observe a half-drained table.
    pub fn cleanup_all(&self) {
        let drained: Vec<(String, ChannelHandle)> = {
            let mut channels = self.lock();
            channels.drain().collect()
        };
        for (name, handle) in drained {
            tracing::debug!("Closing channel: {}", name);
            handle.close();
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, ChannelHandle>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
