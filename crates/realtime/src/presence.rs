use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::registry::{presence_channel_name, ChannelHandle, ChannelRegistry};

/// Presence payload tracked into a room's ephemeral channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceState {
    pub user_id: Uuid,
    pub room_code: String,
    pub joined_at: DateTime<Utc>,
    pub online: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PresenceEvent {
    /// Current members, delivered to a new subscriber.
    Sync { members: Vec<PresenceState> },
    Join { state: PresenceState },
    Leave { user_id: Uuid },
}

struct PresenceRoom {
    tx: broadcast::Sender<PresenceEvent>,
    members: HashMap<Uuid, PresenceState>,
}

/// A live presence membership: the member snapshot as of subscription time
/// plus the event feed for everything after it.
pub struct PresenceSubscription {
    pub code: String,
    pub members: Vec<PresenceState>,
    pub events: broadcast::Receiver<PresenceEvent>,
}

/// Ephemeral per-room presence, independent of row storage. Members are
/// keyed by user id; a room disappears once its last member leaves.
#[derive(Clone, Default)]
pub struct PresenceHub {
    rooms: Arc<Mutex<HashMap<String, PresenceRoom>>>,
}

impl PresenceHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the room channel: subscribes to its events, snapshots the
    /// members already present, then tracks the caller's own payload so
    /// other subscribers see it.
    pub fn join(&self, code: &str, user_id: Uuid) -> PresenceSubscription {
        let mut rooms = self.lock();
        let room = rooms.entry(code.to_string()).or_insert_with(|| {
            let (tx, _) = broadcast::channel(64);
            PresenceRoom {
                tx,
                members: HashMap::new(),
            }
        });

        let events = room.tx.subscribe();
        let members: Vec<PresenceState> = room.members.values().cloned().collect();

        let state = PresenceState {
            user_id,
            room_code: code.to_string(),
            joined_at: Utc::now(),
            online: true,
        };
        room.members.insert(user_id, state.clone());
        let _ = room.tx.send(PresenceEvent::Join { state });

        PresenceSubscription {
            code: code.to_string(),
            members,
            events,
        }
    }

    /// Removes a member and notifies the rest. Unknown members and unknown
    /// rooms are no-ops.
    pub fn leave(&self, code: &str, user_id: Uuid) {
        let mut rooms = self.lock();
        if let Some(room) = rooms.get_mut(code) {
            if room.members.remove(&user_id).is_some() {
                let _ = room.tx.send(PresenceEvent::Leave { user_id });
            }
            if room.members.is_empty() {
                rooms.remove(code);
            }
        }
    }

    /// Current members of a room channel.
    pub fn members(&self, code: &str) -> Vec<PresenceState> {
        self.lock()
            .get(code)
            .map(|room| room.members.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, PresenceRoom>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Joins the hub and registers the membership under `presence:<code>` so a
/// later unsubscribe or cleanup tears it down.
pub fn subscribe_to_room_presence(
    hub: &PresenceHub,
    registry: &ChannelRegistry,
    code: &str,
    user_id: Uuid,
) -> PresenceSubscription {
    let subscription = hub.join(code, user_id);
    registry.register(
        presence_channel_name(code),
        ChannelHandle::Presence {
            hub: hub.clone(),
            code: code.to_string(),
            user_id,
        },
    );
    subscription
}
