use eyre::Result;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;

use speakmatch_db::models::{DbParticipant, DbPresence, DbRoom};
use speakmatch_db::{repositories, DbPool};

use crate::events::{
    ChangeEnvelope, RoomEvent, PARTICIPANT_CHANGES_CHANNEL, PRESENCE_CHANGES_CHANNEL,
    ROOM_CHANGES_CHANNEL,
};
use crate::registry::{room_channel_name, ChannelHandle, ChannelRegistry};

/// A live change-feed subscription for one room code.
pub struct RoomSubscription {
    pub code: String,
    pub events: broadcast::Receiver<RoomEvent>,
}

/// Opens the change feed for a room: one LISTEN connection over the
/// room/participant/presence notify channels, filtered down to events for
/// `code`. The listener task is registered under `room:<code>`; subscribing
/// again for the same code replaces it.
pub async fn subscribe_to_room(
    pool: &DbPool,
    registry: &ChannelRegistry,
    code: &str,
) -> Result<RoomSubscription> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener
        .listen_all([
            ROOM_CHANGES_CHANNEL,
            PARTICIPANT_CHANGES_CHANNEL,
            PRESENCE_CHANGES_CHANNEL,
        ])
        .await?;

    let (tx, events) = broadcast::channel(64);
    let task_pool = pool.clone();
    let task_code = code.to_string();

    let task = tokio::spawn(async move {
        loop {
            match listener.recv().await {
                Ok(notification) => {
                    let event = classify(
                        &task_pool,
                        &task_code,
                        notification.channel(),
                        notification.payload(),
                    )
                    .await;
                    if let Some(event) = event {
                        if tx.send(event).is_err() {
                            // Every receiver is gone.
                            break;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Room feed listener lost for {}: {}", task_code, e);
                    break;
                }
            }
        }
    });

    registry.register(room_channel_name(code), ChannelHandle::Feed { task });

    Ok(RoomSubscription {
        code: code.to_string(),
        events,
    })
}

/// Maps one notify payload to a room event, or None when it concerns a
/// different room or an uninteresting transition.
async fn classify(pool: &DbPool, code: &str, channel: &str, payload: &str) -> Option<RoomEvent> {
    let envelope: ChangeEnvelope = match serde_json::from_str(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Unparseable change payload on {}: {}", channel, e);
            return None;
        }
    };

    match channel {
        ROOM_CHANGES_CHANNEL => {
            let room: DbRoom = serde_json::from_value(envelope.record).ok()?;
            if room.code == code && envelope.op == "UPDATE" {
                return Some(RoomEvent::StatusChanged {
                    status: room.status,
                });
            }
            None
        }
        PARTICIPANT_CHANGES_CHANNEL => {
            let participant: DbParticipant = serde_json::from_value(envelope.record).ok()?;
            // Participant payloads carry only the room id, so the room is
            // re-resolved per event to filter by code.
            let room = repositories::room::get_room_by_id(pool, participant.room_id)
                .await
                .ok()
                .flatten()?;
            if room.code != code {
                return None;
            }
            match envelope.op.as_str() {
                "INSERT" => Some(RoomEvent::ParticipantJoined {
                    user_id: participant.user_id,
                    role: participant.role,
                }),
                "UPDATE" if participant.left_at.is_some() => {
                    Some(RoomEvent::ParticipantLeft {
                        user_id: participant.user_id,
                    })
                }
                _ => None,
            }
        }
        PRESENCE_CHANGES_CHANNEL => {
            let presence: DbPresence = serde_json::from_value(envelope.record).ok()?;
            if presence.room_code.as_deref() == Some(code) {
                return Some(RoomEvent::PresenceUpdated {
                    user_id: presence.user_id,
                    is_online: presence.is_online,
                    in_room: presence.in_room,
                });
            }
            None
        }
        other => {
            tracing::debug!("Ignoring notification on unknown channel: {}", other);
            None
        }
    }
}
