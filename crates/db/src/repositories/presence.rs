use crate::models::DbPresence;
use chrono::Utc;
use eyre::Result;
use speakmatch_core::models::presence::PresenceUpdate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Upserts the per-user presence row. `last_seen` is stamped here.
pub async fn upsert_presence(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    update: &PresenceUpdate,
) -> Result<DbPresence> {
    let now = Utc::now();

    tracing::debug!(
        "Upserting presence: user_id={}, in_room={}, room_code={:?}",
        user_id,
        update.in_room,
        update.room_code
    );

    let presence = sqlx::query_as::<_, DbPresence>(
        r#"
        INSERT INTO user_presence (user_id, is_online, last_seen, in_room, room_code, room_entered_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id) DO UPDATE
        SET is_online = EXCLUDED.is_online,
            last_seen = EXCLUDED.last_seen,
            in_room = EXCLUDED.in_room,
            room_code = EXCLUDED.room_code,
            room_entered_at = EXCLUDED.room_entered_at
        RETURNING user_id, is_online, last_seen, in_room, room_code, room_entered_at
        "#,
    )
    .bind(user_id)
    .bind(update.is_online)
    .bind(now)
    .bind(update.in_room)
    .bind(update.room_code.as_deref())
    .bind(update.room_entered_at)
    .fetch_one(pool)
    .await?;

    Ok(presence)
}

pub async fn get_presence(pool: &Pool<Postgres>, user_id: Uuid) -> Result<Option<DbPresence>> {
    let presence = sqlx::query_as::<_, DbPresence>(
        r#"
        SELECT user_id, is_online, last_seen, in_room, room_code, room_entered_at
        FROM user_presence
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(presence)
}
