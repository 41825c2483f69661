use crate::models::{DbParticipant, DbRoomMember};
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Inserts the creator and participant rows for a fresh room in one batch
/// statement, so a failure leaves no half-populated room behind.
pub async fn add_room_pair(
    pool: &Pool<Postgres>,
    room_id: Uuid,
    creator_id: Uuid,
    participant_id: Uuid,
) -> Result<Vec<DbParticipant>> {
    tracing::debug!(
        "Adding participant pair: room_id={}, creator={}, participant={}",
        room_id,
        creator_id,
        participant_id
    );

    let participants = sqlx::query_as::<_, DbParticipant>(
        r#"
        INSERT INTO room_participants (room_id, user_id, role, online)
        VALUES ($1, $2, 'creator', TRUE), ($1, $3, 'participant', TRUE)
        RETURNING id, room_id, user_id, role, online, joined_at, left_at
        "#,
    )
    .bind(room_id)
    .bind(creator_id)
    .bind(participant_id)
    .fetch_all(pool)
    .await?;

    Ok(participants)
}

pub async fn add_participant(
    pool: &Pool<Postgres>,
    room_id: Uuid,
    user_id: Uuid,
) -> Result<DbParticipant> {
    tracing::debug!("Adding participant: room_id={}, user_id={}", room_id, user_id);

    let participant = sqlx::query_as::<_, DbParticipant>(
        r#"
        INSERT INTO room_participants (room_id, user_id, role, online)
        VALUES ($1, $2, 'participant', TRUE)
        RETURNING id, room_id, user_id, role, online, joined_at, left_at
        "#,
    )
    .bind(room_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(participant)
}

/// Number of open (left_at IS NULL) participant rows in a room.
pub async fn count_open_participants(pool: &Pool<Postgres>, room_id: Uuid) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM room_participants
        WHERE room_id = $1 AND left_at IS NULL
        "#,
    )
    .bind(room_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Closes the caller's open participant row. Returns the number of rows
/// affected; zero means the user had already left, which callers treat as
/// success.
pub async fn close_open_participant(
    pool: &Pool<Postgres>,
    room_id: Uuid,
    user_id: Uuid,
    left_at: DateTime<Utc>,
) -> Result<u64> {
    tracing::debug!("Closing participant: room_id={}, user_id={}", room_id, user_id);

    let result = sqlx::query(
        r#"
        UPDATE room_participants
        SET left_at = $3, online = FALSE
        WHERE room_id = $1 AND user_id = $2 AND left_at IS NULL
        "#,
    )
    .bind(room_id)
    .bind(user_id)
    .bind(left_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Open participants joined to their profiles, oldest join first.
pub async fn get_open_participants_with_profiles(
    pool: &Pool<Postgres>,
    room_id: Uuid,
) -> Result<Vec<DbRoomMember>> {
    let members = sqlx::query_as::<_, DbRoomMember>(
        r#"
        SELECT p.user_id, u.display_name, u.avatar_url, u.gender,
               p.role, p.joined_at, p.online
        FROM room_participants p
        JOIN users u ON u.id = p.user_id
        WHERE p.room_id = $1 AND p.left_at IS NULL
        ORDER BY p.joined_at ASC
        "#,
    )
    .bind(room_id)
    .fetch_all(pool)
    .await?;

    Ok(members)
}
