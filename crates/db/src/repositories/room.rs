use crate::models::DbRoom;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_room(
    pool: &Pool<Postgres>,
    code: &str,
    created_by: Uuid,
    capacity: i32,
) -> Result<DbRoom> {
    let id = Uuid::new_v4();

    tracing::debug!(
        "Creating room: id={}, code={}, created_by={}, capacity={}",
        id,
        code,
        created_by,
        capacity
    );

    // The media channel name equals the room code.
    let room = sqlx::query_as::<_, DbRoom>(
        r#"
        INSERT INTO rooms (id, code, created_by, status, room_type, capacity, media_channel)
        VALUES ($1, $2, $3, 'active', 'instant', $4, $2)
        RETURNING id, code, created_by, status, room_type, capacity, media_channel, created_at
        "#,
    )
    .bind(id)
    .bind(code)
    .bind(created_by)
    .bind(capacity)
    .fetch_one(pool)
    .await?;

    Ok(room)
}

pub async fn get_active_room_by_code(
    pool: &Pool<Postgres>,
    code: &str,
) -> Result<Option<DbRoom>> {
    let room = sqlx::query_as::<_, DbRoom>(
        r#"
        SELECT id, code, created_by, status, room_type, capacity, media_channel, created_at
        FROM rooms
        WHERE code = $1 AND status = 'active'
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(room)
}

pub async fn get_room_by_code(pool: &Pool<Postgres>, code: &str) -> Result<Option<DbRoom>> {
    let room = sqlx::query_as::<_, DbRoom>(
        r#"
        SELECT id, code, created_by, status, room_type, capacity, media_channel, created_at
        FROM rooms
        WHERE code = $1
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(room)
}

pub async fn get_room_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbRoom>> {
    let room = sqlx::query_as::<_, DbRoom>(
        r#"
        SELECT id, code, created_by, status, room_type, capacity, media_channel, created_at
        FROM rooms
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(room)
}

/// Compensating delete for a room whose participant insert failed.
/// Participant rows cascade.
pub async fn delete_room(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    tracing::debug!("Deleting room: id={}", id);

    sqlx::query(
        r#"
        DELETE FROM rooms
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
