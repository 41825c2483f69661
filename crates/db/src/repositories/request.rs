use crate::models::DbSpeakingRequest;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_request(
    pool: &Pool<Postgres>,
    sender_id: Uuid,
    receiver_id: Uuid,
) -> Result<DbSpeakingRequest> {
    let id = Uuid::new_v4();

    tracing::debug!(
        "Creating speaking request: id={}, sender={}, receiver={}",
        id,
        sender_id,
        receiver_id
    );

    let request = sqlx::query_as::<_, DbSpeakingRequest>(
        r#"
        INSERT INTO speaking_requests (id, sender_id, receiver_id, status)
        VALUES ($1, $2, $3, 'pending')
        RETURNING id, sender_id, receiver_id, status, created_at
        "#,
    )
    .bind(id)
    .bind(sender_id)
    .bind(receiver_id)
    .fetch_one(pool)
    .await?;

    Ok(request)
}

pub async fn get_request_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbSpeakingRequest>> {
    let request = sqlx::query_as::<_, DbSpeakingRequest>(
        r#"
        SELECT id, sender_id, receiver_id, status, created_at
        FROM speaking_requests
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(request)
}

/// Returns the number of rows affected; zero means the request is gone.
pub async fn update_request_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: &str,
) -> Result<u64> {
    tracing::debug!("Updating speaking request: id={}, status={}", id, status);

    let result = sqlx::query(
        r#"
        UPDATE speaking_requests
        SET status = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(status)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn list_pending_for_receiver(
    pool: &Pool<Postgres>,
    receiver_id: Uuid,
) -> Result<Vec<DbSpeakingRequest>> {
    let requests = sqlx::query_as::<_, DbSpeakingRequest>(
        r#"
        SELECT id, sender_id, receiver_id, status, created_at
        FROM speaking_requests
        WHERE receiver_id = $1 AND status = 'pending'
        ORDER BY created_at DESC
        "#,
    )
    .bind(receiver_id)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}
