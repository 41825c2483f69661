use crate::models::DbScheduledRequest;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

#[allow(clippy::too_many_arguments)]
pub async fn create_scheduled_request(
    pool: &Pool<Postgres>,
    sender_id: Uuid,
    receiver_id: Uuid,
    scheduled_date: NaiveDate,
    scheduled_time: NaiveTime,
    scheduled_at: DateTime<Utc>,
    timezone: &str,
    message: Option<&str>,
    expires_at: DateTime<Utc>,
) -> Result<DbScheduledRequest> {
    let id = Uuid::new_v4();

    tracing::debug!(
        "Creating scheduled request: id={}, sender={}, receiver={}, scheduled_at={}, timezone={}",
        id,
        sender_id,
        receiver_id,
        scheduled_at,
        timezone
    );

    let request = sqlx::query_as::<_, DbScheduledRequest>(
        r#"
        INSERT INTO scheduled_speaking_requests
            (id, sender_id, receiver_id, scheduled_date, scheduled_time,
             scheduled_at, timezone, message, status, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9)
        RETURNING id, sender_id, receiver_id, scheduled_date, scheduled_time,
                  scheduled_at, timezone, message, status, created_at, expires_at
        "#,
    )
    .bind(id)
    .bind(sender_id)
    .bind(receiver_id)
    .bind(scheduled_date)
    .bind(scheduled_time)
    .bind(scheduled_at)
    .bind(timezone)
    .bind(message)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok(request)
}

pub async fn get_scheduled_request_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbScheduledRequest>> {
    let request = sqlx::query_as::<_, DbScheduledRequest>(
        r#"
        SELECT id, sender_id, receiver_id, scheduled_date, scheduled_time,
               scheduled_at, timezone, message, status, created_at, expires_at
        FROM scheduled_speaking_requests
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(request)
}
