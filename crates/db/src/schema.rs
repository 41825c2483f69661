use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            display_name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL,
            avatar_url VARCHAR(1024) NULL,
            gender VARCHAR(32) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create rooms table. Room codes are checked for uniqueness among
    // active rooms before insert; the race is accepted, so no unique
    // constraint on code.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rooms (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            code VARCHAR(8) NOT NULL,
            created_by UUID NOT NULL REFERENCES users(id),
            status VARCHAR(16) NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'ended')),
            room_type VARCHAR(16) NOT NULL DEFAULT 'instant'
                CHECK (room_type IN ('instant', 'scheduled')),
            capacity INTEGER NOT NULL DEFAULT 10,
            media_channel VARCHAR(8) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create room_participants table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS room_participants (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            room_id UUID NOT NULL REFERENCES rooms(id) ON DELETE CASCADE,
            user_id UUID NOT NULL REFERENCES users(id),
            role VARCHAR(16) NOT NULL DEFAULT 'participant'
                CHECK (role IN ('creator', 'participant')),
            online BOOLEAN NOT NULL DEFAULT TRUE,
            joined_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            left_at TIMESTAMP WITH TIME ZONE NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create user_presence table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_presence (
            user_id UUID PRIMARY KEY REFERENCES users(id),
            is_online BOOLEAN NOT NULL DEFAULT FALSE,
            last_seen TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            in_room BOOLEAN NOT NULL DEFAULT FALSE,
            room_code VARCHAR(8) NULL,
            room_entered_at TIMESTAMP WITH TIME ZONE NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create speaking_requests table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS speaking_requests (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            sender_id UUID NOT NULL REFERENCES users(id),
            receiver_id UUID NOT NULL REFERENCES users(id),
            status VARCHAR(16) NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'accepted', 'rejected')),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create scheduled_speaking_requests table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scheduled_speaking_requests (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            sender_id UUID NOT NULL REFERENCES users(id),
            receiver_id UUID NOT NULL REFERENCES users(id),
            scheduled_date DATE NOT NULL,
            scheduled_time TIME NOT NULL,
            scheduled_at TIMESTAMP WITH TIME ZONE NOT NULL,
            timezone VARCHAR(64) NOT NULL,
            message VARCHAR(500) NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'accepted', 'rejected')),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            expires_at TIMESTAMP WITH TIME ZONE NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes. The partial unique index enforces at most one open
    // participant row per (room, user).
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_rooms_active_code
            ON rooms (code) WHERE status = 'active';
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_participants_open_unique
            ON room_participants (room_id, user_id) WHERE left_at IS NULL;
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_participants_room
            ON room_participants (room_id);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_speaking_requests_receiver
            ON speaking_requests (receiver_id, status);
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_scheduled_requests_receiver
            ON scheduled_speaking_requests (receiver_id, status);
        "#,
    )
    .execute(pool)
    .await?;

    // Change-feed triggers. Row changes are published over pg_notify so the
    // realtime crate can LISTEN without polling. Participant payloads carry
    // the room id only; subscribers re-resolve the room per event.
    sqlx::query(
        r#"
        CREATE OR REPLACE FUNCTION notify_row_change() RETURNS trigger AS $$
        BEGIN
            PERFORM pg_notify(
                TG_ARGV[0],
                json_build_object('op', TG_OP, 'record', row_to_json(NEW))::text
            );
            RETURN NEW;
        END;
        $$ LANGUAGE plpgsql;
        "#,
    )
    .execute(pool)
    .await?;

    for (trigger, table, channel) in [
        ("rooms_notify", "rooms", "room_changes"),
        (
            "room_participants_notify",
            "room_participants",
            "participant_changes",
        ),
        ("user_presence_notify", "user_presence", "presence_changes"),
    ] {
        sqlx::query(&format!(
            r#"
            DROP TRIGGER IF EXISTS {trigger} ON {table};
            "#
        ))
        .execute(pool)
        .await?;

        sqlx::query(&format!(
            r#"
            CREATE TRIGGER {trigger}
                AFTER INSERT OR UPDATE ON {table}
                FOR EACH ROW EXECUTE FUNCTION notify_row_change('{channel}');
            "#
        ))
        .execute(pool)
        .await?;
    }

    info!("Database schema initialized");

    Ok(())
}
