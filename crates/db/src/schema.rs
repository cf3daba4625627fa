use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create facilities table. Rows are authored by the directory
    // application; this engine reads owner and business hours from them.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS facilities (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            owner_id UUID NOT NULL,
            name VARCHAR(255) NOT NULL,
            open_time TIME NOT NULL,
            close_time TIME NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create reservation_settings table. Column defaults mirror the
    // first-access defaults so a bare facility_id insert yields a valid row.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reservation_settings (
            facility_id UUID PRIMARY KEY REFERENCES facilities(id),
            enabled BOOLEAN NOT NULL DEFAULT FALSE,
            slot_unit_minutes INTEGER NOT NULL DEFAULT 60,
            allowed_days_ahead INTEGER NOT NULL DEFAULT 90,
            capacity_per_slot INTEGER NOT NULL DEFAULT 10,
            auto_confirm BOOLEAN NOT NULL DEFAULT TRUE,
            auto_message_enabled BOOLEAN NOT NULL DEFAULT FALSE,
            auto_message_text TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create seats table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS seats (
            facility_id UUID NOT NULL REFERENCES facilities(id),
            seat_code VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            PRIMARY KEY (facility_id, seat_code)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create reservations table. Rows are never deleted, only
    // status-mutated.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reservations (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            facility_id UUID NOT NULL REFERENCES facilities(id),
            user_id UUID NOT NULL,
            seat_code VARCHAR(255) NULL,
            reserved_date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'pending',
            customer_name VARCHAR(255) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_slot_range CHECK (end_time > start_time),
            CONSTRAINT valid_status CHECK (status IN ('pending', 'confirmed', 'cancelled'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create thread_messages table for the shared owner-customer
    // conversation per facility.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS thread_messages (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            facility_id UUID NOT NULL REFERENCES facilities(id),
            sender_id UUID NOT NULL,
            body TEXT NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create notifications table (in-app channel)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL,
            title VARCHAR(255) NOT NULL,
            message TEXT NOT NULL,
            link_url VARCHAR(1024) NULL,
            kind VARCHAR(64) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_facilities_owner_id ON facilities(owner_id);
        CREATE INDEX IF NOT EXISTS idx_reservations_facility_id ON reservations(facility_id);
        CREATE INDEX IF NOT EXISTS idx_reservations_slot ON reservations(facility_id, reserved_date, start_time);
        CREATE INDEX IF NOT EXISTS idx_reservations_status ON reservations(status);
        CREATE INDEX IF NOT EXISTS idx_thread_messages_facility_id ON thread_messages(facility_id);
        CREATE INDEX IF NOT EXISTS idx_notifications_user_id ON notifications(user_id);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
