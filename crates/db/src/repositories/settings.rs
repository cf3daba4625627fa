use sqlx::{Pool, Postgres};
use uuid::Uuid;

use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::models::settings::ReservationSetting;

use crate::capabilities::{classify, SchemaCapabilities};
use crate::models::{DbReservationSetting, DbSeat};

/// Column list for settings selects. Legacy schemas lack the two
/// auto-message columns; they are selected as their disabled defaults so
/// reads return the same row shape without them rather than failing.
fn settings_columns(caps: &SchemaCapabilities) -> &'static str {
    if caps.settings_auto_message {
        "facility_id, enabled, slot_unit_minutes, allowed_days_ahead, \
         capacity_per_slot, auto_confirm, auto_message_enabled, \
         auto_message_text, created_at, updated_at"
    } else {
        "facility_id, enabled, slot_unit_minutes, allowed_days_ahead, \
         capacity_per_slot, auto_confirm, FALSE AS auto_message_enabled, \
         NULL::text AS auto_message_text, created_at, updated_at"
    }
}

pub async fn get_settings(
    pool: &Pool<Postgres>,
    caps: &SchemaCapabilities,
    facility_id: Uuid,
) -> BookingResult<Option<DbReservationSetting>> {
    tracing::debug!("Getting reservation settings for facility {}", facility_id);

    let sql = format!(
        r#"
        SELECT {columns}
        FROM reservation_settings
        WHERE facility_id = $1
        "#,
        columns = settings_columns(caps)
    );

    let settings = sqlx::query_as::<_, DbReservationSetting>(&sql)
        .bind(facility_id)
        .fetch_optional(pool)
        .await
        .map_err(classify)?;

    Ok(settings)
}

/// Persists the settings row, inserting or updating in place.
///
/// Returns `true` when the save was degraded: the deployment schema lacks
/// the auto-message columns, so those two fields were dropped from the
/// statement and everything else was saved.
pub async fn upsert_settings(
    pool: &Pool<Postgres>,
    caps: &SchemaCapabilities,
    settings: &ReservationSetting,
) -> BookingResult<bool> {
    tracing::debug!(
        "Upserting reservation settings for facility {}",
        settings.facility_id
    );

    if caps.settings_auto_message {
        match upsert_full(pool, settings).await {
            Ok(()) => return Ok(false),
            // The capability probe can be stale if the schema was rolled
            // back under us; fall through to the degraded statement.
            Err(BookingError::MissingColumn(column)) => {
                tracing::warn!(
                    "Settings upsert hit missing column '{}', retrying without auto-message fields",
                    column
                );
            }
            Err(err) => return Err(err),
        }
    }

    upsert_degraded(pool, settings).await?;
    Ok(true)
}

const UPSERT_FULL_SQL: &str = r#"
    INSERT INTO reservation_settings
        (facility_id, enabled, slot_unit_minutes, allowed_days_ahead,
         capacity_per_slot, auto_confirm, auto_message_enabled,
         auto_message_text, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
    ON CONFLICT (facility_id) DO UPDATE SET
        enabled = EXCLUDED.enabled,
        slot_unit_minutes = EXCLUDED.slot_unit_minutes,
        allowed_days_ahead = EXCLUDED.allowed_days_ahead,
        capacity_per_slot = EXCLUDED.capacity_per_slot,
        auto_confirm = EXCLUDED.auto_confirm,
        auto_message_enabled = EXCLUDED.auto_message_enabled,
        auto_message_text = EXCLUDED.auto_message_text,
        updated_at = NOW()
"#;

const UPSERT_DEGRADED_SQL: &str = r#"
    INSERT INTO reservation_settings
        (facility_id, enabled, slot_unit_minutes, allowed_days_ahead,
         capacity_per_slot, auto_confirm, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, NOW())
    ON CONFLICT (facility_id) DO UPDATE SET
        enabled = EXCLUDED.enabled,
        slot_unit_minutes = EXCLUDED.slot_unit_minutes,
        allowed_days_ahead = EXCLUDED.allowed_days_ahead,
        capacity_per_slot = EXCLUDED.capacity_per_slot,
        auto_confirm = EXCLUDED.auto_confirm,
        updated_at = NOW()
"#;

async fn upsert_full(pool: &Pool<Postgres>, settings: &ReservationSetting) -> BookingResult<()> {
    sqlx::query(UPSERT_FULL_SQL)
        .bind(settings.facility_id)
        .bind(settings.enabled)
        .bind(settings.slot_unit_minutes)
        .bind(settings.allowed_days_ahead)
        .bind(settings.capacity_per_slot)
        .bind(settings.auto_confirm)
        .bind(settings.auto_message_enabled)
        .bind(settings.auto_message_text.as_deref())
        .execute(pool)
        .await
        .map_err(classify)?;

    Ok(())
}

async fn upsert_degraded(
    pool: &Pool<Postgres>,
    settings: &ReservationSetting,
) -> BookingResult<()> {
    sqlx::query(UPSERT_DEGRADED_SQL)
        .bind(settings.facility_id)
        .bind(settings.enabled)
        .bind(settings.slot_unit_minutes)
        .bind(settings.allowed_days_ahead)
        .bind(settings.capacity_per_slot)
        .bind(settings.auto_confirm)
        .execute(pool)
        .await
        .map_err(classify)?;

    Ok(())
}

/// Replace-all seat update: delete every seat row for the facility, then
/// insert the new list. Not diffed; concurrent editors race and the last
/// writer wins.
pub async fn replace_seats(
    pool: &Pool<Postgres>,
    facility_id: Uuid,
    seat_codes: &[String],
) -> BookingResult<()> {
    tracing::debug!(
        "Replacing {} seats for facility {}",
        seat_codes.len(),
        facility_id
    );

    sqlx::query(
        r#"
        DELETE FROM seats
        WHERE facility_id = $1
        "#,
    )
    .bind(facility_id)
    .execute(pool)
    .await
    .map_err(classify)?;

    for code in seat_codes {
        sqlx::query(
            r#"
            INSERT INTO seats (facility_id, seat_code)
            VALUES ($1, $2)
            "#,
        )
        .bind(facility_id)
        .bind(code)
        .execute(pool)
        .await
        .map_err(classify)?;
    }

    Ok(())
}

pub async fn list_seats(pool: &Pool<Postgres>, facility_id: Uuid) -> BookingResult<Vec<DbSeat>> {
    let seats = sqlx::query_as::<_, DbSeat>(
        r#"
        SELECT facility_id, seat_code, created_at
        FROM seats
        WHERE facility_id = $1
        ORDER BY seat_code ASC
        "#,
    )
    .bind(facility_id)
    .fetch_all(pool)
    .await
    .map_err(classify)?;

    Ok(seats)
}
