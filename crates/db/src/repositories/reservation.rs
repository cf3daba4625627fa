use chrono::{NaiveDate, NaiveTime};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::models::reservation::{ReservationFilters, ReservationStatus};

use crate::capabilities::{classify, SchemaCapabilities};
use crate::models::DbReservation;

/// Column list for reservation selects. Deployments whose schema predates
/// the optional display-name column get NULL in its place, so listings keep
/// working instead of failing whole.
fn reservation_columns(caps: &SchemaCapabilities, prefix: &str) -> String {
    let customer_name = if caps.reservation_customer_name {
        format!("{p}customer_name", p = prefix)
    } else {
        "NULL::text AS customer_name".to_string()
    };
    format!(
        "{p}id, {p}facility_id, {p}user_id, {p}seat_code, {p}reserved_date, \
         {p}start_time, {p}end_time, {p}status, {cn}, {p}created_at",
        p = prefix,
        cn = customer_name
    )
}

pub async fn list_reservations(
    pool: &Pool<Postgres>,
    caps: &SchemaCapabilities,
    facility_id: Uuid,
    filters: &ReservationFilters,
) -> BookingResult<Vec<DbReservation>> {
    tracing::debug!(
        "Listing reservations for facility {} (date={:?}, status={:?})",
        facility_id,
        filters.date,
        filters.status
    );

    let sql = format!(
        r#"
        SELECT {columns}
        FROM reservations
        WHERE facility_id = $1
          AND ($2::date IS NULL OR reserved_date = $2)
          AND ($3::varchar IS NULL OR status = $3)
        ORDER BY reserved_date ASC, start_time ASC
        "#,
        columns = reservation_columns(caps, "")
    );

    let status = filters.status.as_status().map(|s| s.to_string());
    let reservations = sqlx::query_as::<_, DbReservation>(&sql)
        .bind(facility_id)
        .bind(filters.date)
        .bind(status)
        .fetch_all(pool)
        .await
        .map_err(classify)?;

    Ok(reservations)
}

pub async fn get_reservation_by_id(
    pool: &Pool<Postgres>,
    caps: &SchemaCapabilities,
    id: Uuid,
) -> BookingResult<Option<DbReservation>> {
    let sql = format!(
        r#"
        SELECT {columns}
        FROM reservations
        WHERE id = $1
        "#,
        columns = reservation_columns(caps, "")
    );

    let reservation = sqlx::query_as::<_, DbReservation>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(classify)?;

    Ok(reservation)
}

/// Inserts a reservation, enforcing per-slot capacity.
///
/// The count-then-insert pair runs inside a transaction holding a row lock
/// on the facility's settings row, so creations for one facility are
/// serialised and the capacity bound holds under concurrent load.
#[allow(clippy::too_many_arguments)]
pub async fn create_reservation(
    pool: &Pool<Postgres>,
    caps: &SchemaCapabilities,
    facility_id: Uuid,
    user_id: Uuid,
    seat_code: Option<&str>,
    reserved_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    status: ReservationStatus,
    customer_name: Option<&str>,
) -> BookingResult<DbReservation> {
    let mut tx = pool.begin().await.map_err(classify)?;

    // Settings row may not exist yet for a facility that was never
    // configured; the column defaults make a bare insert a valid row.
    sqlx::query(
        r#"
        INSERT INTO reservation_settings (facility_id)
        VALUES ($1)
        ON CONFLICT (facility_id) DO NOTHING
        "#,
    )
    .bind(facility_id)
    .execute(&mut *tx)
    .await
    .map_err(classify)?;

    let capacity: i32 = sqlx::query_scalar(
        r#"
        SELECT capacity_per_slot
        FROM reservation_settings
        WHERE facility_id = $1
        FOR UPDATE
        "#,
    )
    .bind(facility_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(classify)?;

    let occupied: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM reservations
        WHERE facility_id = $1
          AND reserved_date = $2
          AND start_time = $3
          AND status <> 'cancelled'
        "#,
    )
    .bind(facility_id)
    .bind(reserved_date)
    .bind(start_time)
    .fetch_one(&mut *tx)
    .await
    .map_err(classify)?;

    if occupied >= capacity as i64 {
        return Err(BookingError::Validation(format!(
            "slot {} {} is fully booked ({} of {})",
            reserved_date, start_time, occupied, capacity
        )));
    }

    let reservation = if caps.reservation_customer_name {
        let sql = format!(
            r#"
            INSERT INTO reservations
                (facility_id, user_id, seat_code, reserved_date, start_time,
                 end_time, status, customer_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {columns}
            "#,
            columns = reservation_columns(caps, "")
        );
        sqlx::query_as::<_, DbReservation>(&sql)
            .bind(facility_id)
            .bind(user_id)
            .bind(seat_code)
            .bind(reserved_date)
            .bind(start_time)
            .bind(end_time)
            .bind(status.to_string())
            .bind(customer_name)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify)?
    } else {
        let sql = format!(
            r#"
            INSERT INTO reservations
                (facility_id, user_id, seat_code, reserved_date, start_time,
                 end_time, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {columns}
            "#,
            columns = reservation_columns(caps, "")
        );
        sqlx::query_as::<_, DbReservation>(&sql)
            .bind(facility_id)
            .bind(user_id)
            .bind(seat_code)
            .bind(reserved_date)
            .bind(start_time)
            .bind(end_time)
            .bind(status.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(classify)?
    };

    tx.commit().await.map_err(classify)?;

    tracing::debug!("Reservation created: id={}", reservation.id);
    Ok(reservation)
}

/// Owner-scoped pending-to-confirmed transition. The WHERE clause is the
/// access policy: it only matches when the caller owns the facility and the
/// row is still pending.
pub async fn confirm_reservation_owned(
    pool: &Pool<Postgres>,
    caps: &SchemaCapabilities,
    owner_id: Uuid,
    reservation_id: Uuid,
) -> BookingResult<DbReservation> {
    transition_owned(pool, caps, owner_id, reservation_id, ReservationStatus::Confirmed).await
}

/// Owner-scoped pending-to-cancelled transition.
pub async fn cancel_reservation_owned(
    pool: &Pool<Postgres>,
    caps: &SchemaCapabilities,
    owner_id: Uuid,
    reservation_id: Uuid,
) -> BookingResult<DbReservation> {
    transition_owned(pool, caps, owner_id, reservation_id, ReservationStatus::Cancelled).await
}

async fn transition_owned(
    pool: &Pool<Postgres>,
    caps: &SchemaCapabilities,
    owner_id: Uuid,
    reservation_id: Uuid,
    target: ReservationStatus,
) -> BookingResult<DbReservation> {
    tracing::debug!(
        "Transitioning reservation {} to {} for owner {}",
        reservation_id,
        target,
        owner_id
    );

    let sql = format!(
        r#"
        UPDATE reservations AS r
        SET status = $3
        FROM facilities AS f
        WHERE r.id = $1
          AND f.id = r.facility_id
          AND f.owner_id = $2
          AND r.status = 'pending'
        RETURNING {columns}
        "#,
        columns = reservation_columns(caps, "r.")
    );

    let updated = sqlx::query_as::<_, DbReservation>(&sql)
        .bind(reservation_id)
        .bind(owner_id)
        .bind(target.to_string())
        .fetch_optional(pool)
        .await
        .map_err(classify)?;

    if let Some(reservation) = updated {
        return Ok(reservation);
    }

    // Zero rows: distinguish a missing row, a terminal row, and an access
    // policy rejection, so the caller can pick the right recovery path.
    match get_reservation_by_id(pool, caps, reservation_id).await? {
        None => Err(BookingError::NotFound(format!(
            "Reservation with ID {} not found",
            reservation_id
        ))),
        Some(reservation) if reservation.status != ReservationStatus::Pending.to_string() => {
            Err(BookingError::Validation(format!(
                "Reservation {} is already {}",
                reservation_id, reservation.status
            )))
        }
        Some(_) => Err(BookingError::Authorization(format!(
            "Owner {} may not modify reservation {}",
            owner_id, reservation_id
        ))),
    }
}

/// Non-cancelled reservation counts per start time for one facility-day,
/// used to report remaining capacity on generated slots.
pub async fn slot_counts(
    pool: &Pool<Postgres>,
    facility_id: Uuid,
    date: NaiveDate,
) -> BookingResult<Vec<(NaiveTime, i64)>> {
    let counts = sqlx::query_as::<_, (NaiveTime, i64)>(
        r#"
        SELECT start_time, COUNT(*)
        FROM reservations
        WHERE facility_id = $1
          AND reserved_date = $2
          AND status <> 'cancelled'
        GROUP BY start_time
        "#,
    )
    .bind(facility_id)
    .bind(date)
    .fetch_all(pool)
    .await
    .map_err(classify)?;

    Ok(counts)
}
