use sqlx::{Pool, Postgres};
use uuid::Uuid;

use slotbook_core::errors::BookingResult;

use crate::capabilities::classify;
use crate::models::DbFacility;

pub async fn get_facility_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> BookingResult<Option<DbFacility>> {
    let facility = sqlx::query_as::<_, DbFacility>(
        r#"
        SELECT id, owner_id, name, open_time, close_time, created_at
        FROM facilities
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(classify)?;

    Ok(facility)
}
