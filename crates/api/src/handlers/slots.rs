//! # Slot Listing Handler
//!
//! Converts a facility's declared business hours into the bookable windows
//! for one date, annotated with remaining capacity. The generation itself
//! is pure (`slotbook_core::models::slot::generate_slots`); this handler
//! joins the generated sequence with the non-cancelled reservation counts
//! for that facility-day.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use slotbook_core::errors::BookingError;
use slotbook_core::models::settings::ReservationSetting;
use slotbook_core::models::slot::{generate_slots, SlotAvailability, SlotListResponse};

use crate::middleware::error_handling::AppError;
use crate::ApiState;

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

#[axum::debug_handler]
pub async fn list_slots(
    State(state): State<Arc<ApiState>>,
    Path(facility_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotListResponse>, AppError> {
    let facility = slotbook_db::repositories::facility::get_facility_by_id(
        &state.db_pool,
        facility_id,
    )
    .await?
    .ok_or_else(|| {
        BookingError::NotFound(format!("Facility with ID {} not found", facility_id))
    })?;

    let settings = slotbook_db::repositories::settings::get_settings(
        &state.db_pool,
        &state.capabilities,
        facility_id,
    )
    .await?
    .map(ReservationSetting::from)
    .unwrap_or_else(|| ReservationSetting::defaults(facility_id));

    if !settings.enabled {
        // A disabled facility has no bookable slots, not an error
        return Ok(Json(SlotListResponse {
            date: query.date,
            slots: Vec::new(),
        }));
    }

    let counts: HashMap<_, _> = slotbook_db::repositories::reservation::slot_counts(
        &state.db_pool,
        facility_id,
        query.date,
    )
    .await?
    .into_iter()
    .collect();

    let slots = generate_slots(
        facility.open_time,
        facility.close_time,
        settings.slot_unit_minutes as u32,
    )
    .into_iter()
    .map(|slot| {
        let occupied = counts.get(&slot.start).copied().unwrap_or(0);
        SlotAvailability {
            start: slot.start,
            end: slot.end,
            remaining: (settings.capacity_per_slot as i64 - occupied).max(0),
        }
    })
    .collect();

    Ok(Json(SlotListResponse {
        date: query.date,
        slots,
    }))
}
