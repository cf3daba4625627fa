use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use slotbook_core::errors::BookingError;
use slotbook_core::models::reservation::{
    within_booking_window, ConfirmRequest, ConfirmResponse, CreateReservationRequest,
    ListReservationsResponse, ReservationFilters, ReservationResponse, ReservationStatus,
    StatusFilter,
};
use slotbook_core::models::settings::ReservationSetting;
use slotbook_core::models::slot::generate_slots;
use slotbook_db::models::DbReservation;

use crate::handlers::require_owner;
use crate::middleware::{auth::OwnerId, error_handling::AppError};
use crate::workflow::confirmation::ConfirmationWorkflow;
use crate::workflow::{PgStore, ReservationView};
use crate::ApiState;

/// Query parameters for the owner-facing reservation listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub date: Option<NaiveDate>,
    pub status: Option<StatusFilter>,
}

fn to_responses(rows: Vec<DbReservation>) -> Result<Vec<ReservationResponse>, BookingError> {
    rows.into_iter().map(TryInto::try_into).collect()
}

#[axum::debug_handler]
pub async fn list_reservations(
    State(state): State<Arc<ApiState>>,
    OwnerId(owner_id): OwnerId,
    Path(facility_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListReservationsResponse>, AppError> {
    require_owner(&state, facility_id, owner_id).await?;

    let filters = ReservationFilters {
        date: query.date,
        status: query.status.unwrap_or_default(),
    };

    let rows = slotbook_db::repositories::reservation::list_reservations(
        &state.db_pool,
        &state.capabilities,
        facility_id,
        &filters,
    )
    .await?;

    Ok(Json(ListReservationsResponse {
        reservations: to_responses(rows)?,
    }))
}

/// Booking entry point used by the customer-facing collaborator. Validates
/// the advance window, the slot geometry, and the seat code before the
/// capacity-checked insert.
#[axum::debug_handler]
pub async fn create_reservation(
    State(state): State<Arc<ApiState>>,
    Path(facility_id): Path<Uuid>,
    Json(payload): Json<CreateReservationRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
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
        return Err(AppError(BookingError::Validation(format!(
            "Facility {} does not accept reservations",
            facility_id
        ))));
    }

    // This engine does not decide auto-confirmation; the collaborator may
    // supply `confirmed` directly when the facility policy allows it.
    let status = match payload.status {
        None | Some(ReservationStatus::Pending) => ReservationStatus::Pending,
        Some(ReservationStatus::Confirmed) => ReservationStatus::Confirmed,
        Some(ReservationStatus::Cancelled) => {
            return Err(AppError(BookingError::Validation(
                "A reservation cannot be created as cancelled".to_string(),
            )));
        }
    };

    let today = Utc::now().date_naive();
    if !within_booking_window(payload.reserved_date, today, settings.allowed_days_ahead) {
        return Err(AppError(BookingError::Validation(format!(
            "Date {} is outside the booking window of {} days",
            payload.reserved_date, settings.allowed_days_ahead
        ))));
    }

    // The requested start must be one of the slots generated from the
    // facility's declared hours; the end time is derived, never trusted.
    let slots = generate_slots(
        facility.open_time,
        facility.close_time,
        settings.slot_unit_minutes as u32,
    );
    let slot = slots
        .iter()
        .find(|slot| slot.start == payload.start_time)
        .ok_or_else(|| {
            BookingError::Validation(format!(
                "{} is not a bookable start time for facility {}",
                payload.start_time, facility_id
            ))
        })?;

    if let Some(seat_code) = &payload.seat_code {
        let seats =
            slotbook_db::repositories::settings::list_seats(&state.db_pool, facility_id).await?;
        if !seats.iter().any(|seat| &seat.seat_code == seat_code) {
            return Err(AppError(BookingError::Validation(format!(
                "Seat {} is not defined for facility {}",
                seat_code, facility_id
            ))));
        }
    }

    let reservation = slotbook_db::repositories::reservation::create_reservation(
        &state.db_pool,
        &state.capabilities,
        facility_id,
        payload.user_id,
        payload.seat_code.as_deref(),
        payload.reserved_date,
        slot.start,
        slot.end,
        status,
        payload.customer_name.as_deref(),
    )
    .await?;

    Ok(Json(reservation.try_into()?))
}

#[axum::debug_handler]
pub async fn confirm_reservation(
    State(state): State<Arc<ApiState>>,
    OwnerId(owner_id): OwnerId,
    Path(reservation_id): Path<Uuid>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, AppError> {
    let store = PgStore::new(state.db_pool.clone(), state.capabilities);
    let workflow =
        ConfirmationWorkflow::new(&store, state.gateway.as_ref(), state.relay.as_ref());

    let filters = ReservationFilters {
        date: payload.date,
        status: payload.status,
    };

    // Seed the working view with the caller's current listing so the
    // optimistic step still has rows to return if reconciliation fails.
    // A failed pre-load only costs the seeding; the workflow surfaces any
    // real error itself.
    let mut view = ReservationView::default();
    if let Ok(Some(existing)) = slotbook_db::repositories::reservation::get_reservation_by_id(
        &state.db_pool,
        &state.capabilities,
        reservation_id,
    )
    .await
    {
        match slotbook_db::repositories::reservation::list_reservations(
            &state.db_pool,
            &state.capabilities,
            existing.facility_id,
            &filters,
        )
        .await
        {
            Ok(rows) => view = ReservationView::from_rows(rows),
            Err(err) => tracing::warn!(
                "Could not pre-load the listing for facility {}: {}",
                existing.facility_id,
                err
            ),
        }
    }

    let outcome = workflow
        .confirm(
            owner_id,
            reservation_id,
            payload.message.as_deref(),
            filters,
            &mut view,
        )
        .await?;

    Ok(Json(ConfirmResponse {
        id: reservation_id,
        status: ReservationStatus::Confirmed,
        reservations: to_responses(outcome.reservations)?,
    }))
}

/// Pending-to-cancelled transition. Cancellation has no notification
/// fanout; it is a plain owner-scoped status mutation.
#[axum::debug_handler]
pub async fn cancel_reservation(
    State(state): State<Arc<ApiState>>,
    OwnerId(owner_id): OwnerId,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = slotbook_db::repositories::reservation::cancel_reservation_owned(
        &state.db_pool,
        &state.capabilities,
        owner_id,
        reservation_id,
    )
    .await?;

    Ok(Json(reservation.try_into()?))
}
