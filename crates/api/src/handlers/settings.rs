use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use slotbook_core::models::settings::{
    ReservationSetting, SettingsResponse, UpdateSettingsRequest, UpdateSettingsResponse,
};

use crate::handlers::require_owner;
use crate::middleware::{auth::OwnerId, error_handling::AppError};
use crate::ApiState;

#[axum::debug_handler]
pub async fn get_settings(
    State(state): State<Arc<ApiState>>,
    OwnerId(owner_id): OwnerId,
    Path(facility_id): Path<Uuid>,
) -> Result<Json<SettingsResponse>, AppError> {
    require_owner(&state, facility_id, owner_id).await?;

    // Defaults apply until the owner saves the form for the first time
    let settings = slotbook_db::repositories::settings::get_settings(
        &state.db_pool,
        &state.capabilities,
        facility_id,
    )
    .await?
    .map(ReservationSetting::from)
    .unwrap_or_else(|| ReservationSetting::defaults(facility_id));

    let seats =
        slotbook_db::repositories::settings::list_seats(&state.db_pool, facility_id).await?;

    let response = SettingsResponse {
        facility_id,
        enabled: settings.enabled,
        slot_unit_minutes: settings.slot_unit_minutes,
        allowed_days_ahead: settings.allowed_days_ahead,
        capacity_per_slot: settings.capacity_per_slot,
        auto_confirm: settings.auto_confirm,
        auto_message_enabled: settings.auto_message_enabled,
        auto_message_text: settings.auto_message_text,
        seats: seats.into_iter().map(|seat| seat.seat_code).collect(),
    };

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn update_settings(
    State(state): State<Arc<ApiState>>,
    OwnerId(owner_id): OwnerId,
    Path(facility_id): Path<Uuid>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<UpdateSettingsResponse>, AppError> {
    require_owner(&state, facility_id, owner_id).await?;

    let settings = ReservationSetting {
        facility_id,
        enabled: payload.enabled,
        slot_unit_minutes: payload.slot_unit_minutes,
        allowed_days_ahead: payload.allowed_days_ahead,
        capacity_per_slot: payload.capacity_per_slot,
        auto_confirm: payload.auto_confirm,
        auto_message_enabled: payload.auto_message_enabled,
        auto_message_text: payload.auto_message_text,
    };

    // Rejected before anything is persisted
    settings.validate()?;

    let degraded = slotbook_db::repositories::settings::upsert_settings(
        &state.db_pool,
        &state.capabilities,
        &settings,
    )
    .await?;

    slotbook_db::repositories::settings::replace_seats(
        &state.db_pool,
        facility_id,
        &payload.seats,
    )
    .await?;

    let response = UpdateSettingsResponse {
        facility_id,
        degraded,
        updated_at: Utc::now(),
    };

    Ok(Json(response))
}
