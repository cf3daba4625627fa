/// In-app notification feed
pub mod notifications;
/// Reservation listing, creation, confirmation, and cancellation
pub mod reservations;
/// Reservation settings and seat management
pub mod settings;
/// Generated slot listings with remaining capacity
pub mod slots;

use std::sync::Arc;
use uuid::Uuid;

use slotbook_core::errors::BookingError;
use slotbook_db::models::DbFacility;

use crate::middleware::error_handling::AppError;
use crate::ApiState;

/// Loads a facility and checks that the caller owns it. The persistence
/// layer's access policy; the privileged gateway re-validates independently.
pub(crate) async fn require_owner(
    state: &Arc<ApiState>,
    facility_id: Uuid,
    owner_id: Uuid,
) -> Result<DbFacility, AppError> {
    let facility = slotbook_db::repositories::facility::get_facility_by_id(
        &state.db_pool,
        facility_id,
    )
    .await?
    .ok_or_else(|| {
        BookingError::NotFound(format!("Facility with ID {} not found", facility_id))
    })?;

    if facility.owner_id != owner_id {
        return Err(AppError(BookingError::Authorization(format!(
            "Owner {} does not manage facility {}",
            owner_id, facility_id
        ))));
    }

    Ok(facility)
}
