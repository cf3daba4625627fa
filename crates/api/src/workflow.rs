//! Confirmation workflow and notification fanout.
//!
//! The workflow talks to persistence through the [`WorkflowStore`] seam so
//! the state machine can be exercised against mocks; [`PgStore`] is the
//! production implementation delegating to the repository functions.

pub mod confirmation;
pub mod fanout;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::models::notification::NotificationPayload;
use slotbook_core::models::reservation::ReservationFilters;
use slotbook_core::models::settings::ReservationSetting;
use slotbook_db::capabilities::SchemaCapabilities;
use slotbook_db::models::DbReservation;
use slotbook_db::repositories::{notification, reservation, settings};

/// Persistence operations the confirmation workflow and fanout need.
#[mockall::automock]
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Direct, owner-scoped pending-to-confirmed update.
    async fn confirm_reservation_owned(
        &self,
        owner_id: Uuid,
        reservation_id: Uuid,
    ) -> BookingResult<DbReservation>;

    async fn get_reservation_by_id(&self, id: Uuid) -> BookingResult<Option<DbReservation>>;

    /// Facility settings, falling back to the defaults when no row exists.
    async fn get_settings(&self, facility_id: Uuid) -> BookingResult<ReservationSetting>;

    async fn insert_thread_message(
        &self,
        facility_id: Uuid,
        sender_id: Uuid,
        body: String,
    ) -> BookingResult<()>;

    async fn insert_notification(&self, payload: NotificationPayload) -> BookingResult<()>;

    async fn list_reservations(
        &self,
        facility_id: Uuid,
        filters: ReservationFilters,
    ) -> BookingResult<Vec<DbReservation>>;
}

/// Production store backed by the sqlx repositories.
pub struct PgStore {
    pool: PgPool,
    caps: SchemaCapabilities,
}

impl PgStore {
    pub fn new(pool: PgPool, caps: SchemaCapabilities) -> Self {
        Self { pool, caps }
    }
}

#[async_trait]
impl WorkflowStore for PgStore {
    async fn confirm_reservation_owned(
        &self,
        owner_id: Uuid,
        reservation_id: Uuid,
    ) -> BookingResult<DbReservation> {
        reservation::confirm_reservation_owned(&self.pool, &self.caps, owner_id, reservation_id)
            .await
    }

    async fn get_reservation_by_id(&self, id: Uuid) -> BookingResult<Option<DbReservation>> {
        reservation::get_reservation_by_id(&self.pool, &self.caps, id).await
    }

    async fn get_settings(&self, facility_id: Uuid) -> BookingResult<ReservationSetting> {
        let row = settings::get_settings(&self.pool, &self.caps, facility_id).await?;
        Ok(row
            .map(Into::into)
            .unwrap_or_else(|| ReservationSetting::defaults(facility_id)))
    }

    async fn insert_thread_message(
        &self,
        facility_id: Uuid,
        sender_id: Uuid,
        body: String,
    ) -> BookingResult<()> {
        notification::insert_thread_message(&self.pool, facility_id, sender_id, &body).await?;
        Ok(())
    }

    async fn insert_notification(&self, payload: NotificationPayload) -> BookingResult<()> {
        notification::insert_notification(&self.pool, &payload).await?;
        Ok(())
    }

    async fn list_reservations(
        &self,
        facility_id: Uuid,
        filters: ReservationFilters,
    ) -> BookingResult<Vec<DbReservation>> {
        reservation::list_reservations(&self.pool, &self.caps, facility_id, &filters).await
    }
}

/// The caller's working view of a reservation listing.
///
/// The confirmation workflow mutates this view optimistically right after
/// the status mutation lands, then replaces it wholesale with the
/// authoritative listing during reconciliation. The two steps are explicit
/// and independently testable rather than interleaved with rendering.
#[derive(Debug, Clone, Default)]
pub struct ReservationView {
    pub rows: Vec<DbReservation>,
}

impl ReservationView {
    pub fn from_rows(rows: Vec<DbReservation>) -> Self {
        Self { rows }
    }

    /// Marks the reservation confirmed in place, ahead of the re-query.
    pub fn apply_optimistic(&mut self, reservation_id: Uuid) {
        for row in &mut self.rows {
            if row.id == reservation_id {
                row.status = "confirmed".to_string();
            }
        }
    }

    /// Replaces the optimistic view with the authoritative listing.
    pub fn reconcile_from_source(&mut self, rows: Vec<DbReservation>) {
        self.rows = rows;
    }
}

/// True when the error represents an access-policy rejection rather than a
/// missing row, i.e. the case where the privileged fallback applies.
pub(crate) fn is_policy_rejection(err: &BookingError) -> bool {
    matches!(err, BookingError::Authorization(_))
}
