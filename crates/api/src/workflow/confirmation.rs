//! The pending-to-confirmed state machine.
//!
//! Confirmation runs five steps strictly in order: (1) the durable status
//! mutation, with a privileged fallback when the direct path is rejected by
//! access policy; (2) an optimistic update of the caller's working view;
//! (3) message composition; (4) best-effort notification dispatch; (5)
//! reconciliation against the authoritative listing. The operation is
//! successful once step 1 lands; nothing later can reverse or fail it.

use tracing::{debug, warn};
use uuid::Uuid;

use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::models::notification::NotificationPayload;
use slotbook_core::models::reservation::ReservationFilters;

use crate::gateway::{ExternalRelay, PrivilegedGateway};
use crate::workflow::fanout::{FanoutReport, NotificationFanout};
use crate::workflow::{is_policy_rejection, ReservationView, WorkflowStore};

use slotbook_db::models::DbReservation;

/// What a completed confirmation produced.
#[derive(Debug)]
pub struct ConfirmOutcome {
    pub reservation: DbReservation,
    /// Channel outcomes from step 4; None when no message was configured
    /// and dispatch was skipped altogether.
    pub fanout: Option<FanoutReport>,
    /// The reconciled listing under the caller's filters.
    pub reservations: Vec<DbReservation>,
}

pub struct ConfirmationWorkflow<'a> {
    store: &'a dyn WorkflowStore,
    gateway: &'a dyn PrivilegedGateway,
    relay: &'a dyn ExternalRelay,
}

impl<'a> ConfirmationWorkflow<'a> {
    pub fn new(
        store: &'a dyn WorkflowStore,
        gateway: &'a dyn PrivilegedGateway,
        relay: &'a dyn ExternalRelay,
    ) -> Self {
        Self {
            store,
            gateway,
            relay,
        }
    }

    /// Confirms a pending reservation on behalf of the facility owner.
    ///
    /// Fails only when the status mutation itself cannot be applied through
    /// either path; notification failures are recovered locally and the
    /// caller cannot distinguish partial delivery from full success.
    pub async fn confirm(
        &self,
        owner_id: Uuid,
        reservation_id: Uuid,
        explicit_message: Option<&str>,
        filters: ReservationFilters,
        view: &mut ReservationView,
    ) -> BookingResult<ConfirmOutcome> {
        // Step 1: durable status mutation.
        let reservation = self.mutate_status(owner_id, reservation_id).await?;
        debug!(
            "Reservation {} confirmed for facility {}",
            reservation.id, reservation.facility_id
        );

        // Step 2: optimistic view update, ahead of the re-query.
        view.apply_optimistic(reservation_id);

        // Step 3: message composition.
        let message = match self.store.get_settings(reservation.facility_id).await {
            Ok(settings) => settings.confirmation_message(explicit_message),
            Err(err) => {
                // The mutation is already durable; an unreadable settings
                // row only costs the auto-message.
                warn!(
                    "Could not load settings for facility {}: {}",
                    reservation.facility_id, err
                );
                explicit_message
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(String::from)
            }
        };

        // Step 4: best-effort dispatch, skipped entirely when there is no
        // message to send.
        let fanout = match message {
            Some(text) => Some(self.dispatch(&reservation, owner_id, text).await),
            None => None,
        };

        // Step 5: reconciliation under the caller's active filters.
        let reservations = match self
            .store
            .list_reservations(reservation.facility_id, filters)
            .await
        {
            Ok(rows) => {
                view.reconcile_from_source(rows.clone());
                rows
            }
            Err(err) => {
                // Confirmation already succeeded; keep the optimistic view.
                warn!(
                    "Reconciliation failed for facility {}: {}",
                    reservation.facility_id, err
                );
                view.rows.clone()
            }
        };

        Ok(ConfirmOutcome {
            reservation,
            fanout,
            reservations,
        })
    }

    /// Step 1: direct owner-scoped update, with the privileged gateway as
    /// the fallback for access-policy rejections. Row-not-found is fatal
    /// immediately; the fallback exists only for policy blocks the backend
    /// can re-validate around.
    async fn mutate_status(
        &self,
        owner_id: Uuid,
        reservation_id: Uuid,
    ) -> BookingResult<DbReservation> {
        match self
            .store
            .confirm_reservation_owned(owner_id, reservation_id)
            .await
        {
            Ok(reservation) => Ok(reservation),
            Err(err) if is_policy_rejection(&err) => {
                warn!(
                    "Direct confirmation of {} blocked by policy: {}; retrying via gateway",
                    reservation_id, err
                );
                self.gateway
                    .confirm_reservation(owner_id, reservation_id)
                    .await?;
                self.store
                    .get_reservation_by_id(reservation_id)
                    .await?
                    .ok_or_else(|| {
                        BookingError::NotFound(format!(
                            "Reservation with ID {} not found after gateway confirmation",
                            reservation_id
                        ))
                    })
            }
            Err(err) => Err(err),
        }
    }

    /// Step 4: thread message first, then the in-app and relay channels.
    /// Every failure is isolated and logged; the report is informational.
    async fn dispatch(
        &self,
        reservation: &DbReservation,
        owner_id: Uuid,
        text: String,
    ) -> FanoutReport {
        let thread_message = match self
            .store
            .insert_thread_message(reservation.facility_id, owner_id, text.clone())
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "Thread message insert failed for facility {}: {}",
                    reservation.facility_id, err
                );
                false
            }
        };

        let link_url = Some(format!(
            "/facilities/{}/reservations/{}",
            reservation.facility_id, reservation.id
        ));
        let payload = NotificationPayload::reservation_confirmed(reservation.user_id, text, link_url);

        let fanout = NotificationFanout::new(self.store, self.gateway, self.relay);
        let mut report = fanout.send(payload).await;
        report.thread_message = thread_message;
        report
    }
}
