//! Best-effort, per-channel delivery of a confirmation message.
//!
//! Three channels exist: the in-app notification insert (with the
//! privileged gateway as its fallback) and the external relay. Each
//! channel's failure is isolated; one failing never prevents another from
//! being attempted, and no combination of failures propagates to the
//! caller.

use tracing::warn;

use slotbook_core::models::notification::NotificationPayload;

use crate::gateway::{ExternalRelay, PrivilegedGateway};
use crate::workflow::WorkflowStore;

/// Per-channel delivery outcomes. Recorded for logging and tests, never
/// aggregated into a pass/fail that could block the workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// Message landed in the facility's conversation thread
    pub thread_message: bool,
    /// Direct in-app insert succeeded
    pub in_app: bool,
    /// In-app insert went through the privileged gateway instead
    pub in_app_via_gateway: bool,
    /// External relay accepted the payload
    pub relay: bool,
}

pub struct NotificationFanout<'a> {
    store: &'a dyn WorkflowStore,
    gateway: &'a dyn PrivilegedGateway,
    relay: &'a dyn ExternalRelay,
}

impl<'a> NotificationFanout<'a> {
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

    /// Attempts the in-app channel and the external relay. The two run
    /// without mutual ordering; their relative order is immaterial.
    pub async fn send(&self, payload: NotificationPayload) -> FanoutReport {
        let (in_app, relay) = tokio::join!(
            self.send_in_app(payload.clone()),
            self.send_relay(payload.clone()),
        );

        FanoutReport {
            thread_message: false,
            in_app: in_app.0,
            in_app_via_gateway: in_app.1,
            relay,
        }
    }

    async fn send_in_app(&self, payload: NotificationPayload) -> (bool, bool) {
        match self.store.insert_notification(payload.clone()).await {
            Ok(()) => (true, false),
            Err(err) => {
                warn!(
                    "Direct notification insert failed for user {}: {}; retrying via gateway",
                    payload.user_id, err
                );
                match self.gateway.send_notification(payload.clone()).await {
                    Ok(()) => (false, true),
                    Err(err) => {
                        warn!(
                            "Gateway notification insert failed for user {}: {}",
                            payload.user_id, err
                        );
                        (false, false)
                    }
                }
            }
        }
    }

    async fn send_relay(&self, payload: NotificationPayload) -> bool {
        match self.relay.deliver(payload.clone()).await {
            Ok(()) => true,
            Err(err) => {
                // Swallowed entirely: the relay is fire-and-forget.
                warn!("Relay delivery failed for user {}: {}", payload.user_id, err);
                false
            }
        }
    }
}
