//! Clients for the two external execution routes the workflow depends on.
//!
//! The privileged gateway is a backend-mediated path that re-validates
//! ownership server-side before applying a mutation or inserting a
//! notification; it is invoked when the direct, policy-scoped path is
//! rejected. The external relay is a fire-and-forget messaging channel
//! whose failures the workflow swallows entirely.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::models::notification::NotificationPayload;

/// Privileged backend execution route.
#[mockall::automock]
#[async_trait]
pub trait PrivilegedGateway: Send + Sync {
    /// Re-validates that `owner_id` owns the reservation's facility, then
    /// applies the pending-to-confirmed transition server-side.
    async fn confirm_reservation(&self, owner_id: Uuid, reservation_id: Uuid)
        -> BookingResult<()>;

    /// Inserts an in-app notification on behalf of the workflow.
    async fn send_notification(&self, payload: NotificationPayload) -> BookingResult<()>;
}

/// External messaging relay. Best-effort from the workflow's perspective.
#[mockall::automock]
#[async_trait]
pub trait ExternalRelay: Send + Sync {
    async fn deliver(&self, payload: NotificationPayload) -> BookingResult<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmRequestBody {
    owner_id: Uuid,
    reservation_id: Uuid,
}

/// HTTP implementation of the privileged gateway.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PrivilegedGateway for HttpGateway {
    async fn confirm_reservation(
        &self,
        owner_id: Uuid,
        reservation_id: Uuid,
    ) -> BookingResult<()> {
        let url = format!("{}/reservations/confirm", self.base_url);
        let body = ConfirmRequestBody {
            owner_id,
            reservation_id,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BookingError::Database(eyre::eyre!("gateway unreachable: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(BookingError::Authorization(format!(
                "gateway rejected confirmation of {}: {}",
                reservation_id,
                response.status()
            )))
        }
    }

    async fn send_notification(&self, payload: NotificationPayload) -> BookingResult<()> {
        let url = format!("{}/notifications", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BookingError::Notification(format!("gateway unreachable: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(BookingError::Notification(format!(
                "gateway notification insert failed: {}",
                response.status()
            )))
        }
    }
}

/// HTTP implementation of the external relay.
pub struct HttpRelay {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRelay {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl ExternalRelay for HttpRelay {
    async fn deliver(&self, payload: NotificationPayload) -> BookingResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BookingError::Notification(format!("relay unreachable: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(BookingError::Notification(format!(
                "relay delivery failed: {}",
                response.status()
            )))
        }
    }
}

/// Relay used when no RELAY_URL is configured: records the attempt in the
/// log and reports success so the channel stays inert.
pub struct LogOnlyRelay;

#[async_trait]
impl ExternalRelay for LogOnlyRelay {
    async fn deliver(&self, payload: NotificationPayload) -> BookingResult<()> {
        tracing::debug!(
            "No relay configured; dropping message for user {}",
            payload.user_id
        );
        Ok(())
    }
}
