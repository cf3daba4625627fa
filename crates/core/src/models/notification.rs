use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind tag carried on confirmation notifications.
pub const KIND_RESERVATION_CONFIRMED: &str = "reservation_confirmed";

/// Payload shape shared by the in-app notification insert, the privileged
/// backend endpoint, and the external channel relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub link_url: Option<String>,
    pub kind: String,
}

impl NotificationPayload {
    pub fn reservation_confirmed(user_id: Uuid, message: String, link_url: Option<String>) -> Self {
        Self {
            user_id,
            title: "Reservation confirmed".to_string(),
            message,
            link_url,
            kind: KIND_RESERVATION_CONFIRMED.to_string(),
        }
    }
}
