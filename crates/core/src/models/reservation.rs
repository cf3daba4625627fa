use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::BookingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    /// Confirmed and cancelled are terminal; only pending rows may move.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ReservationStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(BookingError::Validation(format!(
                "unknown reservation status: {}",
                other
            ))),
        }
    }
}

/// Status filter for owner-facing listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Confirmed,
}

impl StatusFilter {
    /// The concrete status this filter narrows to, if any.
    pub fn as_status(&self) -> Option<ReservationStatus> {
        match self {
            Self::All => None,
            Self::Pending => Some(ReservationStatus::Pending),
            Self::Confirmed => Some(ReservationStatus::Confirmed),
        }
    }
}

/// Active listing filters: optional exact date, optional status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReservationFilters {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub status: StatusFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    pub user_id: Uuid,
    pub seat_code: Option<String>,
    pub reserved_date: NaiveDate,
    pub start_time: NaiveTime,
    pub customer_name: Option<String>,
    /// The booking collaborator may supply `confirmed` directly when the
    /// facility auto-confirms at creation time; anything else is rejected.
    pub status: Option<ReservationStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub user_id: Uuid,
    pub seat_code: Option<String>,
    pub reserved_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: ReservationStatus,
    pub customer_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListReservationsResponse {
    pub reservations: Vec<ReservationResponse>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub message: Option<String>,
    /// The caller's active listing filters, used for reconciliation after
    /// the status mutation.
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub status: StatusFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmResponse {
    pub id: Uuid,
    pub status: ReservationStatus,
    /// Authoritative listing under the caller's filters, replacing any
    /// optimistic view the caller holds.
    pub reservations: Vec<ReservationResponse>,
}

/// Checks the advance-booking window: a reservation date must fall between
/// today and `allowed_days_ahead` days out, inclusive.
pub fn within_booking_window(reserved: NaiveDate, today: NaiveDate, allowed_days_ahead: i32) -> bool {
    if reserved < today {
        return false;
    }
    (reserved - today).num_days() <= allowed_days_ahead as i64
}
