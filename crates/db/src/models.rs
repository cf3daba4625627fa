use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use slotbook_core::errors::BookingError;
use slotbook_core::models::reservation::ReservationResponse;
use slotbook_core::models::settings::ReservationSetting;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbFacility {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReservationSetting {
    pub facility_id: Uuid,
    pub enabled: bool,
    pub slot_unit_minutes: i32,
    pub allowed_days_ahead: i32,
    pub capacity_per_slot: i32,
    pub auto_confirm: bool,
    pub auto_message_enabled: bool,
    pub auto_message_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbReservationSetting> for ReservationSetting {
    fn from(row: DbReservationSetting) -> Self {
        Self {
            facility_id: row.facility_id,
            enabled: row.enabled,
            slot_unit_minutes: row.slot_unit_minutes,
            allowed_days_ahead: row.allowed_days_ahead,
            capacity_per_slot: row.capacity_per_slot,
            auto_confirm: row.auto_confirm,
            auto_message_enabled: row.auto_message_enabled,
            auto_message_text: row.auto_message_text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSeat {
    pub facility_id: Uuid,
    pub seat_code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReservation {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub user_id: Uuid,
    pub seat_code: Option<String>,
    pub reserved_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    /// Absent in deployments whose schema predates the column; selected as
    /// NULL there.
    pub customer_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbReservation> for ReservationResponse {
    type Error = BookingError;

    fn try_from(row: DbReservation) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            facility_id: row.facility_id,
            user_id: row.user_id,
            seat_code: row.seat_code,
            reserved_date: row.reserved_date,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status.parse()?,
            customer_name: row.customer_name,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbThreadMessage {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub link_url: Option<String>,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}
