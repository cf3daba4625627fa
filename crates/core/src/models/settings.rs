use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};

/// Slot unit lengths an owner may choose, in minutes.
pub const SLOT_UNIT_CHOICES: [i32; 6] = [15, 30, 45, 60, 90, 120];

pub const MIN_DAYS_AHEAD: i32 = 1;
pub const MAX_DAYS_AHEAD: i32 = 365;
pub const MIN_CAPACITY: i32 = 1;
pub const MAX_CAPACITY: i32 = 1000;

/// Per-facility reservation configuration. One row per facility, created
/// with defaults on first access and mutated only through the settings form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationSetting {
    pub facility_id: Uuid,
    pub enabled: bool,
    pub slot_unit_minutes: i32,
    pub allowed_days_ahead: i32,
    pub capacity_per_slot: i32,
    pub auto_confirm: bool,
    pub auto_message_enabled: bool,
    pub auto_message_text: Option<String>,
}

impl ReservationSetting {
    /// The defaults used when a facility has no persisted settings row yet.
    pub fn defaults(facility_id: Uuid) -> Self {
        Self {
            facility_id,
            enabled: false,
            slot_unit_minutes: 60,
            allowed_days_ahead: 90,
            capacity_per_slot: 10,
            auto_confirm: true,
            auto_message_enabled: false,
            auto_message_text: None,
        }
    }

    pub fn validate(&self) -> BookingResult<()> {
        if !SLOT_UNIT_CHOICES.contains(&self.slot_unit_minutes) {
            return Err(BookingError::Validation(format!(
                "slot_unit_minutes must be one of {:?}, got {}",
                SLOT_UNIT_CHOICES, self.slot_unit_minutes
            )));
        }
        if self.allowed_days_ahead < MIN_DAYS_AHEAD || self.allowed_days_ahead > MAX_DAYS_AHEAD {
            return Err(BookingError::Validation(format!(
                "allowed_days_ahead must be between {} and {}, got {}",
                MIN_DAYS_AHEAD, MAX_DAYS_AHEAD, self.allowed_days_ahead
            )));
        }
        if self.capacity_per_slot < MIN_CAPACITY || self.capacity_per_slot > MAX_CAPACITY {
            return Err(BookingError::Validation(format!(
                "capacity_per_slot must be between {} and {}, got {}",
                MIN_CAPACITY, MAX_CAPACITY, self.capacity_per_slot
            )));
        }
        Ok(())
    }

    /// Resolves the message sent when a reservation is confirmed.
    ///
    /// An explicit non-empty message wins; otherwise the facility's default
    /// text applies when auto-messaging is enabled; otherwise no message is
    /// sent at all.
    pub fn confirmation_message(&self, explicit: Option<&str>) -> Option<String> {
        if let Some(message) = explicit {
            let trimmed = message.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if self.auto_message_enabled {
            if let Some(text) = &self.auto_message_text {
                if !text.trim().is_empty() {
                    return Some(text.clone());
                }
            }
        }
        None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub enabled: bool,
    pub slot_unit_minutes: i32,
    pub allowed_days_ahead: i32,
    pub capacity_per_slot: i32,
    pub auto_confirm: bool,
    pub auto_message_enabled: bool,
    pub auto_message_text: Option<String>,
    /// Replace-all seat list: every existing seat row is deleted and this
    /// list inserted in its place. Last writer wins.
    #[serde(default)]
    pub seats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub facility_id: Uuid,
    pub enabled: bool,
    pub slot_unit_minutes: i32,
    pub allowed_days_ahead: i32,
    pub capacity_per_slot: i32,
    pub auto_confirm: bool,
    pub auto_message_enabled: bool,
    pub auto_message_text: Option<String>,
    pub seats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettingsResponse {
    pub facility_id: Uuid,
    /// True when the deployment schema lacks the auto-message columns and
    /// the save went through without them.
    pub degraded: bool,
    pub updated_at: DateTime<Utc>,
}
