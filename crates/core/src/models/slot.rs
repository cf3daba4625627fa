use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// A fixed-length bookable time window derived from a facility's business
/// hours and its configured unit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Generates the ordered sequence of bookable slots between `open` and
/// `close` for the given unit length.
///
/// The cursor starts at `open` and advances by `unit_minutes`; a slot is
/// emitted only when it fits entirely before `close`. A trailing remainder
/// shorter than one unit is dropped whole, never truncated. `close <= open`
/// (or a zero unit) yields an empty sequence rather than an error.
pub fn generate_slots(open: NaiveTime, close: NaiveTime, unit_minutes: u32) -> Vec<Slot> {
    // A unit too long to express in seconds cannot fit any window either.
    let Some(unit_secs) = unit_minutes.checked_mul(60) else {
        return Vec::new();
    };
    if unit_secs == 0 || close <= open {
        return Vec::new();
    }

    let close_secs = close.num_seconds_from_midnight();
    let mut cursor_secs = open.num_seconds_from_midnight();
    let mut slots = Vec::new();

    // cursor_secs <= close_secs holds throughout, so the subtraction
    // cannot wrap even for units far larger than a day
    while close_secs - cursor_secs >= unit_secs {
        let end_secs = cursor_secs + unit_secs;
        // end_secs <= close_secs < 86400, so both conversions are in range
        let start = NaiveTime::from_num_seconds_from_midnight_opt(cursor_secs, 0)
            .expect("slot start within a day");
        let end = NaiveTime::from_num_seconds_from_midnight_opt(end_secs, 0)
            .expect("slot end within a day");
        slots.push(Slot { start, end });
        cursor_secs = end_secs;
    }

    slots
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// Seats left in this slot: capacity minus non-cancelled reservations.
    pub remaining: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotListResponse {
    pub date: NaiveDate,
    pub slots: Vec<SlotAvailability>,
}
