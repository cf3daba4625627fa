use chrono::{NaiveDate, NaiveTime};
use mockall::mock;
use uuid::Uuid;

use slotbook_core::errors::BookingResult;
use slotbook_core::models::reservation::{ReservationFilters, ReservationStatus};
use slotbook_core::models::settings::ReservationSetting;

use crate::models::{DbFacility, DbNotification, DbReservation, DbReservationSetting, DbSeat};

// Mock repositories for testing
mock! {
    pub FacilityRepo {
        pub async fn get_facility_by_id(
            &self,
            id: Uuid,
        ) -> BookingResult<Option<DbFacility>>;
    }
}

mock! {
    pub SettingsRepo {
        pub async fn get_settings(
            &self,
            facility_id: Uuid,
        ) -> BookingResult<Option<DbReservationSetting>>;

        pub async fn upsert_settings(
            &self,
            settings: ReservationSetting,
        ) -> BookingResult<bool>;

        pub async fn replace_seats(
            &self,
            facility_id: Uuid,
            seat_codes: Vec<String>,
        ) -> BookingResult<()>;

        pub async fn list_seats(
            &self,
            facility_id: Uuid,
        ) -> BookingResult<Vec<DbSeat>>;
    }
}

mock! {
    pub ReservationRepo {
        pub async fn list_reservations(
            &self,
            facility_id: Uuid,
            filters: ReservationFilters,
        ) -> BookingResult<Vec<DbReservation>>;

        pub async fn get_reservation_by_id(
            &self,
            id: Uuid,
        ) -> BookingResult<Option<DbReservation>>;

        #[allow(clippy::too_many_arguments)]
        pub async fn create_reservation(
            &self,
            facility_id: Uuid,
            user_id: Uuid,
            seat_code: Option<String>,
            reserved_date: NaiveDate,
            start_time: NaiveTime,
            end_time: NaiveTime,
            status: ReservationStatus,
            customer_name: Option<String>,
        ) -> BookingResult<DbReservation>;

        pub async fn confirm_reservation_owned(
            &self,
            owner_id: Uuid,
            reservation_id: Uuid,
        ) -> BookingResult<DbReservation>;

        pub async fn cancel_reservation_owned(
            &self,
            owner_id: Uuid,
            reservation_id: Uuid,
        ) -> BookingResult<DbReservation>;

        pub async fn slot_counts(
            &self,
            facility_id: Uuid,
            date: NaiveDate,
        ) -> BookingResult<Vec<(NaiveTime, i64)>>;
    }
}

mock! {
    pub NotificationRepo {
        pub async fn insert_thread_message(
            &self,
            facility_id: Uuid,
            sender_id: Uuid,
            body: String,
        ) -> BookingResult<crate::models::DbThreadMessage>;

        pub async fn insert_notification(
            &self,
            payload: slotbook_core::models::notification::NotificationPayload,
        ) -> BookingResult<DbNotification>;
    }
}
