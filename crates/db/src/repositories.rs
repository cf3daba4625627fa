pub mod facility;
pub mod notification;
pub mod reservation;
pub mod settings;
