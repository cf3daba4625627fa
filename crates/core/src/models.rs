pub mod notification;
pub mod reservation;
pub mod settings;
pub mod slot;
