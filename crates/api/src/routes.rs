pub mod health;
pub mod notifications;
pub mod reservations;
pub mod settings;
pub mod slots;
