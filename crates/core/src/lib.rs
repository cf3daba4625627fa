//! # Slotbook Core
//!
//! Domain types and pure logic for the Slotbook facility reservation engine:
//! the error taxonomy, slot generation, reservation settings with their
//! validation rules, and the request/response models shared by the API and
//! persistence layers.

pub mod errors;
pub mod models;
