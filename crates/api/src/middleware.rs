/// Owner identity extraction
pub mod auth;
/// Error-to-response mapping
pub mod error_handling;
