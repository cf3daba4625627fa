//! # Owner Identity Extraction
//!
//! Identity itself is an external collaborator: requests arrive with the
//! authenticated owner's id in the `X-Owner-Id` header, placed there by the
//! fronting auth layer. This module only extracts and parses it; the
//! persistence layer enforces owner scope on every mutation and the
//! privileged gateway re-validates ownership server-side.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use slotbook_core::errors::BookingError;

use crate::middleware::error_handling::AppError;

pub const OWNER_ID_HEADER: &str = "x-owner-id";

/// The authenticated facility owner making the request.
#[derive(Debug, Clone, Copy)]
pub struct OwnerId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get(OWNER_ID_HEADER).ok_or_else(|| {
            AppError(BookingError::Authorization(
                "Missing X-Owner-Id header".to_string(),
            ))
        })?;

        let owner_id = header
            .to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .ok_or_else(|| {
                AppError(BookingError::Authorization(
                    "Invalid X-Owner-Id header".to_string(),
                ))
            })?;

        Ok(OwnerId(owner_id))
    }
}
