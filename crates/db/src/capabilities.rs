//! Schema capability detection.
//!
//! Deployments of the backing schema drift: older ones lack the two
//! auto-message columns on `reservation_settings` and the `customer_name`
//! column on `reservations`. Rather than discovering this reactively through
//! failed writes on every call, the optional columns are probed once against
//! `information_schema` at startup and the resulting descriptor is threaded
//! into the repositories, which pick their column lists from it.

use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

use slotbook_core::errors::BookingError;

/// Which optional columns this deployment's schema actually has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaCapabilities {
    /// `reservation_settings.auto_message_enabled` / `auto_message_text`
    pub settings_auto_message: bool,
    /// `reservations.customer_name`
    pub reservation_customer_name: bool,
}

impl SchemaCapabilities {
    /// A fully migrated schema. Used by tests and as the descriptor for
    /// freshly bootstrapped databases.
    pub fn full() -> Self {
        Self {
            settings_auto_message: true,
            reservation_customer_name: true,
        }
    }

    /// A legacy schema missing every optional column.
    pub fn legacy() -> Self {
        Self {
            settings_auto_message: false,
            reservation_customer_name: false,
        }
    }

    /// Probes `information_schema.columns` for the optional columns.
    pub async fn detect(pool: &Pool<Postgres>) -> Result<Self> {
        let settings_auto_message =
            column_exists(pool, "reservation_settings", "auto_message_enabled").await?
                && column_exists(pool, "reservation_settings", "auto_message_text").await?;
        let reservation_customer_name =
            column_exists(pool, "reservations", "customer_name").await?;

        let caps = Self {
            settings_auto_message,
            reservation_customer_name,
        };
        info!(
            "Detected schema capabilities: auto_message={}, customer_name={}",
            caps.settings_auto_message, caps.reservation_customer_name
        );
        Ok(caps)
    }
}

async fn column_exists(pool: &Pool<Postgres>, table: &str, column: &str) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM information_schema.columns
            WHERE table_name = $1 AND column_name = $2
        );
        "#,
    )
    .bind(table)
    .bind(column)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Maps a sqlx error to the domain taxonomy. Postgres 42703 (undefined
/// column) becomes the typed `MissingColumn` variant so drift handling is
/// deterministic instead of string-pattern-dependent; everything else is a
/// generic database error.
pub fn classify(err: sqlx::Error) -> BookingError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.code().as_deref() == Some("42703") {
            let column = extract_column_name(db_err.message())
                .unwrap_or_else(|| db_err.message().to_string());
            return BookingError::MissingColumn(column);
        }
    }
    if matches!(err, sqlx::Error::RowNotFound) {
        return BookingError::NotFound("row not found".to_string());
    }
    BookingError::Database(eyre::Report::new(err))
}

// Postgres phrases 42703 as: column "customer_name" of relation ... / does not exist
fn extract_column_name(message: &str) -> Option<String> {
    let start = message.find('"')? + 1;
    let end = message[start..].find('"')? + start;
    Some(message[start..end].to_string())
}
