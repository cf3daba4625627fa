use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/facilities/:id/reservations",
            get(handlers::reservations::list_reservations),
        )
        .route(
            "/api/facilities/:id/reservations",
            post(handlers::reservations::create_reservation),
        )
        .route(
            "/api/reservations/:id/confirm",
            post(handlers::reservations::confirm_reservation),
        )
        .route(
            "/api/reservations/:id/cancel",
            post(handlers::reservations::cancel_reservation),
        )
}
