use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/facilities/:id/settings",
            get(handlers::settings::get_settings),
        )
        .route(
            "/api/facilities/:id/settings",
            put(handlers::settings::update_settings),
        )
}
