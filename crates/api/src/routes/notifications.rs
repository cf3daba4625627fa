use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route(
        "/api/users/:id/notifications",
        get(handlers::notifications::list_user_notifications),
    )
}
