use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use slotbook_db::models::DbNotification;

use crate::middleware::error_handling::AppError;
use crate::ApiState;

/// In-app notification feed for one user, newest first. The read side of
/// the confirmation fanout.
#[axum::debug_handler]
pub async fn list_user_notifications(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<DbNotification>>, AppError> {
    let notifications = slotbook_db::repositories::notification::list_notifications_for_user(
        &state.db_pool,
        user_id,
    )
    .await?;

    Ok(Json(notifications))
}
