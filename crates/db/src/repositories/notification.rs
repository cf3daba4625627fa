use sqlx::{Pool, Postgres};
use uuid::Uuid;

use slotbook_core::errors::BookingResult;
use slotbook_core::models::notification::NotificationPayload;

use crate::capabilities::classify;
use crate::models::{DbNotification, DbThreadMessage};

/// Posts a message into the facility's shared owner-customer conversation
/// thread.
pub async fn insert_thread_message(
    pool: &Pool<Postgres>,
    facility_id: Uuid,
    sender_id: Uuid,
    body: &str,
) -> BookingResult<DbThreadMessage> {
    let message = sqlx::query_as::<_, DbThreadMessage>(
        r#"
        INSERT INTO thread_messages (facility_id, sender_id, body)
        VALUES ($1, $2, $3)
        RETURNING id, facility_id, sender_id, body, created_at
        "#,
    )
    .bind(facility_id)
    .bind(sender_id)
    .bind(body)
    .fetch_one(pool)
    .await
    .map_err(classify)?;

    Ok(message)
}

/// Direct in-app notification insert, the primary notification channel.
pub async fn insert_notification(
    pool: &Pool<Postgres>,
    payload: &NotificationPayload,
) -> BookingResult<DbNotification> {
    let notification = sqlx::query_as::<_, DbNotification>(
        r#"
        INSERT INTO notifications (user_id, title, message, link_url, kind)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, title, message, link_url, kind, created_at
        "#,
    )
    .bind(payload.user_id)
    .bind(&payload.title)
    .bind(&payload.message)
    .bind(payload.link_url.as_deref())
    .bind(&payload.kind)
    .fetch_one(pool)
    .await
    .map_err(classify)?;

    Ok(notification)
}

pub async fn list_notifications_for_user(
    pool: &Pool<Postgres>,
    user_id: Uuid,
) -> BookingResult<Vec<DbNotification>> {
    let notifications = sqlx::query_as::<_, DbNotification>(
        r#"
        SELECT id, user_id, title, message, link_url, kind, created_at
        FROM notifications
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(classify)?;

    Ok(notifications)
}
