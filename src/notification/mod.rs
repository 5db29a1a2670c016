// region:    --- Imports
use crate::database::DatabaseManager;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tracing::info;
// endregion: --- Imports

// region:    --- Notification Model

/// One outbox message addressed to a seller. The payload never changes
/// after insert; only `is_read` flips, and only via the recipient path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationOutboxEntry {
    pub id: i64,
    pub user_id: i64,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i64,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
}

// endregion: --- Notification Model

// region:    --- Notification Outbox Trait

#[async_trait]
pub trait NotificationOutbox: Send + Sync {
    async fn append(
        &self,
        notification: NewNotification,
    ) -> Result<NotificationOutboxEntry, sqlx::Error>;
}

// endregion: --- Notification Outbox Trait

// region:    --- Postgres Notification Outbox

const APPEND_NOTIFICATION: &str = r#"
    INSERT INTO notifications (user_id, notification_type, title, message, data)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING *
"#;

const GET_USER_NOTIFICATIONS: &str = r#"
    SELECT * FROM notifications
    WHERE user_id = $1
    ORDER BY created_at DESC
"#;

const MARK_NOTIFICATION_READ: &str =
    "UPDATE notifications SET is_read = TRUE WHERE id = $1 RETURNING id";

pub struct PostgresNotificationOutbox {
    pool: Arc<PgPool>,
}

impl PostgresNotificationOutbox {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationOutbox for PostgresNotificationOutbox {
    async fn append(
        &self,
        notification: NewNotification,
    ) -> Result<NotificationOutboxEntry, sqlx::Error> {
        sqlx::query_as::<_, NotificationOutboxEntry>(APPEND_NOTIFICATION)
            .bind(notification.user_id)
            .bind(&notification.notification_type)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(&notification.data)
            .fetch_one(&*self.pool)
            .await
    }
}

// endregion: --- Postgres Notification Outbox

// region:    --- Recipient Read Path

/// List a user's notifications, newest first.
pub async fn get_user_notifications(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> Result<Vec<NotificationOutboxEntry>, sqlx::Error> {
    info!("{:<12} --> notifications for user {}", "Outbox", user_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, NotificationOutboxEntry>(GET_USER_NOTIFICATIONS)
                    .bind(user_id)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// Flip `is_read`. Returns false when the notification does not exist.
pub async fn mark_notification_read(
    db_manager: &DatabaseManager,
    notification_id: i64,
) -> Result<bool, sqlx::Error> {
    info!(
        "{:<12} --> mark notification {} read",
        "Outbox", notification_id
    );
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let updated = sqlx::query_scalar::<_, i64>(MARK_NOTIFICATION_READ)
                    .bind(notification_id)
                    .fetch_optional(&mut **tx)
                    .await?;
                Ok::<_, sqlx::Error>(updated.is_some())
            })
        })
        .await
}

// endregion: --- Recipient Read Path
