use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "notification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Sent,
    Failed,
}

/// Append-only audit record: exactly one row per dispatch attempt, success
/// or failure. Never updated or deleted; survives deletion of its event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationLog {
    pub id: Uuid,
    /// Comma-joined recipient list.
    pub to_emails: String,
    pub subject: String,
    /// Rendered body on success; the error text on failure.
    pub body: String,
    pub event_id: Option<Uuid>,
    pub status: NotificationStatus,
    pub error: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotificationLog {
    pub to_emails: String,
    pub subject: String,
    pub body: String,
    pub event_id: Option<Uuid>,
    pub status: NotificationStatus,
    pub error: String,
}
