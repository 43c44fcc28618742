use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// At most one per (event, user) pair, enforced by the workflow layer with a
/// pre-check rather than a store constraint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comments: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, validator::Validate)]
pub struct NewFeedback {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(min = 1, message = "Comments must not be blank"))]
    pub comments: String,
}
