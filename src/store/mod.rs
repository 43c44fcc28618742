mod memory;
mod postgres;

pub use memory::MemStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Event, Feedback, NewNotificationLog, NotificationLog, Profile, Registration, Role, Session,
    User, Venue,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was hit. Which one is clear from the call
    /// site; callers branch on it for idempotent vs hard conflicts.
    #[error("duplicate record")]
    Duplicate,

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Outcome of the atomic capacity-checked registration insert.
#[derive(Debug)]
pub enum RegistrationInsert {
    Inserted(Registration),
    /// The (event, user) pair already exists; no new row was written.
    AlreadyRegistered,
    /// The event's venue is at capacity; no row was written.
    CapacityFull,
}

/// Field values for a fresh user row; hashing happens before this point.
#[derive(Debug)]
pub struct NewUserRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug)]
pub struct NewEventRecord {
    pub name: String,
    pub event_type: crate::models::EventType,
    pub department: String,
    pub date_time: chrono::DateTime<chrono::Utc>,
    pub duration_hours: rust_decimal::Decimal,
    pub material: Option<String>,
    pub venue_id: Option<Uuid>,
    pub coordinator_ids: Vec<Uuid>,
    pub target_groups: String,
    pub registration_required: bool,
    pub resources: String,
    pub created_by: Uuid,
}

/// Persistence seam. `PgStore` is the production implementation; `MemStore`
/// backs the test suite. All timestamps are assigned server-side by the
/// implementation.
#[async_trait]
pub trait Store: Send + Sync {
    // Users, profiles, sessions.
    async fn create_user(&self, record: NewUserRecord) -> Result<User, StoreError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn create_profile(
        &self,
        user_id: Uuid,
        role: Role,
        parent_email: Option<String>,
    ) -> Result<Profile, StoreError>;
    async fn profile_for_user(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;
    async fn create_session(&self, user_id: Uuid) -> Result<Session, StoreError>;
    async fn session_user(&self, token: Uuid) -> Result<Option<User>, StoreError>;
    async fn delete_session(&self, token: Uuid) -> Result<(), StoreError>;

    // Venues.
    async fn create_venue(
        &self,
        name: String,
        capacity: i32,
        location: String,
    ) -> Result<Venue, StoreError>;
    async fn venue_by_id(&self, id: Uuid) -> Result<Option<Venue>, StoreError>;
    async fn list_venues(&self) -> Result<Vec<Venue>, StoreError>;

    // Events.
    async fn create_event(&self, record: NewEventRecord) -> Result<Event, StoreError>;
    async fn event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError>;
    /// Sets approved = true. Returns the updated row, or `None` if the
    /// event does not exist. Already-approved events are left untouched.
    async fn approve_event(&self, id: Uuid) -> Result<Option<Event>, StoreError>;
    /// Approved events, ascending start time.
    async fn list_approved_events(&self) -> Result<Vec<Event>, StoreError>;
    async fn list_pending_events(&self) -> Result<Vec<Event>, StoreError>;
    async fn coordinators_for_event(&self, event_id: Uuid) -> Result<Vec<Uuid>, StoreError>;

    // Registrations. The capacity check and the insert happen inside one
    // serialization scope so concurrent registrations cannot oversell.
    async fn insert_registration_checked(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        capacity: Option<i32>,
    ) -> Result<RegistrationInsert, StoreError>;
    /// Returns whether a row existed and was deleted.
    async fn delete_registration(&self, event_id: Uuid, user_id: Uuid)
        -> Result<bool, StoreError>;
    async fn registrations_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<Registration>, StoreError>;
    async fn registration_count(&self, event_id: Uuid) -> Result<i64, StoreError>;

    // Feedback. Uniqueness per (event, user) is the workflow layer's
    // pre-check; the store accepts whatever it is given.
    async fn feedback_exists(&self, event_id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;
    async fn create_feedback(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        rating: i32,
        comments: String,
    ) -> Result<Feedback, StoreError>;
    /// Newest first.
    async fn feedback_for_event(&self, event_id: Uuid) -> Result<Vec<Feedback>, StoreError>;

    // Notification audit trail. Append-only.
    async fn append_notification_log(
        &self,
        record: NewNotificationLog,
    ) -> Result<NotificationLog, StoreError>;
    /// Newest first.
    async fn list_notification_logs(&self) -> Result<Vec<NotificationLog>, StoreError>;
}
