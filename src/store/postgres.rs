use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    Event, Feedback, NewNotificationLog, NotificationLog, Profile, Registration, Role, Session,
    User, Venue,
};
use crate::store::{NewEventRecord, NewUserRecord, RegistrationInsert, Store, StoreError};

/// Production store over Postgres. Uniqueness and referential rules live in
/// the schema (`migrations/`); this type translates constraint hits into
/// [`StoreError::Duplicate`].
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
    )
}

fn map_insert_err(err: sqlx::Error) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Duplicate
    } else {
        StoreError::Sqlx(err)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, record: NewUserRecord) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_err)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_profile(
        &self,
        user_id: Uuid,
        role: Role,
        parent_email: Option<String>,
    ) -> Result<Profile, StoreError> {
        sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (user_id, role, parent_email) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(role)
        .bind(parent_email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_err)
    }

    async fn profile_for_user(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_session(&self, user_id: Uuid) -> Result<Session, StoreError> {
        Ok(sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (token, user_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn session_user(&self, token: Uuid) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u \
             JOIN sessions s ON s.user_id = u.id WHERE s.token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_session(&self, token: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_venue(
        &self,
        name: String,
        capacity: i32,
        location: String,
    ) -> Result<Venue, StoreError> {
        sqlx::query_as::<_, Venue>(
            "INSERT INTO venues (id, name, capacity, location) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(capacity)
        .bind(location)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_err)
    }

    async fn venue_by_id(&self, id: Uuid) -> Result<Option<Venue>, StoreError> {
        Ok(sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_venues(&self) -> Result<Vec<Venue>, StoreError> {
        Ok(sqlx::query_as::<_, Venue>("SELECT * FROM venues ORDER BY name")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_event(&self, record: NewEventRecord) -> Result<Event, StoreError> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, name, event_type, department, date_time, duration_hours, \
                                 material, venue_id, target_groups, registration_required, \
                                 resources, created_by, approved) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, FALSE) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&record.name)
        .bind(record.event_type)
        .bind(&record.department)
        .bind(record.date_time)
        .bind(record.duration_hours)
        .bind(&record.material)
        .bind(record.venue_id)
        .bind(&record.target_groups)
        .bind(record.registration_required)
        .bind(&record.resources)
        .bind(record.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_insert_err)?;

        for user_id in &record.coordinator_ids {
            sqlx::query(
                "INSERT INTO event_coordinators (event_id, user_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(event.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(event)
    }

    async fn event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn approve_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(sqlx::query_as::<_, Event>(
            "UPDATE events SET approved = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_approved_events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE approved ORDER BY date_time ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_pending_events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE NOT approved ORDER BY date_time ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn coordinators_for_event(&self, event_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        Ok(sqlx::query_scalar(
            "SELECT user_id FROM event_coordinators WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_registration_checked(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        capacity: Option<i32>,
    ) -> Result<RegistrationInsert, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the event serializes concurrent registrations for it,
        // so count-then-insert cannot oversell the venue.
        sqlx::query("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?;

        // An existing row wins over the capacity check: re-registration is
        // idempotent even when the venue is already full.
        let already_registered: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM registrations WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if already_registered {
            return Ok(RegistrationInsert::AlreadyRegistered);
        }

        if let Some(capacity) = capacity {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
                    .bind(event_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if count >= i64::from(capacity) {
                return Ok(RegistrationInsert::CapacityFull);
            }
        }

        let inserted = sqlx::query_as::<_, Registration>(
            "INSERT INTO registrations (id, event_id, user_id) \
             VALUES ($1, $2, $3) ON CONFLICT (event_id, user_id) DO NOTHING \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(match inserted {
            Some(registration) => RegistrationInsert::Inserted(registration),
            None => RegistrationInsert::AlreadyRegistered,
        })
    }

    async fn delete_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM registrations WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn registrations_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<Registration>, StoreError> {
        Ok(sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE event_id = $1 ORDER BY timestamp ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn registration_count(&self, event_id: Uuid) -> Result<i64, StoreError> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn feedback_exists(&self, event_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM feedback WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn create_feedback(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        rating: i32,
        comments: String,
    ) -> Result<Feedback, StoreError> {
        Ok(sqlx::query_as::<_, Feedback>(
            "INSERT INTO feedback (id, event_id, user_id, rating, comments) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(user_id)
        .bind(rating)
        .bind(comments)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn feedback_for_event(&self, event_id: Uuid) -> Result<Vec<Feedback>, StoreError> {
        Ok(sqlx::query_as::<_, Feedback>(
            "SELECT * FROM feedback WHERE event_id = $1 ORDER BY submitted_at DESC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn append_notification_log(
        &self,
        record: NewNotificationLog,
    ) -> Result<NotificationLog, StoreError> {
        Ok(sqlx::query_as::<_, NotificationLog>(
            "INSERT INTO notification_logs (id, to_emails, subject, body, event_id, status, error) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&record.to_emails)
        .bind(&record.subject)
        .bind(&record.body)
        .bind(record.event_id)
        .bind(record.status)
        .bind(&record.error)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_notification_logs(&self) -> Result<Vec<NotificationLog>, StoreError> {
        Ok(sqlx::query_as::<_, NotificationLog>(
            "SELECT * FROM notification_logs ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }
}
