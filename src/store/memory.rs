use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{
    Event, Feedback, NewNotificationLog, NotificationLog, Profile, Registration, Role, Session,
    User, Venue,
};
use crate::store::{NewEventRecord, NewUserRecord, RegistrationInsert, Store, StoreError};

/// In-memory store used by the test suite. One lock around all tables makes
/// every operation, including the capacity-checked registration insert,
/// atomic by construction.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    profiles: Vec<Profile>,
    sessions: Vec<Session>,
    venues: Vec<Venue>,
    events: Vec<Event>,
    coordinators: Vec<(Uuid, Uuid)>,
    registrations: Vec<Registration>,
    feedback: Vec<Feedback>,
    notification_logs: Vec<NotificationLog>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: insert a user row directly, bypassing sign-up. Staff
    /// accounts are provisioned out-of-band in production too.
    pub async fn seed_user(&self, username: &str, email: &str, is_staff: bool) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            is_staff,
            created_at: Utc::now(),
        };
        self.inner.lock().await.users.push(user.clone());
        user
    }
}

#[async_trait]
impl Store for MemStore {
    async fn create_user(&self, record: NewUserRecord) -> Result<User, StoreError> {
        let mut tables = self.inner.lock().await;
        if tables.users.iter().any(|u| u.username == record.username) {
            return Err(StoreError::Duplicate);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: record.username,
            email: record.email,
            password_hash: record.password_hash,
            is_staff: false,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_profile(
        &self,
        user_id: Uuid,
        role: Role,
        parent_email: Option<String>,
    ) -> Result<Profile, StoreError> {
        let mut tables = self.inner.lock().await;
        if tables.profiles.iter().any(|p| p.user_id == user_id) {
            return Err(StoreError::Duplicate);
        }
        let profile = Profile {
            user_id,
            role,
            parent_email,
        };
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn profile_for_user(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn create_session(&self, user_id: Uuid) -> Result<Session, StoreError> {
        let mut tables = self.inner.lock().await;
        let session = Session {
            token: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
        };
        tables.sessions.push(session.clone());
        Ok(session)
    }

    async fn session_user(&self, token: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.inner.lock().await;
        let Some(session) = tables.sessions.iter().find(|s| s.token == token) else {
            return Ok(None);
        };
        Ok(tables.users.iter().find(|u| u.id == session.user_id).cloned())
    }

    async fn delete_session(&self, token: Uuid) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().await;
        tables.sessions.retain(|s| s.token != token);
        Ok(())
    }

    async fn create_venue(
        &self,
        name: String,
        capacity: i32,
        location: String,
    ) -> Result<Venue, StoreError> {
        let mut tables = self.inner.lock().await;
        if tables.venues.iter().any(|v| v.name == name) {
            return Err(StoreError::Duplicate);
        }
        let venue = Venue {
            id: Uuid::new_v4(),
            name,
            capacity,
            location,
        };
        tables.venues.push(venue.clone());
        Ok(venue)
    }

    async fn venue_by_id(&self, id: Uuid) -> Result<Option<Venue>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables.venues.iter().find(|v| v.id == id).cloned())
    }

    async fn list_venues(&self) -> Result<Vec<Venue>, StoreError> {
        let tables = self.inner.lock().await;
        let mut venues = tables.venues.clone();
        venues.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(venues)
    }

    async fn create_event(&self, record: NewEventRecord) -> Result<Event, StoreError> {
        let mut tables = self.inner.lock().await;
        // UNIQUE (venue_id, date_time); Postgres does not compare NULLs, so
        // venue-less events never clash.
        if record.venue_id.is_some()
            && tables
                .events
                .iter()
                .any(|e| e.venue_id == record.venue_id && e.date_time == record.date_time)
        {
            return Err(StoreError::Duplicate);
        }
        let event = Event {
            id: Uuid::new_v4(),
            name: record.name,
            event_type: record.event_type,
            department: record.department,
            date_time: record.date_time,
            duration_hours: record.duration_hours,
            material: record.material,
            venue_id: record.venue_id,
            target_groups: record.target_groups,
            registration_required: record.registration_required,
            resources: record.resources,
            created_by: Some(record.created_by),
            approved: false,
            created_at: Utc::now(),
        };
        for user_id in record.coordinator_ids {
            tables.coordinators.push((event.id, user_id));
        }
        tables.events.push(event.clone());
        Ok(event)
    }

    async fn event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }

    async fn approve_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let mut tables = self.inner.lock().await;
        let Some(event) = tables.events.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        event.approved = true;
        Ok(Some(event.clone()))
    }

    async fn list_approved_events(&self) -> Result<Vec<Event>, StoreError> {
        let tables = self.inner.lock().await;
        let mut events: Vec<Event> = tables.events.iter().filter(|e| e.approved).cloned().collect();
        events.sort_by_key(|e| e.date_time);
        Ok(events)
    }

    async fn list_pending_events(&self) -> Result<Vec<Event>, StoreError> {
        let tables = self.inner.lock().await;
        let mut events: Vec<Event> =
            tables.events.iter().filter(|e| !e.approved).cloned().collect();
        events.sort_by_key(|e| e.date_time);
        Ok(events)
    }

    async fn coordinators_for_event(&self, event_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .coordinators
            .iter()
            .filter(|(eid, _)| *eid == event_id)
            .map(|(_, uid)| *uid)
            .collect())
    }

    async fn insert_registration_checked(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        capacity: Option<i32>,
    ) -> Result<RegistrationInsert, StoreError> {
        let mut tables = self.inner.lock().await;
        if tables
            .registrations
            .iter()
            .any(|r| r.event_id == event_id && r.user_id == user_id)
        {
            return Ok(RegistrationInsert::AlreadyRegistered);
        }
        if let Some(capacity) = capacity {
            let count = tables
                .registrations
                .iter()
                .filter(|r| r.event_id == event_id)
                .count();
            if count >= capacity as usize {
                return Ok(RegistrationInsert::CapacityFull);
            }
        }
        let registration = Registration {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            timestamp: Utc::now(),
        };
        tables.registrations.push(registration.clone());
        Ok(RegistrationInsert::Inserted(registration))
    }

    async fn delete_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut tables = self.inner.lock().await;
        let before = tables.registrations.len();
        tables
            .registrations
            .retain(|r| !(r.event_id == event_id && r.user_id == user_id));
        Ok(tables.registrations.len() < before)
    }

    async fn registrations_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<Registration>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn registration_count(&self, event_id: Uuid) -> Result<i64, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .count() as i64)
    }

    async fn feedback_exists(&self, event_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .feedback
            .iter()
            .any(|f| f.event_id == event_id && f.user_id == user_id))
    }

    async fn create_feedback(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        rating: i32,
        comments: String,
    ) -> Result<Feedback, StoreError> {
        let mut tables = self.inner.lock().await;
        let feedback = Feedback {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            rating,
            comments,
            submitted_at: Utc::now(),
        };
        tables.feedback.push(feedback.clone());
        Ok(feedback)
    }

    async fn feedback_for_event(&self, event_id: Uuid) -> Result<Vec<Feedback>, StoreError> {
        let tables = self.inner.lock().await;
        let mut rows: Vec<Feedback> = tables
            .feedback
            .iter()
            .filter(|f| f.event_id == event_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(rows)
    }

    async fn append_notification_log(
        &self,
        record: NewNotificationLog,
    ) -> Result<NotificationLog, StoreError> {
        let mut tables = self.inner.lock().await;
        let log = NotificationLog {
            id: Uuid::new_v4(),
            to_emails: record.to_emails,
            subject: record.subject,
            body: record.body,
            event_id: record.event_id,
            status: record.status,
            error: record.error,
            created_at: Utc::now(),
        };
        tables.notification_logs.push(log.clone());
        Ok(log)
    }

    async fn list_notification_logs(&self) -> Result<Vec<NotificationLog>, StoreError> {
        let tables = self.inner.lock().await;
        let mut logs = tables.notification_logs.clone();
        logs.reverse();
        Ok(logs)
    }
}
