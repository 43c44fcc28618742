use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Event, Feedback, NewEvent, Registration};
use crate::policy::Actor;
use crate::store::{NewEventRecord, StoreError};
use crate::workflow::{WorkflowError, WorkflowService};

/// Everything the event page shows: the event itself, its coordinators,
/// who is registered, feedback newest-first, and whether the viewer is
/// among the registrants.
#[derive(Debug, Serialize)]
pub struct EventDetail {
    pub event: Event,
    pub end_time: DateTime<Utc>,
    pub coordinator_ids: Vec<Uuid>,
    pub registrations: Vec<Registration>,
    pub feedback: Vec<Feedback>,
    pub viewer_registered: bool,
}

impl WorkflowService {
    /// Teacher-only. The event is persisted unapproved with the actor as
    /// creator; no notification goes out on creation.
    pub async fn create_event(
        &self,
        actor: &Actor,
        new_event: NewEvent,
    ) -> Result<Event, WorkflowError> {
        if !actor.is_teacher() {
            return Err(WorkflowError::Forbidden(
                "Only teachers can create events.".into(),
            ));
        }
        new_event
            .validate()
            .map_err(|e| WorkflowError::Validation(e.to_string()))?;
        if !new_event.duration_in_range() {
            return Err(WorkflowError::Validation(
                "Duration must be between 0.2 and 8 hours.".into(),
            ));
        }
        if let Some(venue_id) = new_event.venue_id {
            if self.store.venue_by_id(venue_id).await?.is_none() {
                return Err(WorkflowError::Validation("Unknown venue.".into()));
            }
        }

        let record = NewEventRecord {
            name: new_event.name,
            event_type: new_event.event_type,
            department: new_event.department,
            date_time: new_event.date_time,
            duration_hours: new_event.duration_hours,
            material: new_event.material,
            venue_id: new_event.venue_id,
            coordinator_ids: new_event.coordinator_ids,
            target_groups: new_event.target_groups,
            registration_required: new_event.registration_required,
            resources: new_event.resources,
            created_by: actor.user.id,
        };

        match self.store.create_event(record).await {
            Ok(event) => Ok(event),
            Err(StoreError::Duplicate) => Err(WorkflowError::Validation(
                "The venue is already booked at that time.".into(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Admin-only. Idempotent: re-approving an approved event is a no-op
    /// with the same observable result. No notification is dispatched.
    pub async fn approve_event(&self, actor: &Actor, event_id: Uuid) -> Result<Event, WorkflowError> {
        if !actor.is_admin() {
            return Err(WorkflowError::Forbidden(
                "Only administrators can approve events.".into(),
            ));
        }
        self.store
            .approve_event(event_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Event not found.".into()))
    }

    /// The only listing visible to unauthenticated users: approved events,
    /// ascending start time.
    pub async fn list_public_events(&self) -> Result<Vec<Event>, WorkflowError> {
        Ok(self.store.list_approved_events().await?)
    }

    /// Unapproved events. Gated to teachers and administrators; the queue
    /// is not public.
    pub async fn list_pending_events(&self, actor: &Actor) -> Result<Vec<Event>, WorkflowError> {
        if !actor.is_teacher() && !actor.is_admin() {
            return Err(WorkflowError::Forbidden(
                "Only teachers and administrators can view pending events.".into(),
            ));
        }
        Ok(self.store.list_pending_events().await?)
    }

    pub async fn event_detail(
        &self,
        event_id: Uuid,
        viewer: Option<&Actor>,
    ) -> Result<EventDetail, WorkflowError> {
        let event = self
            .store
            .event_by_id(event_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Event not found.".into()))?;

        let coordinator_ids = self.store.coordinators_for_event(event_id).await?;
        let registrations = self.store.registrations_for_event(event_id).await?;
        let feedback = self.store.feedback_for_event(event_id).await?;
        let viewer_registered = match viewer {
            Some(actor) => registrations.iter().any(|r| r.user_id == actor.user.id),
            None => false,
        };

        Ok(EventDetail {
            end_time: event.end_time(),
            event,
            coordinator_ids,
            registrations,
            feedback,
            viewer_registered,
        })
    }

    /// Admin-only venue creation; venues otherwise come from ops tooling.
    pub async fn create_venue(
        &self,
        actor: &Actor,
        name: String,
        capacity: i32,
        location: String,
    ) -> Result<crate::models::Venue, WorkflowError> {
        if !actor.is_admin() {
            return Err(WorkflowError::Forbidden(
                "Only administrators can manage venues.".into(),
            ));
        }
        match self.store.create_venue(name, capacity, location).await {
            Ok(venue) => Ok(venue),
            Err(StoreError::Duplicate) => Err(WorkflowError::Validation(
                "A venue with that name already exists.".into(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn list_venues(&self) -> Result<Vec<crate::models::Venue>, WorkflowError> {
        Ok(self.store.list_venues().await?)
    }

    /// Admin-only view over the append-only notification audit trail.
    pub async fn list_notification_logs(
        &self,
        actor: &Actor,
    ) -> Result<Vec<crate::models::NotificationLog>, WorkflowError> {
        if !actor.is_admin() {
            return Err(WorkflowError::Forbidden(
                "Only administrators can view the notification log.".into(),
            ));
        }
        Ok(self.store.list_notification_logs().await?)
    }
}
