use uuid::Uuid;

use crate::models::{Event, Registration, User};
use crate::notify::templates;
use crate::policy::Actor;
use crate::store::RegistrationInsert;
use crate::workflow::{WorkflowError, WorkflowService};

#[derive(Debug)]
pub enum RegisterOutcome {
    Registered(Registration),
    /// Benign duplicate; the existing row is untouched.
    AlreadyRegistered,
}

#[derive(Debug)]
pub enum CancelOutcome {
    Cancelled,
    /// Nothing to cancel; informational, not an error.
    NotRegistered,
}

#[derive(Debug)]
pub enum AddParticipantOutcome {
    Added(Registration),
    AlreadyRegistered,
}

impl WorkflowService {
    /// Student-only. The event must be approved; unapproved events are not
    /// visible on this path. The capacity check and the insert happen in a
    /// single store call so concurrent requests cannot oversell the venue.
    /// On a fresh registration, student and parent notifications each go
    /// out best-effort with independent outcomes.
    pub async fn register(
        &self,
        actor: &Actor,
        event_id: Uuid,
    ) -> Result<RegisterOutcome, WorkflowError> {
        if !actor.is_student() {
            return Err(WorkflowError::Forbidden(
                "Only students can register for events.".into(),
            ));
        }
        let event = self.approved_event(event_id).await?;

        let capacity = self.venue_capacity(&event).await?;
        let inserted = self
            .store
            .insert_registration_checked(event.id, actor.user.id, capacity)
            .await?;

        let registration = match inserted {
            RegistrationInsert::Inserted(registration) => registration,
            RegistrationInsert::AlreadyRegistered => {
                return Ok(RegisterOutcome::AlreadyRegistered)
            }
            RegistrationInsert::CapacityFull => return Err(WorkflowError::CapacityFull),
        };

        self.notify_registration(actor, &event).await;
        Ok(RegisterOutcome::Registered(registration))
    }

    /// Student-only. Cancelling without a registration is an informational
    /// no-op; a real cancellation is followed by the symmetric notification
    /// pair.
    pub async fn cancel_registration(
        &self,
        actor: &Actor,
        event_id: Uuid,
    ) -> Result<CancelOutcome, WorkflowError> {
        if !actor.is_student() {
            return Err(WorkflowError::Forbidden(
                "Only students can cancel registrations.".into(),
            ));
        }
        let event = self.approved_event(event_id).await?;

        if !self.store.delete_registration(event.id, actor.user.id).await? {
            return Ok(CancelOutcome::NotRegistered);
        }

        self.notify_cancellation(actor, &event).await;
        Ok(CancelOutcome::Cancelled)
    }

    /// Teacher-only, scoped to events the teacher created. Adds a
    /// registration by username; no notification is dispatched on this
    /// path.
    pub async fn add_participant(
        &self,
        actor: &Actor,
        event_id: Uuid,
        username: &str,
    ) -> Result<(AddParticipantOutcome, User), WorkflowError> {
        let event = self.owned_event(actor, event_id).await?;

        if username.trim().is_empty() {
            return Err(WorkflowError::Validation("Please enter a username.".into()));
        }
        let user = self
            .store
            .user_by_username(username.trim())
            .await?
            .ok_or_else(|| WorkflowError::NotFound("User not found.".into()))?;

        let outcome = match self
            .store
            .insert_registration_checked(event.id, user.id, None)
            .await?
        {
            RegistrationInsert::Inserted(registration) => {
                AddParticipantOutcome::Added(registration)
            }
            _ => AddParticipantOutcome::AlreadyRegistered,
        };
        Ok((outcome, user))
    }

    /// Teacher-only, scoped to owned events. Removing an absent participant
    /// is a silent no-op.
    pub async fn remove_participant(
        &self,
        actor: &Actor,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), WorkflowError> {
        let event = self.owned_event(actor, event_id).await?;
        self.store.delete_registration(event.id, user_id).await?;
        Ok(())
    }

    pub(crate) async fn approved_event(&self, event_id: Uuid) -> Result<Event, WorkflowError> {
        match self.store.event_by_id(event_id).await? {
            Some(event) if event.approved => Ok(event),
            _ => Err(WorkflowError::NotFound("Event not found.".into())),
        }
    }

    async fn owned_event(&self, actor: &Actor, event_id: Uuid) -> Result<Event, WorkflowError> {
        if !actor.is_teacher() {
            return Err(WorkflowError::Forbidden(
                "Only teachers can manage participants.".into(),
            ));
        }
        let event = self
            .store
            .event_by_id(event_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Event not found.".into()))?;
        if !actor.owns_event(&event) {
            return Err(WorkflowError::NotFound("Event not found.".into()));
        }
        Ok(event)
    }

    async fn venue_capacity(&self, event: &Event) -> Result<Option<i32>, WorkflowError> {
        let Some(venue_id) = event.venue_id else {
            return Ok(None);
        };
        Ok(self.store.venue_by_id(venue_id).await?.map(|v| v.capacity))
    }

    async fn notify_registration(&self, actor: &Actor, event: &Event) {
        if !actor.user.email.is_empty() {
            self.dispatcher
                .dispatch(
                    &format!("Registration confirmed: {}", event.name),
                    templates::registration_confirmation(&actor.user, event),
                    vec![actor.user.email.clone()],
                    Some(event.id),
                )
                .await;
        }
        if let Some(parent_email) = self.parent_email(actor) {
            self.dispatcher
                .dispatch(
                    &format!("Your child registered: {}", event.name),
                    templates::parent_registration_notification(&actor.user, event),
                    vec![parent_email],
                    Some(event.id),
                )
                .await;
        }
    }

    async fn notify_cancellation(&self, actor: &Actor, event: &Event) {
        if !actor.user.email.is_empty() {
            self.dispatcher
                .dispatch(
                    &format!("Registration cancelled: {}", event.name),
                    templates::registration_cancelled(&actor.user, event),
                    vec![actor.user.email.clone()],
                    Some(event.id),
                )
                .await;
        }
        if let Some(parent_email) = self.parent_email(actor) {
            self.dispatcher
                .dispatch(
                    &format!("Your child cancelled registration: {}", event.name),
                    templates::parent_registration_cancelled(&actor.user, event),
                    vec![parent_email],
                    Some(event.id),
                )
                .await;
        }
    }

    pub(crate) fn parent_email(&self, actor: &Actor) -> Option<String> {
        actor
            .profile
            .as_ref()
            .and_then(|p| p.parent_email.clone())
            .filter(|email| !email.trim().is_empty())
    }
}
