use uuid::Uuid;
use validator::Validate;

use crate::models::{Feedback, NewFeedback};
use crate::notify::templates;
use crate::policy::Actor;
use crate::workflow::{WorkflowError, WorkflowService};

impl WorkflowService {
    /// Student-only. One feedback per (event, user) pair: a second
    /// submission is a hard reject, unlike registration's idempotent
    /// duplicate. Submission is not gated on approval or on being
    /// registered. A parent notification goes out best-effort.
    pub async fn submit_feedback(
        &self,
        actor: &Actor,
        event_id: Uuid,
        new_feedback: NewFeedback,
    ) -> Result<Feedback, WorkflowError> {
        if !actor.is_student() {
            return Err(WorkflowError::Forbidden(
                "Only students can submit feedback.".into(),
            ));
        }
        let event = self
            .store
            .event_by_id(event_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Event not found.".into()))?;

        if self.store.feedback_exists(event.id, actor.user.id).await? {
            return Err(WorkflowError::DuplicateFeedback);
        }

        new_feedback
            .validate()
            .map_err(|e| WorkflowError::Validation(e.to_string()))?;

        let feedback = self
            .store
            .create_feedback(
                event.id,
                actor.user.id,
                new_feedback.rating,
                new_feedback.comments,
            )
            .await?;

        if let Some(parent_email) = self.parent_email(actor) {
            self.dispatcher
                .dispatch(
                    &format!("Your child submitted feedback for {}", event.name),
                    templates::parent_feedback_notification(&actor.user, &event, &feedback),
                    vec![parent_email],
                    Some(event.id),
                )
                .await;
        }

        Ok(feedback)
    }
}
