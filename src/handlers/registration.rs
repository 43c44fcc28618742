use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::models::AddParticipantRequest;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};
use crate::workflow::{AddParticipantOutcome, CancelOutcome, RegisterOutcome};

/// POST /events/:event_id/register — student-only, idempotent.
pub async fn register(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    match state.workflow.register(&actor, event_id).await? {
        RegisterOutcome::Registered(registration) => Ok(success(
            registration,
            "You have successfully registered.",
        )),
        RegisterOutcome::AlreadyRegistered => Ok(empty_success(
            "You have already registered for this event.",
        )),
    }
}

/// POST /events/:event_id/cancel — student-only; no-op without a
/// registration.
pub async fn cancel_registration(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    match state.workflow.cancel_registration(&actor, event_id).await? {
        CancelOutcome::Cancelled => {
            Ok(empty_success("Your registration has been cancelled."))
        }
        CancelOutcome::NotRegistered => {
            Ok(empty_success("You are not registered for this event."))
        }
    }
}

/// POST /events/:event_id/participants — owning teacher adds a participant
/// by username.
pub async fn add_participant(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<Uuid>,
    Json(request): Json<AddParticipantRequest>,
) -> Result<Response, AppError> {
    let (outcome, user) = state
        .workflow
        .add_participant(&actor, event_id, &request.username)
        .await?;
    match outcome {
        AddParticipantOutcome::Added(registration) => Ok(success(
            registration,
            format!("{} added successfully.", user.username),
        )),
        AddParticipantOutcome::AlreadyRegistered => {
            Ok(empty_success("This user is already registered."))
        }
    }
}

/// DELETE /events/:event_id/participants/:user_id — owning teacher removes
/// a participant.
pub async fn remove_participant(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path((event_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, AppError> {
    state
        .workflow
        .remove_participant(&actor, event_id, user_id)
        .await?;
    Ok(empty_success("Participant removed successfully."))
}
