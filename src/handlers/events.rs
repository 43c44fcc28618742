use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::models::NewEvent;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

/// GET /events — approved events, ascending start time. Public.
pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.workflow.list_public_events().await?;
    Ok(success(events, "Events retrieved"))
}

/// GET /events/:event_id — event page data; works for visitors too.
pub async fn event_detail(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let detail = state
        .workflow
        .event_detail(event_id, viewer.as_ref())
        .await?;
    Ok(success(detail, "Event retrieved"))
}

/// POST /events — teacher-only; lands in the pending queue.
pub async fn create_event(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(new_event): Json<NewEvent>,
) -> Result<Response, AppError> {
    let event = state.workflow.create_event(&actor, new_event).await?;
    Ok(created(event, "Event submitted for approval."))
}

/// GET /events/pending — teacher/admin view of the approval queue.
pub async fn pending_events(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> Result<Response, AppError> {
    let events = state.workflow.list_pending_events(&actor).await?;
    Ok(success(events, "Pending events retrieved"))
}

/// POST /events/:event_id/approve — admin-only state change.
pub async fn approve_event(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.workflow.approve_event(&actor, event_id).await?;
    Ok(success(event, "Event approved successfully."))
}
