use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::models::NewFeedback;
use crate::utils::error::AppError;
use crate::utils::response::created;

/// POST /events/:event_id/feedback — student-only, one per event.
pub async fn submit_feedback(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<Uuid>,
    Json(new_feedback): Json<NewFeedback>,
) -> Result<Response, AppError> {
    let feedback = state
        .workflow
        .submit_feedback(&actor, event_id, new_feedback)
        .await?;
    Ok(created(feedback, "Thanks! Your feedback has been submitted."))
}
