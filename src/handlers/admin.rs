use axum::extract::State;
use axum::response::Response;
use axum::Json;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::models::NewVenue;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

/// GET /venues — public; teachers pick a venue when creating events.
pub async fn list_venues(State(state): State<AppState>) -> Result<Response, AppError> {
    let venues = state.workflow.list_venues().await?;
    Ok(success(venues, "Venues retrieved"))
}

/// POST /venues — admin-only.
pub async fn create_venue(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(new_venue): Json<NewVenue>,
) -> Result<Response, AppError> {
    new_venue
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    let venue = state
        .workflow
        .create_venue(&actor, new_venue.name, new_venue.capacity, new_venue.location)
        .await?;
    Ok(created(venue, "Venue created."))
}

/// GET /admin/notifications — admin view of the audit trail, newest first.
pub async fn notification_logs(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> Result<Response, AppError> {
    let logs = state.workflow.list_notification_logs(&actor).await?;
    Ok(success(logs, "Notification logs retrieved"))
}
