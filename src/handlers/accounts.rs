use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::SessionToken;
use crate::models::{LoginRequest, SignUpRequest, User};
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Serialize)]
struct SessionPayload {
    user: User,
    token: Uuid,
}

/// POST /auth/signup — creates user + profile and signs the caller in.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<Response, AppError> {
    let (user, session) = state.workflow.sign_up(request).await?;
    Ok(created(
        SessionPayload {
            user,
            token: session.token,
        },
        "Account created successfully.",
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let (user, session) = state
        .workflow
        .login(&request.username, &request.password)
        .await?;
    Ok(success(
        SessionPayload {
            user,
            token: session.token,
        },
        "Logged in.",
    ))
}

/// POST /auth/logout — drops the presented session.
pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<Response, AppError> {
    state.workflow.logout(token).await?;
    Ok(empty_success("Logged out."))
}
