mod accounts;
mod admin;
mod events;
mod feedback;
mod registration;

pub use accounts::*;
pub use admin::*;
pub use events::*;
pub use feedback::*;
pub use registration::*;

use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::utils::response::success;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "campus-events-api",
    };

    success(payload, "Health check successful").into_response()
}
