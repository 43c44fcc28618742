use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    add_participant, approve_event, cancel_registration, create_event, create_venue, event_detail,
    health_check, list_events, list_venues, login, logout, notification_logs, pending_events,
    register, remove_participant, sign_up, submit_feedback,
};

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(sign_up))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/events", get(list_events).post(create_event))
        .route("/events/pending", get(pending_events))
        .route("/events/:event_id", get(event_detail))
        // Approval changes state, so it only answers to POST.
        .route("/events/:event_id/approve", post(approve_event))
        .route("/events/:event_id/register", post(register))
        .route("/events/:event_id/cancel", post(cancel_registration))
        .route("/events/:event_id/feedback", post(submit_feedback))
        .route("/events/:event_id/participants", post(add_participant))
        .route(
            "/events/:event_id/participants/:user_id",
            delete(remove_participant),
        )
        .route("/venues", get(list_venues).post(create_venue))
        .route("/admin/notifications", get(notification_logs))
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
