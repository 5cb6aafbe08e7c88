use axum::{
    Router,
    routing::{get, post},
};

pub mod attendees;
pub mod auth;
pub mod events;
pub mod system;

/// Endpoints that need no credential.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/events", get(events::list_events))
        .route("/events/:id", get(events::get_event))
        .route("/events/:id/attendees", get(attendees::list_event_attendees))
        .route("/attendees/:id/events", get(attendees::list_attendee_events))
}

/// Endpoints that act on behalf of the [`crate::context::CurrentUser`].
pub fn protected_router() -> Router {
    Router::new()
        .route("/events", post(events::create_event))
        .route(
            "/events/:id",
            axum::routing::put(events::update_event).delete(events::delete_event),
        )
        .route(
            "/events/:id/attendees/:user_id",
            post(attendees::add_attendee).delete(attendees::remove_attendee),
        )
}
