use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use eventhub_core::{EventId, UserId};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

fn parse_pair(event_id: &str, user_id: &str) -> Result<(EventId, UserId), ApiError> {
    Ok((dto::parse_id(event_id)?, dto::parse_id(user_id)?))
}

/// POST /events/:id/attendees/:user_id (owner only)
pub async fn add_attendee(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path((event_id, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let (event_id, user_id) = parse_pair(&event_id, &user_id)?;
    let attendee = services.add_attendee(&user, event_id, user_id).await?;
    Ok((StatusCode::CREATED, Json(attendee)))
}

/// DELETE /events/:id/attendees/:user_id (owner only)
pub async fn remove_attendee(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path((event_id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let (event_id, user_id) = parse_pair(&event_id, &user_id)?;
    services.remove_attendee(&user, event_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_event_attendees(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: EventId = dto::parse_id(&id)?;
    Ok(Json(services.attendees_for_event(id).await?))
}

pub async fn list_attendee_events(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = dto::parse_id(&id)?;
    Ok(Json(services.events_for_attendee(id).await?))
}
