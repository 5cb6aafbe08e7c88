use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use eventhub_core::{EventDetails, EventId};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

pub async fn list_events(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(services.list_events().await?))
}

pub async fn get_event(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: EventId = dto::parse_id(&id)?;
    Ok(Json(services.get_event(id).await?))
}

/// The caller becomes the owner; any `owner_id` in the body is ignored.
pub async fn create_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    body: Result<Json<EventDetails>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let event = services.create_event(&user, dto::json_body(body)?).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Result<Json<EventDetails>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id: EventId = dto::parse_id(&id)?;
    Ok(Json(services.update_event(&user, id, dto::json_body(body)).await?))
}

pub async fn delete_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: EventId = dto::parse_id(&id)?;
    services.delete_event(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
