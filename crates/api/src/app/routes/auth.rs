use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::app::dto::{self, LoginRequest, RegisterRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// POST /auth/register
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let user = services.register(dto::json_body(body)?).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /auth/login
///
/// Unknown email is 404, wrong password 401.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let token = services.login(dto::json_body(body)?, Utc::now()).await?;
    Ok(Json(token))
}
