use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use eventhub_auth::JwtValidator;
use eventhub_core::User;
use eventhub_infra::{StoreError, UserStore};

use crate::app::errors::ApiError;
use crate::context::CurrentUser;

/// Turns an `Authorization` header into a loaded [`User`].
#[derive(Clone)]
pub struct IdentityResolver {
    jwt: Arc<dyn JwtValidator>,
    users: Arc<dyn UserStore>,
}

impl IdentityResolver {
    pub fn new(jwt: Arc<dyn JwtValidator>, users: Arc<dyn UserStore>) -> Self {
        Self { jwt, users }
    }

    /// Any credential problem is `Unauthenticated`; store failures other
    /// than a missing user propagate as-is.
    pub async fn resolve(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Result<User, ApiError> {
        let token = extract_bearer(headers)?;
        let claims = self.jwt.validate(token, now)?;
        let user_id = claims.user_id()?;

        match self.users.get_by_id(user_id).await {
            Ok(user) => Ok(user),
            Err(StoreError::NotFound) => {
                tracing::warn!(user_id = %user_id, "token subject does not exist");
                Err(ApiError::unauthenticated("unknown user"))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub resolver: IdentityResolver,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let user = match state.resolver.resolve(req.headers(), Utc::now()).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(CurrentUser::new(user));

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthenticated("missing authorization header"))?;

    let header = header
        .to_str()
        .map_err(|_| ApiError::unauthenticated("authorization header is not valid text"))?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthenticated("expected a bearer token"))?;

    let token = header.trim();
    if token.is_empty() {
        return Err(ApiError::unauthenticated("empty bearer token"));
    }

    Ok(token)
}
