//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the operations handlers call
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs and extraction helpers
//! - `errors.rs`: the error taxonomy and its JSON shape

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use eventhub_auth::Hs256Jwt;

use crate::config::Config;
use crate::middleware::{self, IdentityResolver};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &Config) -> anyhow::Result<Router> {
    let stores = services::build_stores(config).await?;
    let jwt = Arc::new(Hs256Jwt::new(&config.jwt_secret, config.token_ttl));
    let services = AppServices::new(stores, jwt, config.password_hash_cost);
    Ok(router(services))
}

/// Assemble routes around already-built services.
pub fn router(services: AppServices) -> Router {
    let resolver = IdentityResolver::new(services.jwt(), services.stores().users.clone());
    let auth_state = middleware::AuthState { resolver };

    // Protected routes: require a resolved `CurrentUser`.
    let protected = routes::protected_router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    let api = routes::public_router().merge(protected);

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(Arc::new(services))),
        )
}
