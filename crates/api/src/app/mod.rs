//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store and engine wiring
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use storefront_auth::{Hs256JwtValidator, IdentityProvider};
use storefront_infra::StorefrontConfig;
use storefront_infra::store::StoreError;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &StorefrontConfig) -> Result<Router, StoreError> {
    let services = Arc::new(services::build_services(config).await?);
    let identity = Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
    Ok(build_router(services, identity))
}

/// Router over already-wired services. Tests use this to pre-load stores.
pub fn build_router(services: Arc<services::AppServices>, identity: Arc<dyn IdentityProvider>) -> Router {
    let auth_state = middleware::AuthState { identity };

    // Protected routes: require a resolved shopper identity.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", protected)
        .layer(ServiceBuilder::new())
}
