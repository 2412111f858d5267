use axum::{routing::get, Router};

pub mod cart;
pub mod system;

/// Router for all authenticated endpoints (mounted under `/api`).
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/cart", cart::router())
}
