use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_cart))
        .route("/add", post(add_to_cart))
        .route("/update/:line_id", put(update_line))
        .route("/remove/:line_id", delete(remove_line))
        .route("/clear", delete(clear_cart))
        .route("/checkout", post(checkout))
}

pub async fn get_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match services.engine.summary(user.user_id()).await {
        Ok(summary) => Json(dto::CartResponse::from(summary)).into_response(),
        Err(e) => errors::cart_error_to_response(e),
    }
}

pub async fn add_to_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::AddToCartRequest>,
) -> axum::response::Response {
    let product_id = match dto::parse_product_id(&body.product_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let quantity = match dto::parse_quantity(body.quantity) {
        Ok(q) => q,
        Err(resp) => return resp,
    };

    match services.engine.add(user.user_id(), product_id, quantity).await {
        Ok(line) => (StatusCode::CREATED, Json(dto::CartItemResponse::from(line))).into_response(),
        Err(e) => errors::cart_error_to_response(e),
    }
}

pub async fn update_line(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(line_id): Path<String>,
    Json(body): Json<dto::UpdateCartLineRequest>,
) -> axum::response::Response {
    let line_id = match dto::parse_line_id(&line_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let quantity = match dto::parse_quantity(body.quantity) {
        Ok(q) => q,
        Err(resp) => return resp,
    };

    match services.engine.update(user.user_id(), line_id, quantity).await {
        Ok(line) => Json(dto::CartItemResponse::from(line)).into_response(),
        Err(e) => errors::cart_error_to_response(e),
    }
}

pub async fn remove_line(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(line_id): Path<String>,
) -> axum::response::Response {
    let line_id = match dto::parse_line_id(&line_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.engine.remove(user.user_id(), line_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::cart_error_to_response(e),
    }
}

pub async fn clear_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match services.engine.clear(user.user_id()).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::cart_error_to_response(e),
    }
}

pub async fn checkout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match services.engine.checkout(user.user_id()).await {
        Ok(result) => Json(dto::CheckoutResponse::from(result)).into_response(),
        Err(e) => errors::cart_error_to_response(e),
    }
}
