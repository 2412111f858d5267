use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use storefront_infra::CartError;

pub fn cart_error_to_response(err: CartError) -> axum::response::Response {
    let code = err.code();
    match err {
        CartError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, code, err.to_string()),
        CartError::Forbidden(_) => json_error(StatusCode::FORBIDDEN, code, err.to_string()),
        CartError::InsufficientStock(_) => json_error(StatusCode::CONFLICT, code, err.to_string()),
        CartError::EmptyCart => json_error(StatusCode::BAD_REQUEST, code, err.to_string()),
        CartError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, code, msg),
        CartError::Storage(e) => {
            error!(error = %e, "storage failure while serving request");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                code,
                "the store could not complete the request; it is safe to retry",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
