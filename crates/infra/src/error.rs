use thiserror::Error;

use storefront_core::{DomainError, StockShortfall};

use crate::store::StoreError;

/// Error returned by every cart engine operation.
///
/// Flattens domain failures and store failures into the taxonomy callers act
/// on. Nothing is partially applied when one of these comes back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    InsufficientStock(StockShortfall),

    #[error("cart is empty")]
    EmptyCart,

    #[error("validation failed: {0}")]
    Validation(String),

    /// The backing store could not complete a read/write. Safe to retry the
    /// whole operation.
    #[error("storage failure: {0}")]
    Storage(StoreError),
}

impl CartError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            CartError::NotFound { .. } => "not_found",
            CartError::Forbidden(_) => "forbidden",
            CartError::InsufficientStock(_) => "insufficient_stock",
            CartError::EmptyCart => "empty_cart",
            CartError::Validation(_) => "validation_error",
            CartError::Storage(_) => "storage_error",
        }
    }
}

impl From<DomainError> for CartError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound { entity, id } => CartError::NotFound { entity, id },
            DomainError::Forbidden(msg) => CartError::Forbidden(msg),
            DomainError::InsufficientStock(shortfall) => CartError::InsufficientStock(shortfall),
            DomainError::EmptyCart => CartError::EmptyCart,
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => CartError::Validation(msg),
            // Arithmetic overflow on totals/quantities; the request cannot be honoured as sent.
            DomainError::InvariantViolation(msg) => CartError::Validation(msg),
        }
    }
}

impl From<StoreError> for CartError {
    fn from(value: StoreError) -> Self {
        CartError::Storage(value)
    }
}
