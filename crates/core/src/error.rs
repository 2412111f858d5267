//! Domain error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, ownership, stock). Storage failures belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced product or cart line does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The caller does not own the referenced resource.
    ///
    /// The message is generic on purpose: it must not reveal whether the
    /// resource exists for somebody else.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Requested, merged or checked-out quantity exceeds available stock.
    #[error("{0}")]
    InsufficientStock(StockShortfall),

    /// Checkout attempted on a cart without lines.
    #[error("cart is empty")]
    EmptyCart,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}

/// Where a stock check failed.
///
/// Callers need to tell "can't add this many" apart from "can't add this many
/// *more*", and both apart from a cart that went stale before checkout.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShortfallContext {
    /// The quantity in the request alone exceeds stock.
    Requested,
    /// The request is fine on its own, but merged with the existing line it is not.
    Merged,
    /// Stock dropped below the cart quantity before checkout.
    Checkout,
}

/// Details of a failed stock check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortfall {
    pub product_id: ProductId,
    pub product_name: String,
    pub requested: u32,
    pub available: u32,
    pub context: ShortfallContext,
}

impl core::fmt::Display for StockShortfall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.context {
            ShortfallContext::Requested => write!(
                f,
                "insufficient stock for '{}': requested {}, available {}",
                self.product_name, self.requested, self.available
            ),
            ShortfallContext::Merged => write!(
                f,
                "insufficient stock for '{}' to reach a total of {} in the cart (available {})",
                self.product_name, self.requested, self.available
            ),
            ShortfallContext::Checkout => write!(
                f,
                "insufficient stock for '{}' at checkout: cart holds {}, available {}",
                self.product_name, self.requested, self.available
            ),
        }
    }
}
