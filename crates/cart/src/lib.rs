//! Shopping cart domain module.
//!
//! This crate contains the cart's business rules (quantity bounds, merge on
//! add, stock ceilings, the checkout plan), implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage, no locking).

pub mod checkout;
pub mod line;
pub mod rules;
pub mod snapshot;

pub use checkout::{CheckoutPlan, CHECKOUT_SUCCESS_MESSAGE, plan_checkout};
pub use line::{CartLine, Quantity};
pub use rules::{ensure_within_stock, merged_quantity};
pub use snapshot::{CartSnapshot, CartSummary, CheckoutResult};
