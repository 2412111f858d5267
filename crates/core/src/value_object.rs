//! Value object trait: equality by value, not identity.
//!
//! Cart snapshots, checkout results and stock writes have **no identity** of
//! their own. They are computed from entities at a point in time and compared
//! by their attribute values.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one from the current entity state.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Subtotal {
///     amount: Decimal,
/// }
///
/// impl ValueObject for Subtotal {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
