use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use storefront_core::{CartLineId, DomainError, DomainResult, Entity, ProductId, UserId, ValueObject};

/// Quantity of a product in a cart line. Always at least 1.
///
/// A request for zero or fewer items is a validation error; it never turns
/// into a silent delete.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    pub fn new(value: i64) -> DomainResult<Self> {
        if value < 1 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        let value = u32::try_from(value)
            .map_err(|_| DomainError::validation(format!("quantity {value} is too large")))?;
        NonZeroU32::new(value)
            .map(Self)
            .ok_or_else(|| DomainError::validation("quantity must be at least 1"))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn checked_add(self, other: Quantity) -> Option<Quantity> {
        self.0.checked_add(other.get()).map(Self)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.get()
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl ValueObject for Quantity {}

/// One (user, product, quantity) record.
///
/// At most one line exists per (user, product); the store enforces this and
/// the engine merges quantities instead of inserting a second line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    id: CartLineId,
    user_id: UserId,
    product_id: ProductId,
    quantity: Quantity,
}

impl CartLine {
    /// A brand-new line with a fresh identifier.
    pub fn new(user_id: UserId, product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            id: CartLineId::new(),
            user_id,
            product_id,
            quantity,
        }
    }

    /// Rebuild a line from storage.
    pub fn restore(id: CartLineId, user_id: UserId, product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            id,
            user_id,
            product_id,
            quantity,
        }
    }

    pub fn id_typed(&self) -> CartLineId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Ownership is decided by the resolved caller identity, never by a
    /// client-supplied owner field.
    pub fn ensure_owned_by(&self, user_id: UserId) -> DomainResult<()> {
        if self.is_owned_by(user_id) {
            Ok(())
        } else {
            Err(DomainError::forbidden("not authorized to modify this cart line"))
        }
    }
}

impl Entity for CartLine {
    type Id = CartLineId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_quantities_are_rejected() {
        assert!(matches!(Quantity::new(0), Err(DomainError::Validation(_))));
        assert!(matches!(Quantity::new(-3), Err(DomainError::Validation(_))));
    }

    #[test]
    fn quantities_beyond_u32_are_rejected() {
        assert!(matches!(Quantity::new(i64::from(u32::MAX) + 1), Err(DomainError::Validation(_))));
    }

    #[test]
    fn checked_add_detects_overflow() {
        let max = Quantity::new(i64::from(u32::MAX)).unwrap();
        assert!(max.checked_add(Quantity::new(1).unwrap()).is_none());
        let four = Quantity::new(4).unwrap();
        assert_eq!(four.checked_add(Quantity::new(3).unwrap()).unwrap().get(), 7);
    }

    #[test]
    fn try_from_validates_like_new() {
        assert_eq!(Quantity::try_from(5).unwrap().get(), 5);
        assert!(Quantity::try_from(0).is_err());
    }

    #[test]
    fn ownership_check_uses_caller_identity() {
        let owner = UserId::new();
        let line = CartLine::new(owner, ProductId::new(), Quantity::new(1).unwrap());

        assert!(line.ensure_owned_by(owner).is_ok());
        let err = line.ensure_owned_by(UserId::new()).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn with_quantity_keeps_identity() {
        let line = CartLine::new(UserId::new(), ProductId::new(), Quantity::new(1).unwrap());
        let id = line.id_typed();
        let updated = line.with_quantity(Quantity::new(9).unwrap());
        assert_eq!(updated.id_typed(), id);
        assert_eq!(updated.quantity().get(), 9);
    }
}
