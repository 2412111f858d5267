//! Compare-and-set stock mutations.

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, ProductId, ValueObject};

use crate::product::Product;

/// A single stock mutation: replace `expected` with `new_stock`.
///
/// Stores apply a batch of writes all-or-nothing and reject the whole batch
/// if any product no longer holds its `expected` value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockWrite {
    pub product_id: ProductId,
    pub expected: u32,
    pub new_stock: u32,
}

impl StockWrite {
    /// Decrement `product`'s current stock by `quantity`.
    ///
    /// Fails instead of clamping: a decrement below zero means a stock check
    /// was skipped upstream.
    pub fn decrement(product: &Product, quantity: u32) -> DomainResult<Self> {
        let new_stock = product.stock().checked_sub(quantity).ok_or_else(|| {
            DomainError::invariant(format!(
                "stock for product {} would become negative ({} - {quantity})",
                product.id_typed(),
                product.stock()
            ))
        })?;

        Ok(Self {
            product_id: product.id_typed(),
            expected: product.stock(),
            new_stock,
        })
    }

    /// The write that undoes this one.
    pub fn inverse(&self) -> Self {
        Self {
            product_id: self.product_id,
            expected: self.new_stock,
            new_stock: self.expected,
        }
    }
}

impl ValueObject for StockWrite {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product_with_stock(stock: u32) -> Product {
        Product::new(ProductId::new(), "Pelota de Futbol", Decimal::new(4500, 0), stock).unwrap()
    }

    #[test]
    fn decrement_records_expected_and_new_stock() {
        let product = product_with_stock(10);
        let write = StockWrite::decrement(&product, 7).unwrap();
        assert_eq!(write.expected, 10);
        assert_eq!(write.new_stock, 3);
        assert_eq!(write.product_id, product.id_typed());
    }

    #[test]
    fn decrement_to_exactly_zero_is_allowed() {
        let product = product_with_stock(4);
        assert_eq!(StockWrite::decrement(&product, 4).unwrap().new_stock, 0);
    }

    #[test]
    fn decrement_below_zero_is_rejected_not_clamped() {
        let product = product_with_stock(1);
        let err = StockWrite::decrement(&product, 2).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn inverse_swaps_expected_and_new() {
        let write = StockWrite {
            product_id: ProductId::new(),
            expected: 10,
            new_stock: 3,
        };
        let inverse = write.inverse();
        assert_eq!(inverse.expected, 3);
        assert_eq!(inverse.new_stock, 10);
        assert_eq!(inverse.inverse(), write);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a decrement exists iff quantity <= stock, and never underflows.
            #[test]
            fn decrement_never_goes_negative(stock in 0u32..10_000, quantity in 0u32..10_000) {
                let product = product_with_stock(stock);
                match StockWrite::decrement(&product, quantity) {
                    Ok(write) => {
                        prop_assert!(quantity <= stock);
                        prop_assert_eq!(write.new_stock + quantity, stock);
                    }
                    Err(_) => prop_assert!(quantity > stock),
                }
            }
        }
    }
}
