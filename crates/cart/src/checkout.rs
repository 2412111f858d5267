//! Checkout planning: the pure half of the checkout protocol.
//!
//! ```text
//! lines + current products
//!   ↓
//! 1. Pre-flight: every line checked against current stock (no writes yet)
//!   ↓
//! 2. Plan: one StockWrite per line + exact decimal total
//! ```
//!
//! Applying the plan (atomically) and clearing the cart is the caller's job.

use std::collections::HashSet;

use rust_decimal::Decimal;

use storefront_catalog::{Product, StockWrite};
use storefront_core::{DomainError, DomainResult, ShortfallContext};

use crate::line::CartLine;
use crate::rules::ensure_within_stock;
use crate::snapshot::CheckoutResult;

pub const CHECKOUT_SUCCESS_MESSAGE: &str = "purchase completed successfully";

/// Everything a successful checkout will do, computed before anything is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    pub writes: Vec<StockWrite>,
    pub total: Decimal,
    pub line_count: usize,
}

impl CheckoutPlan {
    /// Writes that restore every product to its pre-checkout stock.
    pub fn compensation(&self) -> Vec<StockWrite> {
        self.writes.iter().map(StockWrite::inverse).collect()
    }

    pub fn result(&self) -> CheckoutResult {
        CheckoutResult {
            message: CHECKOUT_SUCCESS_MESSAGE.to_string(),
            total: self.total,
            items_count: self.line_count,
        }
    }
}

/// Validate all `items` against current stock, then plan the decrements.
///
/// Uses each product's price as passed in, i.e. the price at checkout time.
/// Fails without producing any write if any line is short.
pub fn plan_checkout(items: &[(CartLine, Product)]) -> DomainResult<CheckoutPlan> {
    if items.is_empty() {
        return Err(DomainError::EmptyCart);
    }

    let mut seen = HashSet::with_capacity(items.len());
    for (line, product) in items {
        if line.product_id() != product.id_typed() {
            return Err(DomainError::invariant(format!(
                "cart line {} joined with wrong product {}",
                line.id_typed(),
                product.id_typed()
            )));
        }
        if !seen.insert(line.product_id()) {
            return Err(DomainError::invariant(format!(
                "cart holds more than one line for product {}",
                line.product_id()
            )));
        }
        ensure_within_stock(product, line.quantity().get(), ShortfallContext::Checkout)?;
    }

    let mut writes = Vec::with_capacity(items.len());
    let mut total = Decimal::ZERO;
    for (line, product) in items {
        let quantity = line.quantity().get();
        writes.push(StockWrite::decrement(product, quantity)?);
        total = total
            .checked_add(product.line_total(quantity)?)
            .ok_or_else(|| DomainError::invariant("checkout total overflow"))?;
    }

    Ok(CheckoutPlan {
        writes,
        total,
        line_count: items.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{ProductId, UserId};

    use crate::line::Quantity;

    fn product(name: &str, price: Decimal, stock: u32) -> Product {
        Product::new(ProductId::new(), name, price, stock).unwrap()
    }

    fn line_for(user: UserId, product: &Product, qty: i64) -> CartLine {
        CartLine::new(user, product.id_typed(), Quantity::new(qty).unwrap())
    }

    #[test]
    fn empty_cart_cannot_be_checked_out() {
        assert_eq!(plan_checkout(&[]).unwrap_err(), DomainError::EmptyCart);
    }

    #[test]
    fn single_line_plan_matches_example_scenario() {
        let user = UserId::new();
        let p = product("Lampara", Decimal::new(100, 0), 10);
        let plan = plan_checkout(&[(line_for(user, &p, 7), p.clone())]).unwrap();

        assert_eq!(plan.total, Decimal::new(700, 0));
        assert_eq!(plan.line_count, 1);
        assert_eq!(plan.writes.len(), 1);
        assert_eq!(plan.writes[0].expected, 10);
        assert_eq!(plan.writes[0].new_stock, 3);

        let result = plan.result();
        assert_eq!(result.message, CHECKOUT_SUCCESS_MESSAGE);
        assert_eq!(result.items_count, 1);
    }

    #[test]
    fn any_short_line_fails_the_whole_plan_naming_the_product() {
        let user = UserId::new();
        let ok = product("Libro", Decimal::new(1800, 0), 40);
        let short = product("Sofa Modular", Decimal::new(85000, 0), 1);

        let err = plan_checkout(&[
            (line_for(user, &ok, 2), ok.clone()),
            (line_for(user, &short, 2), short.clone()),
        ])
        .unwrap_err();

        match err {
            DomainError::InsufficientStock(s) => {
                assert_eq!(s.product_name, "Sofa Modular");
                assert_eq!(s.context, ShortfallContext::Checkout);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_product_lines_are_rejected() {
        let user = UserId::new();
        let p = product("Perfume", Decimal::new(8500, 0), 10);
        let err = plan_checkout(&[(line_for(user, &p, 1), p.clone()), (line_for(user, &p, 1), p.clone())])
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn compensation_restores_original_stock() {
        let user = UserId::new();
        let p = product("Tablet", Decimal::new(65000, 0), 14);
        let plan = plan_checkout(&[(line_for(user, &p, 4), p.clone())]).unwrap();

        let undo = plan.compensation();
        assert_eq!(undo[0].expected, 10);
        assert_eq!(undo[0].new_stock, 14);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: total = Σ price × qty and every write is old - qty.
            #[test]
            fn totals_and_writes_are_consistent(
                // (price cents, price scale, quantity, spare stock)
                rows in prop::collection::vec((1i64..10_000, 0u32..5, 1u32..50, 0u32..50), 1..8),
            ) {
                let user = UserId::new();
                let items: Vec<(CartLine, Product)> = rows
                    .iter()
                    .map(|(cents, scale, stock, extra)| {
                        let p = product("Item", Decimal::new(*cents, *scale), stock + extra);
                        (line_for(user, &p, i64::from(*stock)), p)
                    })
                    .collect();

                let plan = plan_checkout(&items).unwrap();

                let expected_total: Decimal = items
                    .iter()
                    .map(|(l, p)| p.price() * Decimal::from(l.quantity().get()))
                    .sum();
                prop_assert_eq!(plan.total, expected_total);
                prop_assert_eq!(plan.line_count, items.len());

                for ((line, p), write) in items.iter().zip(plan.writes.iter()) {
                    prop_assert_eq!(write.product_id, p.id_typed());
                    prop_assert_eq!(write.expected, p.stock());
                    prop_assert_eq!(write.new_stock, p.stock() - line.quantity().get());
                }
            }
        }
    }
}
