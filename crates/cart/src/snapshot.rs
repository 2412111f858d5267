use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_catalog::{Product, ProductView};
use storefront_core::{CartLineId, DomainError, DomainResult, ValueObject};

use crate::line::CartLine;

/// A cart line joined with the product's *current* state.
///
/// Computed at read time and never cached, so price and stock shown to the
/// shopper always reflect the catalog as it is now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub id: CartLineId,
    pub product: ProductView,
    pub quantity: u32,
    pub subtotal: Decimal,
}

impl CartSnapshot {
    pub fn of(line: &CartLine, product: &Product) -> DomainResult<Self> {
        if line.product_id() != product.id_typed() {
            return Err(DomainError::invariant(format!(
                "cart line {} joined with wrong product {}",
                line.id_typed(),
                product.id_typed()
            )));
        }

        let quantity = line.quantity().get();
        Ok(Self {
            id: line.id_typed(),
            product: product.view(),
            quantity,
            subtotal: product.line_total(quantity)?,
        })
    }
}

impl ValueObject for CartSnapshot {}

/// Whole-cart view: the lines plus the figures a cart page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub lines: Vec<CartSnapshot>,
    /// Sum of quantities across lines.
    pub item_count: u64,
    pub total: Decimal,
}

impl CartSummary {
    pub fn from_snapshots(lines: Vec<CartSnapshot>) -> DomainResult<Self> {
        let mut total = Decimal::ZERO;
        let mut item_count = 0u64;
        for line in &lines {
            total = total
                .checked_add(line.subtotal)
                .ok_or_else(|| DomainError::invariant("cart total overflow"))?;
            item_count += u64::from(line.quantity);
        }

        Ok(Self {
            lines,
            item_count,
            total,
        })
    }
}

impl ValueObject for CartSummary {}

/// Terminal output of a successful checkout. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub message: String,
    pub total: Decimal,
    /// Number of distinct lines checked out.
    pub items_count: usize,
}

impl ValueObject for CheckoutResult {}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{ProductId, UserId};

    use crate::line::Quantity;

    fn product(price: Decimal, stock: u32) -> Product {
        Product::new(ProductId::new(), "Auriculares", price, stock).unwrap()
    }

    #[test]
    fn snapshot_subtotal_is_price_times_quantity() {
        let p = product(Decimal::new(100, 0), 10);
        let line = CartLine::new(UserId::new(), p.id_typed(), Quantity::new(4).unwrap());

        let snapshot = CartSnapshot::of(&line, &p).unwrap();
        assert_eq!(snapshot.quantity, 4);
        assert_eq!(snapshot.subtotal, Decimal::new(400, 0));
        assert_eq!(snapshot.id, line.id_typed());
    }

    #[test]
    fn snapshot_reflects_current_price() {
        let p = product(Decimal::new(100, 0), 10);
        let line = CartLine::new(UserId::new(), p.id_typed(), Quantity::new(2).unwrap());
        let repriced = Product::new(p.id_typed(), p.name(), Decimal::new(150, 0), p.stock()).unwrap();

        let snapshot = CartSnapshot::of(&line, &repriced).unwrap();
        assert_eq!(snapshot.subtotal, Decimal::new(300, 0));
    }

    #[test]
    fn snapshot_rejects_foreign_product() {
        let p = product(Decimal::ONE, 1);
        let line = CartLine::new(UserId::new(), ProductId::new(), Quantity::new(1).unwrap());
        assert!(matches!(CartSnapshot::of(&line, &p), Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn summary_totals_lines_and_items() {
        let a = product(Decimal::new(1050, 2), 10);
        let b = product(Decimal::new(200, 0), 10);
        let user = UserId::new();
        let lines = vec![
            CartSnapshot::of(&CartLine::new(user, a.id_typed(), Quantity::new(2).unwrap()), &a).unwrap(),
            CartSnapshot::of(&CartLine::new(user, b.id_typed(), Quantity::new(3).unwrap()), &b).unwrap(),
        ];

        let summary = CartSummary::from_snapshots(lines).unwrap();
        assert_eq!(summary.item_count, 5);
        assert_eq!(summary.total, Decimal::new(62100, 2));
    }

    #[test]
    fn empty_summary_is_zero() {
        let summary = CartSummary::from_snapshots(Vec::new()).unwrap();
        assert_eq!(summary.item_count, 0);
        assert_eq!(summary.total, Decimal::ZERO);
    }
}
