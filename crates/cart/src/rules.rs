//! Stock-ceiling rules applied when a line is created or changed.
//!
//! `CartLine.quantity <= Product.stock` is checked here at mutation time only.
//! It is not a stored invariant: stock can move before checkout, which
//! re-checks everything in [`crate::checkout::plan_checkout`].

use storefront_catalog::Product;
use storefront_core::{DomainError, DomainResult, ShortfallContext, StockShortfall};

use crate::line::{CartLine, Quantity};

/// Fail with `InsufficientStock` if `quantity` exceeds the product's stock.
pub fn ensure_within_stock(product: &Product, quantity: u32, context: ShortfallContext) -> DomainResult<()> {
    if product.has_stock_for(quantity) {
        return Ok(());
    }

    Err(DomainError::InsufficientStock(StockShortfall {
        product_id: product.id_typed(),
        product_name: product.name().to_string(),
        requested: quantity,
        available: product.stock(),
        context,
    }))
}

/// Quantity a line should hold after adding `requested` units of `product`.
///
/// The request alone must fit in stock; merged with an existing line the
/// combined quantity must fit too. The two failures carry different
/// [`ShortfallContext`]s.
pub fn merged_quantity(existing: Option<&CartLine>, requested: Quantity, product: &Product) -> DomainResult<Quantity> {
    ensure_within_stock(product, requested.get(), ShortfallContext::Requested)?;

    let Some(line) = existing else {
        return Ok(requested);
    };

    if line.product_id() != product.id_typed() {
        return Err(DomainError::invariant(format!(
            "cart line {} holds product {}, not {}",
            line.id_typed(),
            line.product_id(),
            product.id_typed()
        )));
    }

    let combined = line.quantity().get().saturating_add(requested.get());
    ensure_within_stock(product, combined, ShortfallContext::Merged)?;

    line.quantity()
        .checked_add(requested)
        .ok_or_else(|| DomainError::invariant("combined quantity overflow"))
}
