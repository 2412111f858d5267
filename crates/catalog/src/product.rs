use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, ProductId, ValueObject};

/// Most decimal places a price may carry; matches the `NUMERIC(18, 4)`
/// column, so a stored price reads back unchanged.
pub const MAX_PRICE_SCALE: u32 = 4;

/// Catalog product as seen by the cart engine.
///
/// Category and image are opaque references owned by the catalog; the engine
/// only carries them through to snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    /// Unit price. Never negative.
    price: Decimal,
    stock: u32,
    category: Option<String>,
    image_url: Option<String>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal, stock: u32) -> DomainResult<Self> {
        if price < Decimal::ZERO {
            return Err(DomainError::validation("price must not be negative"));
        }
        if price.normalize().scale() > MAX_PRICE_SCALE {
            return Err(DomainError::validation(format!(
                "price must have at most {MAX_PRICE_SCALE} decimal places"
            )));
        }

        Ok(Self {
            id,
            name: name.into(),
            description: String::new(),
            price,
            stock,
            category: None,
            image_url: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Copy of this product with a different stock level.
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn has_stock_for(&self, quantity: u32) -> bool {
        quantity <= self.stock
    }

    /// `price × quantity`, exact decimal arithmetic.
    pub fn line_total(&self, quantity: u32) -> DomainResult<Decimal> {
        self.price
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| {
                DomainError::invariant(format!(
                    "line total overflow for product {} (quantity {quantity})",
                    self.id
                ))
            })
    }

    pub fn view(&self) -> ProductView {
        ProductView {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            stock: self.stock,
            category: self.category.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Denormalized product view embedded in cart snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl ValueObject for ProductView {}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(price: Decimal, stock: u32) -> Product {
        Product::new(ProductId::new(), "Mesa de Centro", price, stock).unwrap()
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = Product::new(ProductId::new(), "Broken", Decimal::new(-1, 2), 1).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn price_beyond_four_decimals_is_rejected() {
        let err = Product::new(ProductId::new(), "Tornillo", Decimal::new(123_456, 5), 1).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // Trailing zeros do not count.
        let product = test_product(Decimal::new(1_250_000, 5), 1);
        assert_eq!(product.price(), Decimal::new(125, 1));
    }

    #[test]
    fn zero_price_is_allowed() {
        let product = test_product(Decimal::ZERO, 3);
        assert_eq!(product.price(), Decimal::ZERO);
    }

    #[test]
    fn line_total_is_exact_for_fractional_prices() {
        // 0.1 * 3 is not 0.3 in binary floating point.
        let product = test_product(Decimal::new(1, 1), 10);
        assert_eq!(product.line_total(3).unwrap(), Decimal::new(3, 1));
    }

    #[test]
    fn line_total_overflow_is_an_invariant_violation() {
        let product = test_product(Decimal::MAX, 10);
        let err = product.line_total(2).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn view_carries_catalog_references() {
        let product = test_product(Decimal::new(25000, 0), 10)
            .with_description("Solid wood")
            .with_category("hogar")
            .with_image_url("https://img.example/mesa.png");

        let view = product.view();
        assert_eq!(view.id, product.id_typed());
        assert_eq!(view.category.as_deref(), Some("hogar"));
        assert_eq!(view.image_url.as_deref(), Some("https://img.example/mesa.png"));
        assert_eq!(view.stock, 10);
    }

    #[test]
    fn has_stock_for_is_inclusive() {
        let product = test_product(Decimal::ONE, 5);
        assert!(product.has_stock_for(5));
        assert!(!product.has_stock_for(6));
    }
}
