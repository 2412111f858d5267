use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_cart::{CartSnapshot, CartSummary, CheckoutResult, Quantity};
use storefront_catalog::ProductView;
use storefront_core::{CartLineId, ProductId};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartLineRequest {
    pub quantity: i64,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl From<ProductView> for ProductResponse {
    fn from(v: ProductView) -> Self {
        Self {
            id: v.id,
            name: v.name,
            description: v.description,
            price: v.price,
            stock: v.stock,
            category: v.category,
            image_url: v.image_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub id: CartLineId,
    pub product: ProductResponse,
    pub quantity: u32,
    pub subtotal: Decimal,
}

impl From<CartSnapshot> for CartItemResponse {
    fn from(s: CartSnapshot) -> Self {
        Self {
            id: s.id,
            product: s.product.into(),
            quantity: s.quantity,
            subtotal: s.subtotal,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub item_count: u64,
    pub total: Decimal,
}

impl From<CartSummary> for CartResponse {
    fn from(s: CartSummary) -> Self {
        Self {
            items: s.lines.into_iter().map(Into::into).collect(),
            item_count: s.item_count,
            total: s.total,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub message: String,
    pub total: Decimal,
    pub items_count: usize,
}

impl From<CheckoutResult> for CheckoutResponse {
    fn from(r: CheckoutResult) -> Self {
        Self {
            message: r.message,
            total: r.total,
            items_count: r.items_count,
        }
    }
}

// -------------------------
// Parsing helpers
// -------------------------

/// Reject `quantity < 1` before the engine is called.
pub fn parse_quantity(raw: i64) -> Result<Quantity, axum::response::Response> {
    Quantity::new(raw).map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()))
}

pub fn parse_product_id(raw: &str) -> Result<ProductId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"))
}

pub fn parse_line_id(raw: &str) -> Result<CartLineId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid cart line id"))
}
