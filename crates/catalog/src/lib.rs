//! Catalog domain module.
//!
//! The catalog owns products (price and stock). The cart engine only reads
//! them and, during checkout, writes new stock values back through
//! [`StockWrite`]s. Pure domain logic: no IO, no HTTP, no storage.

pub mod product;
pub mod stock;

pub use product::{MAX_PRICE_SCALE, Product, ProductView};
pub use stock::StockWrite;
