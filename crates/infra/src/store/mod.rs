//! Persistence boundary for products and cart lines.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod r#trait;

pub use in_memory::{InMemoryCartStore, InMemoryCatalogStore};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresCartStore, PostgresCatalogStore};
pub use r#trait::{CartStore, CatalogStore, StoreError};
