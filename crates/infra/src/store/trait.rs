use std::sync::Arc;

use thiserror::Error;

use storefront_cart::CartLine;
use storefront_catalog::{Product, StockWrite};
use storefront_core::{CartLineId, ProductId, UserId};

/// Store operation error.
///
/// These are **infrastructure errors** (backend unavailable, concurrent
/// modification, unreadable rows) as opposed to domain errors (stock,
/// ownership, validation).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not complete the read/write.
    #[error("store backend failure: {0}")]
    Backend(String),

    /// A write lost against concurrent state (stock moved, duplicate line).
    #[error("store conflict: {0}")]
    Conflict(String),

    /// A write targeted a record that does not exist.
    #[error("record missing: {0}")]
    Missing(String),

    /// A stored row could not be mapped back to a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Catalog capability consumed by the cart engine (strongly consistent).
///
/// Product CRUD lives elsewhere; the engine only reads products and writes
/// stock back during checkout.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Overwrite one product's stock. `Missing` if the product does not exist.
    async fn set_stock(&self, id: ProductId, new_stock: u32) -> Result<(), StoreError>;

    /// Apply every write or none.
    ///
    /// Each write replaces its `expected` value; if any product is missing or
    /// holds a different stock the whole batch is rejected with `Conflict`
    /// and no stock changes.
    async fn apply_stock_writes(&self, writes: &[StockWrite]) -> Result<(), StoreError>;
}

/// Cart line persistence.
///
/// Implementations must keep at most one line per `(user, product)`: an
/// `upsert` of a new line id for an already-held pair is a `Conflict`.
#[async_trait::async_trait]
pub trait CartStore: Send + Sync {
    /// All lines for `user`, ordered by line id (creation order for UUIDv7 ids).
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<CartLine>, StoreError>;

    async fn get(&self, line_id: CartLineId) -> Result<Option<CartLine>, StoreError>;

    /// The line for `(user, product)`, if any.
    async fn find(&self, user_id: UserId, product_id: ProductId) -> Result<Option<CartLine>, StoreError>;

    async fn upsert(&self, line: CartLine) -> Result<(), StoreError>;

    /// Returns whether a line was deleted.
    async fn delete_by_id(&self, line_id: CartLineId) -> Result<bool, StoreError>;

    /// Returns how many lines were deleted.
    async fn delete_all_by_user(&self, user_id: UserId) -> Result<usize, StoreError>;
}

#[async_trait::async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get_product(id).await
    }

    async fn set_stock(&self, id: ProductId, new_stock: u32) -> Result<(), StoreError> {
        (**self).set_stock(id, new_stock).await
    }

    async fn apply_stock_writes(&self, writes: &[StockWrite]) -> Result<(), StoreError> {
        (**self).apply_stock_writes(writes).await
    }
}

#[async_trait::async_trait]
impl<S> CartStore for Arc<S>
where
    S: CartStore + ?Sized,
{
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<CartLine>, StoreError> {
        (**self).list_by_user(user_id).await
    }

    async fn get(&self, line_id: CartLineId) -> Result<Option<CartLine>, StoreError> {
        (**self).get(line_id).await
    }

    async fn find(&self, user_id: UserId, product_id: ProductId) -> Result<Option<CartLine>, StoreError> {
        (**self).find(user_id, product_id).await
    }

    async fn upsert(&self, line: CartLine) -> Result<(), StoreError> {
        (**self).upsert(line).await
    }

    async fn delete_by_id(&self, line_id: CartLineId) -> Result<bool, StoreError> {
        (**self).delete_by_id(line_id).await
    }

    async fn delete_all_by_user(&self, user_id: UserId) -> Result<usize, StoreError> {
        (**self).delete_all_by_user(user_id).await
    }
}
