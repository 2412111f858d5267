//! Cart engine: per-user cart mutations over the catalog and cart stores.
//!
//! ## Locking
//!
//! Every operation on a user's cart holds that user's lock for its whole
//! read-modify-write, so two concurrent adds of the same product cannot both
//! see "no line yet". Operations that validate against stock additionally
//! hold the product lock(s), always taken *after* the user lock and in
//! ascending product id order:
//!
//! ```text
//! user lock ─▶ product lock(s), ascending ─▶ read ─▶ validate ─▶ write
//! ```
//!
//! Adds never reserve stock. Two users may each hold the last unit in their
//! carts; the first checkout wins and the second fails with
//! `InsufficientStock`.

use tracing::{instrument, warn};

use storefront_cart::{CartLine, CartSnapshot, CartSummary, Quantity, ensure_within_stock, merged_quantity};
use storefront_catalog::Product;
use storefront_core::{CartLineId, ProductId, ShortfallContext, UserId};

use crate::error::CartError;
use crate::locks::KeyedLocks;
use crate::store::{CartStore, CatalogStore};

#[derive(Debug)]
pub struct CartEngine<C, S> {
    pub(crate) catalog: C,
    pub(crate) carts: S,
    pub(crate) user_locks: KeyedLocks<UserId>,
    pub(crate) product_locks: KeyedLocks<ProductId>,
}

impl<C, S> CartEngine<C, S>
where
    C: CatalogStore,
    S: CartStore,
{
    pub fn new(catalog: C, carts: S) -> Self {
        Self {
            catalog,
            carts,
            user_locks: KeyedLocks::new(),
            product_locks: KeyedLocks::new(),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn carts(&self) -> &S {
        &self.carts
    }

    /// The user's lines joined with current product state, ordered by line id.
    ///
    /// Lines whose product has left the catalog are skipped.
    #[instrument(skip_all, fields(user_id = %user_id), err)]
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartSnapshot>, CartError> {
        let _user = self.user_locks.lock(user_id).await;
        self.snapshots(user_id).await
    }

    #[instrument(skip_all, fields(user_id = %user_id), err)]
    pub async fn summary(&self, user_id: UserId) -> Result<CartSummary, CartError> {
        let _user = self.user_locks.lock(user_id).await;
        let lines = self.snapshots(user_id).await?;
        Ok(CartSummary::from_snapshots(lines)?)
    }

    /// Add `quantity` units of a product, merging into an existing line.
    #[instrument(skip_all, fields(user_id = %user_id, product_id = %product_id, quantity = quantity.get()), err)]
    pub async fn add(&self, user_id: UserId, product_id: ProductId, quantity: Quantity) -> Result<CartSnapshot, CartError> {
        let _user = self.user_locks.lock(user_id).await;
        let _product = self.product_locks.lock(product_id).await;

        let product = self.require_product(product_id).await?;
        let existing = self.carts.find(user_id, product_id).await?;

        let merged = merged_quantity(existing.as_ref(), quantity, &product)?;
        let line = match existing {
            Some(line) => line.with_quantity(merged),
            None => CartLine::new(user_id, product_id, merged),
        };

        self.carts.upsert(line.clone()).await?;
        Ok(CartSnapshot::of(&line, &product)?)
    }

    /// Replace the quantity of one of the caller's lines.
    #[instrument(skip_all, fields(user_id = %user_id, line_id = %line_id, quantity = quantity.get()), err)]
    pub async fn update(&self, user_id: UserId, line_id: CartLineId, quantity: Quantity) -> Result<CartSnapshot, CartError> {
        let _user = self.user_locks.lock(user_id).await;

        let line = self.require_own_line(user_id, line_id).await?;
        let _product = self.product_locks.lock(line.product_id()).await;

        let product = self.require_product(line.product_id()).await?;
        ensure_within_stock(&product, quantity.get(), ShortfallContext::Requested)?;

        let line = line.with_quantity(quantity);
        self.carts.upsert(line.clone()).await?;
        Ok(CartSnapshot::of(&line, &product)?)
    }

    #[instrument(skip_all, fields(user_id = %user_id, line_id = %line_id), err)]
    pub async fn remove(&self, user_id: UserId, line_id: CartLineId) -> Result<(), CartError> {
        let _user = self.user_locks.lock(user_id).await;

        self.require_own_line(user_id, line_id).await?;
        if !self.carts.delete_by_id(line_id).await? {
            return Err(line_not_found(line_id));
        }
        Ok(())
    }

    /// Delete every line of the user's cart. Returns how many were removed.
    #[instrument(skip_all, fields(user_id = %user_id), err)]
    pub async fn clear(&self, user_id: UserId) -> Result<usize, CartError> {
        let _user = self.user_locks.lock(user_id).await;
        Ok(self.carts.delete_all_by_user(user_id).await?)
    }

    /// Caller must hold the user lock.
    async fn snapshots(&self, user_id: UserId) -> Result<Vec<CartSnapshot>, CartError> {
        let lines = self.carts.list_by_user(user_id).await?;

        let mut snapshots = Vec::with_capacity(lines.len());
        for line in &lines {
            match self.catalog.get_product(line.product_id()).await? {
                Some(product) => snapshots.push(CartSnapshot::of(line, &product)?),
                None => warn!(
                    line_id = %line.id_typed(),
                    product_id = %line.product_id(),
                    "cart line references a product no longer in the catalog"
                ),
            }
        }
        Ok(snapshots)
    }

    pub(crate) async fn require_product(&self, product_id: ProductId) -> Result<Product, CartError> {
        self.catalog
            .get_product(product_id)
            .await?
            .ok_or_else(|| CartError::NotFound {
                entity: "product",
                id: product_id.to_string(),
            })
    }

    async fn require_own_line(&self, user_id: UserId, line_id: CartLineId) -> Result<CartLine, CartError> {
        let line = self
            .carts
            .get(line_id)
            .await?
            .ok_or_else(|| line_not_found(line_id))?;
        line.ensure_owned_by(user_id)?;
        Ok(line)
    }
}

fn line_not_found(line_id: CartLineId) -> CartError {
    CartError::NotFound {
        entity: "cart line",
        id: line_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use storefront_core::StockShortfall;

    use crate::store::{InMemoryCartStore, InMemoryCatalogStore};

    type Engine = CartEngine<InMemoryCatalogStore, InMemoryCartStore>;

    fn qty(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn engine_with(price: i64, stock: u32) -> (Engine, ProductId) {
        let catalog = InMemoryCatalogStore::new();
        let product = Product::new(ProductId::new(), "Lampara de Pie", Decimal::new(price, 0), stock).unwrap();
        let id = product.id_typed();
        catalog.insert(product).unwrap();
        (CartEngine::new(catalog, InMemoryCartStore::new()), id)
    }

    fn shortfall(err: CartError) -> StockShortfall {
        match err {
            CartError::InsufficientStock(s) => s,
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn add_then_add_merges_into_one_line() {
        let (engine, p) = engine_with(100, 10);
        let user = UserId::new();

        let first = engine.add(user, p, qty(4)).await.unwrap();
        assert_eq!(first.quantity, 4);
        assert_eq!(first.subtotal, Decimal::new(400, 0));

        let merged = engine.add(user, p, qty(3)).await.unwrap();
        assert_eq!(merged.id, first.id);
        assert_eq!(merged.quantity, 7);
        assert_eq!(merged.subtotal, Decimal::new(700, 0));

        assert_eq!(engine.list(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn add_over_merged_ceiling_leaves_line_untouched() {
        let (engine, p) = engine_with(100, 10);
        let user = UserId::new();
        engine.add(user, p, qty(7)).await.unwrap();

        let s = shortfall(engine.add(user, p, qty(5)).await.unwrap_err());
        assert_eq!(s.context, ShortfallContext::Merged);

        let lines = engine.list(user).await.unwrap();
        assert_eq!(lines[0].quantity, 7);
    }

    #[tokio::test]
    async fn add_of_unknown_product_is_not_found() {
        let (engine, _) = engine_with(100, 10);
        let err = engine.add(UserId::new(), ProductId::new(), qty(1)).await.unwrap_err();
        assert!(matches!(err, CartError::NotFound { entity: "product", .. }));
    }

    #[tokio::test]
    async fn add_does_not_touch_stock() {
        let (engine, p) = engine_with(100, 10);
        engine.add(UserId::new(), p, qty(4)).await.unwrap();
        let product = engine.catalog().get_product(p).await.unwrap().unwrap();
        assert_eq!(product.stock(), 10);
    }

    #[tokio::test]
    async fn update_replaces_quantity_within_stock() {
        let (engine, p) = engine_with(100, 10);
        let user = UserId::new();
        let line = engine.add(user, p, qty(2)).await.unwrap();

        let updated = engine.update(user, line.id, qty(9)).await.unwrap();
        assert_eq!(updated.quantity, 9);

        let s = shortfall(engine.update(user, line.id, qty(11)).await.unwrap_err());
        assert_eq!(s.context, ShortfallContext::Requested);
        assert_eq!(engine.list(user).await.unwrap()[0].quantity, 9);
    }

    #[tokio::test]
    async fn other_users_line_is_forbidden() {
        let (engine, p) = engine_with(100, 10);
        let owner = UserId::new();
        let intruder = UserId::new();
        let line = engine.add(owner, p, qty(2)).await.unwrap();

        assert!(matches!(
            engine.update(intruder, line.id, qty(1)).await.unwrap_err(),
            CartError::Forbidden(_)
        ));
        assert!(matches!(
            engine.remove(intruder, line.id).await.unwrap_err(),
            CartError::Forbidden(_)
        ));
        assert_eq!(engine.list(owner).await.unwrap()[0].quantity, 2);
    }

    #[tokio::test]
    async fn removing_twice_is_not_found_the_second_time() {
        let (engine, p) = engine_with(100, 10);
        let user = UserId::new();
        let line = engine.add(user, p, qty(1)).await.unwrap();

        engine.remove(user, line.id).await.unwrap();
        let err = engine.remove(user, line.id).await.unwrap_err();
        assert!(matches!(err, CartError::NotFound { entity: "cart line", .. }));
    }

    #[tokio::test]
    async fn clear_of_empty_cart_is_a_no_op() {
        let (engine, _) = engine_with(100, 10);
        assert_eq!(engine.clear(UserId::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn summary_adds_up_lines() {
        let (engine, p) = engine_with(250, 10);
        let user = UserId::new();
        engine.add(user, p, qty(3)).await.unwrap();

        let summary = engine.summary(user).await.unwrap();
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total, Decimal::new(750, 0));
    }
}
