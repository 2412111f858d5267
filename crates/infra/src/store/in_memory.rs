use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use storefront_cart::CartLine;
use storefront_catalog::{Product, StockWrite};
use storefront_core::{CartLineId, ProductId, UserId};

use super::r#trait::{CartStore, CatalogStore, StoreError};

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

/// In-memory product catalog.
///
/// Intended for tests/dev. Every method takes the map lock once, so each call
/// (including a whole `apply_stock_writes` batch) is atomic.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product (catalog administration, seeding, tests).
    pub fn insert(&self, product: Product) -> Result<(), StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        products.insert(product.id_typed(), product);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.products.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products.get(&id).cloned())
    }

    async fn set_stock(&self, id: ProductId, new_stock: u32) -> Result<(), StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        let product = products
            .remove(&id)
            .ok_or_else(|| StoreError::Missing(format!("product {id}")))?;
        products.insert(id, product.with_stock(new_stock));
        Ok(())
    }

    async fn apply_stock_writes(&self, writes: &[StockWrite]) -> Result<(), StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;

        // Check the whole batch before touching anything.
        for write in writes {
            let current = products
                .get(&write.product_id)
                .ok_or_else(|| StoreError::Conflict(format!("product {} no longer exists", write.product_id)))?
                .stock();
            if current != write.expected {
                return Err(StoreError::Conflict(format!(
                    "stock for product {} is {current}, expected {}",
                    write.product_id, write.expected
                )));
            }
        }

        for write in writes {
            if let Some(product) = products.remove(&write.product_id) {
                products.insert(write.product_id, product.with_stock(write.new_stock));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
struct CartTable {
    lines: HashMap<CartLineId, CartLine>,
    /// `(user, product) -> line`: O(1) merge lookup and the uniqueness guard.
    by_owner_product: HashMap<(UserId, ProductId), CartLineId>,
    by_user: HashMap<UserId, BTreeSet<CartLineId>>,
}

impl CartTable {
    fn unlink(&mut self, line: &CartLine) {
        self.by_owner_product.remove(&(line.user_id(), line.product_id()));
        if let Some(ids) = self.by_user.get_mut(&line.user_id()) {
            ids.remove(&line.id_typed());
            if ids.is_empty() {
                self.by_user.remove(&line.user_id());
            }
        }
    }
}

/// In-memory cart line store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    inner: RwLock<CartTable>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of lines across all users.
    pub fn line_count(&self) -> usize {
        self.inner.read().map(|t| t.lines.len()).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl CartStore for InMemoryCartStore {
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<CartLine>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        let Some(ids) = table.by_user.get(&user_id) else {
            return Ok(vec![]);
        };

        // BTreeSet iteration is ascending by id.
        Ok(ids.iter().filter_map(|id| table.lines.get(id).cloned()).collect())
    }

    async fn get(&self, line_id: CartLineId) -> Result<Option<CartLine>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table.lines.get(&line_id).cloned())
    }

    async fn find(&self, user_id: UserId, product_id: ProductId) -> Result<Option<CartLine>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table
            .by_owner_product
            .get(&(user_id, product_id))
            .and_then(|id| table.lines.get(id))
            .cloned())
    }

    async fn upsert(&self, line: CartLine) -> Result<(), StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        let key = (line.user_id(), line.product_id());

        if let Some(holder) = table.by_owner_product.get(&key) {
            if *holder != line.id_typed() {
                return Err(StoreError::Conflict(format!(
                    "user {} already has line {holder} for product {}",
                    line.user_id(),
                    line.product_id()
                )));
            }
        }

        if let Some(previous) = table.lines.remove(&line.id_typed()) {
            table.unlink(&previous);
        }

        table.by_owner_product.insert(key, line.id_typed());
        table.by_user.entry(line.user_id()).or_default().insert(line.id_typed());
        table.lines.insert(line.id_typed(), line);
        Ok(())
    }

    async fn delete_by_id(&self, line_id: CartLineId) -> Result<bool, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        match table.lines.remove(&line_id) {
            Some(line) => {
                table.unlink(&line);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all_by_user(&self, user_id: UserId) -> Result<usize, StoreError> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        let Some(ids) = table.by_user.remove(&user_id) else {
            return Ok(0);
        };

        for id in &ids {
            if let Some(line) = table.lines.remove(id) {
                table.by_owner_product.remove(&(line.user_id(), line.product_id()));
            }
        }
        Ok(ids.len())
    }
}
