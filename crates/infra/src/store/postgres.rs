//! Postgres-backed catalog and cart stores.
//!
//! Schema lives in `migrations/0001_storefront.sql`.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Second line for the same `(user_id, product_id)` |
//! | Database (check violation) | `23514` | `Conflict` | Stock or quantity would leave its allowed range |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | Other | N/A | `Backend` | Pool closed, network errors, etc. |
//!
//! Integer columns are `BIGINT` so every `u32` fits; a value outside `u32`
//! coming back from the database is reported as `Corrupt`.

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use storefront_cart::{CartLine, Quantity};
use storefront_catalog::{Product, StockWrite};
use storefront_core::{CartLineId, ProductId, UserId};

use super::r#trait::{CartStore, CatalogStore, StoreError};

#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Insert a product, or overwrite every field of an existing one.
    #[instrument(skip(self, product), fields(product_id = %product.id_typed()), err)]
    pub async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, stock, category, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                price = EXCLUDED.price,
                stock = EXCLUDED.stock,
                category = EXCLUDED.category,
                image_url = EXCLUDED.image_url
            "#,
        )
        .bind(*product.id_typed().as_uuid())
        .bind(product.name())
        .bind(product.description())
        .bind(product.price())
        .bind(i64::from(product.stock()))
        .bind(product.category())
        .bind(product.image_url())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_products", e))?;
        u64::try_from(count).map_err(|_| StoreError::Corrupt(format!("negative product count {count}")))
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, price, stock, category, image_url
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn set_stock(&self, id: ProductId, new_stock: u32) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE products SET stock = $2 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(i64::from(new_stock))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_stock", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(format!("product {id}")));
        }
        Ok(())
    }

    /// One transaction; each row is updated only if it still holds the
    /// expected stock. Any miss rolls the whole batch back.
    #[instrument(skip(self, writes), fields(write_count = writes.len()), err)]
    async fn apply_stock_writes(&self, writes: &[StockWrite]) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for write in writes {
            let result = sqlx::query("UPDATE products SET stock = $3 WHERE id = $1 AND stock = $2")
                .bind(*write.product_id.as_uuid())
                .bind(i64::from(write.expected))
                .bind(i64::from(write.new_stock))
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("apply_stock_write", e))?;

            if result.rows_affected() != 1 {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(StoreError::Conflict(format!(
                    "stock for product {} is no longer {}",
                    write.product_id, write.expected
                )));
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PostgresCartStore {
    pool: Arc<PgPool>,
}

impl PostgresCartStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait::async_trait]
impl CartStore for PostgresCartStore {
    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<CartLine>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, product_id, quantity
            FROM cart_lines
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(*user_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_cart_lines", e))?;

        rows.iter().map(line_from_row).collect()
    }

    #[instrument(skip(self), fields(line_id = %line_id), err)]
    async fn get(&self, line_id: CartLineId) -> Result<Option<CartLine>, StoreError> {
        let row = sqlx::query("SELECT id, user_id, product_id, quantity FROM cart_lines WHERE id = $1")
            .bind(*line_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_cart_line", e))?;

        row.as_ref().map(line_from_row).transpose()
    }

    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id), err)]
    async fn find(&self, user_id: UserId, product_id: ProductId) -> Result<Option<CartLine>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, product_id, quantity
            FROM cart_lines
            WHERE user_id = $1 AND product_id = $2
            "#,
        )
        .bind(*user_id.as_uuid())
        .bind(*product_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_cart_line", e))?;

        row.as_ref().map(line_from_row).transpose()
    }

    /// Insert by id, or update the quantity of the existing row. The unique
    /// `(user_id, product_id)` constraint turns a second line into `Conflict`.
    #[instrument(skip(self, line), fields(line_id = %line.id_typed(), user_id = %line.user_id()), err)]
    async fn upsert(&self, line: CartLine) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO cart_lines (id, user_id, product_id, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET quantity = EXCLUDED.quantity
            "#,
        )
        .bind(*line.id_typed().as_uuid())
        .bind(*line.user_id().as_uuid())
        .bind(*line.product_id().as_uuid())
        .bind(i64::from(line.quantity().get()))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_cart_line", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(line_id = %line_id), err)]
    async fn delete_by_id(&self, line_id: CartLineId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE id = $1")
            .bind(*line_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_cart_line", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn delete_all_by_user(&self, user_id: UserId) -> Result<usize, StoreError> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = $1")
            .bind(*user_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("clear_cart_lines", e))?;
        usize::try_from(result.rows_affected())
            .map_err(|_| StoreError::Corrupt("deleted row count overflows usize".to_string()))
    }
}

fn column_u32(row: &PgRow, column: &str) -> Result<u32, StoreError> {
    let value: i64 = row.try_get(column).map_err(|e| map_sqlx_error(column, e))?;
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("{column} out of range: {value}")))
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("id", e))?;
    let name: String = row.try_get("name").map_err(|e| map_sqlx_error("name", e))?;
    let description: String = row.try_get("description").map_err(|e| map_sqlx_error("description", e))?;
    let price: Decimal = row.try_get("price").map_err(|e| map_sqlx_error("price", e))?;
    let category: Option<String> = row.try_get("category").map_err(|e| map_sqlx_error("category", e))?;
    let image_url: Option<String> = row.try_get("image_url").map_err(|e| map_sqlx_error("image_url", e))?;
    let stock = column_u32(row, "stock")?;

    let mut product = Product::new(ProductId::from_uuid(id), name, price, stock)
        .map_err(|e| StoreError::Corrupt(format!("product {id}: {e}")))?
        .with_description(description);
    if let Some(category) = category {
        product = product.with_category(category);
    }
    if let Some(image_url) = image_url {
        product = product.with_image_url(image_url);
    }
    Ok(product)
}

fn line_from_row(row: &PgRow) -> Result<CartLine, StoreError> {
    let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("id", e))?;
    let user_id: Uuid = row.try_get("user_id").map_err(|e| map_sqlx_error("user_id", e))?;
    let product_id: Uuid = row.try_get("product_id").map_err(|e| map_sqlx_error("product_id", e))?;
    let quantity = Quantity::new(i64::from(column_u32(row, "quantity")?))
        .map_err(|e| StoreError::Corrupt(format!("cart line {id}: {e}")))?;

    Ok(CartLine::restore(
        CartLineId::from_uuid(id),
        UserId::from_uuid(user_id),
        ProductId::from_uuid(product_id),
        quantity,
    ))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("23514") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::ColumnDecode { index, source } => {
            StoreError::Corrupt(format!("cannot decode column {index} in {operation}: {source}"))
        }
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}
