use std::sync::Arc;

use tracing::info;

use storefront_infra::CartEngine;
use storefront_infra::StorefrontConfig;
use storefront_infra::seed;
use storefront_infra::store::{CartStore, CatalogStore, InMemoryCartStore, InMemoryCatalogStore, StoreError};

/// Cart engine over whichever stores this process was wired with.
pub type StoreEngine = CartEngine<Arc<dyn CatalogStore>, Arc<dyn CartStore>>;

/// Everything handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub engine: StoreEngine,
}

impl AppServices {
    pub fn new(catalog: Arc<dyn CatalogStore>, carts: Arc<dyn CartStore>) -> Self {
        Self {
            engine: CartEngine::new(catalog, carts),
        }
    }

    /// In-memory carts over the given catalog.
    pub fn in_memory(catalog: Arc<InMemoryCatalogStore>) -> Self {
        Self::new(catalog, Arc::new(InMemoryCartStore::new()))
    }
}

/// Wire stores from configuration.
///
/// With the `postgres` feature and `DATABASE_URL` set, both stores are
/// Postgres-backed; otherwise everything lives in memory.
pub async fn build_services(config: &StorefrontConfig) -> Result<AppServices, StoreError> {
    #[cfg(feature = "postgres")]
    if let Some(url) = config.database_url.as_deref() {
        return build_postgres_services(url, config.seed_demo).await;
    }

    let catalog = Arc::new(InMemoryCatalogStore::new());
    if config.seed_demo {
        seed::seed_demo_catalog(&catalog)?;
    }
    info!(backend = "in_memory", products = catalog.len(), "stores ready");

    Ok(AppServices::in_memory(catalog))
}

#[cfg(feature = "postgres")]
async fn build_postgres_services(url: &str, seed_demo: bool) -> Result<AppServices, StoreError> {
    use storefront_infra::store::{PostgresCartStore, PostgresCatalogStore};

    let pool = sqlx::PgPool::connect(url)
        .await
        .map_err(|e| StoreError::Backend(format!("connect: {e}")))?;

    let catalog = PostgresCatalogStore::new(pool.clone());
    if seed_demo {
        seed::seed_demo_catalog_pg(&catalog).await?;
    }
    info!(backend = "postgres", "stores ready");

    Ok(AppServices::new(
        Arc::new(catalog),
        Arc::new(PostgresCartStore::new(pool)),
    ))
}
