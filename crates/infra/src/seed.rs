//! Demo catalog for local runs (`STOREFRONT_SEED_DEMO=true`).
//!
//! Ids are deterministic so scripted requests survive a restart.

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use storefront_catalog::Product;
use storefront_core::{DomainResult, ProductId};

use crate::store::{InMemoryCatalogStore, StoreError};

const DEMO_ID_BASE: u128 = 0x0190_0000_0000_7000_8000_0000_0000_0000;

// (n, name, description, price, stock, category)
const DEMO_CATALOG: &[(u128, &str, &str, i64, u32, &str)] = &[
    (1, "iPhone 14 Pro", "A16 Bionic, Pro camera system, 6.1\" Super Retina XDR display.", 999_999, 15, "electronicos"),
    (2, "Samsung Galaxy S23 Ultra", "Built-in S Pen, 200MP camera, 6.8\" Dynamic AMOLED 2X.", 850_000, 12, "electronicos"),
    (3, "Auriculares Bluetooth Sony WH-1000XM5", "Noise cancelling, up to 30 hours of battery.", 45_000, 25, "electronicos"),
    (4, "MacBook Air M2", "13.6\" Liquid Retina, up to 18 hours of battery.", 1_200_000, 8, "electronicos"),
    (5, "Camiseta Basica Algodon", "100% cotton, classic fit.", 2_500, 50, "ropa"),
    (6, "Jeans Slim Fit", "Premium denim, sizes 28-38.", 8_500, 30, "ropa"),
    (7, "Zapatillas Nike Air Max", "Running and casual wear.", 12_000, 20, "deportes"),
    (8, "Sofa Modular 3 Plazas", "Grey fabric modular sofa.", 85_000, 5, "hogar"),
    (9, "Mesa de Centro Madera", "Solid wood coffee table, natural finish.", 25_000, 10, "hogar"),
    (10, "El Principito", "Illustrated edition.", 1_800, 40, "libros"),
    (11, "Cien Anos de Soledad", "Gabriel Garcia Marquez.", 2_200, 35, "libros"),
    (12, "Crema Facial Hidratante", "Hyaluronic acid and vitamin E.", 3_500, 45, "belleza"),
    (13, "Bicicleta Montana 21 Velocidades", "Aluminium frame, disc brakes.", 45_000, 7, "deportes"),
    (14, "Lampara de Escritorio LED", "Dimmable, articulated arm.", 6_500, 22, "hogar"),
];

/// Deterministic id of the `n`th demo product (1-based).
pub fn demo_product_id(n: u128) -> ProductId {
    ProductId::from_uuid(Uuid::from_u128(DEMO_ID_BASE + n))
}

pub fn demo_products() -> DomainResult<Vec<Product>> {
    DEMO_CATALOG
        .iter()
        .map(|(n, name, description, price, stock, category)| {
            Ok(Product::new(demo_product_id(*n), *name, Decimal::new(*price, 0), *stock)?
                .with_description(*description)
                .with_category(*category)
                .with_image_url(format!("https://picsum.photos/300/200?random={n}")))
        })
        .collect()
}

/// Load the demo catalog into an empty store. Returns how many products were
/// inserted (0 if the store already had products).
pub fn seed_demo_catalog(store: &InMemoryCatalogStore) -> Result<usize, StoreError> {
    if !store.is_empty() {
        return Ok(0);
    }

    let products = demo_products().map_err(|e| StoreError::Corrupt(format!("demo catalog: {e}")))?;
    let count = products.len();
    for product in products {
        store.insert(product)?;
    }
    info!(count, "demo catalog loaded");
    Ok(count)
}

#[cfg(feature = "postgres")]
pub async fn seed_demo_catalog_pg(store: &crate::store::PostgresCatalogStore) -> Result<usize, StoreError> {
    if store.count().await? > 0 {
        return Ok(0);
    }

    let products = demo_products().map_err(|e| StoreError::Corrupt(format!("demo catalog: {e}")))?;
    for product in &products {
        store.insert(product).await?;
    }
    info!(count = products.len(), "demo catalog loaded");
    Ok(products.len())
}
