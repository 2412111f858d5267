use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use rust_decimal::Decimal;
use storefront_cart::Quantity;
use storefront_catalog::Product;
use storefront_core::{ProductId, UserId};
use storefront_infra::CartEngine;
use storefront_infra::store::{InMemoryCartStore, InMemoryCatalogStore};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

fn engine_with_products(count: usize) -> (CartEngine<Arc<InMemoryCatalogStore>, Arc<InMemoryCartStore>>, Vec<ProductId>) {
    let catalog = InMemoryCatalogStore::new();
    let ids = (0..count)
        .map(|i| {
            let product = Product::new(ProductId::new(), format!("Product {i}"), Decimal::new(1999, 2), u32::MAX).unwrap();
            let id = product.id_typed();
            catalog.insert(product).unwrap();
            id
        })
        .collect();
    (CartEngine::new(Arc::new(catalog), Arc::new(InMemoryCartStore::new())), ids)
}

/// Fill a fresh cart with `lines` products and check it out.
fn bench_add_and_checkout(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("add_and_checkout");

    for lines in [1usize, 5, 20] {
        let (engine, ids) = engine_with_products(lines);
        let one = Quantity::new(1).unwrap();

        group.throughput(Throughput::Elements(lines as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &lines, |b, _| {
            b.to_async(&rt).iter(|| async {
                let user = UserId::new();
                for id in &ids {
                    engine.add(user, *id, one).await.unwrap();
                }
                black_box(engine.checkout(user).await.unwrap())
            });
        });
    }

    group.finish();
}

/// Many users checking out the same hot product concurrently.
fn bench_contended_checkout(c: &mut Criterion) {
    let rt = runtime();
    let (engine, ids) = engine_with_products(1);
    let engine = Arc::new(engine);
    let hot = ids[0];
    let one = Quantity::new(1).unwrap();

    c.bench_function("contended_checkout_16_users", |b| {
        b.to_async(&rt).iter(|| {
            let engine = engine.clone();
            async move {
                let mut tasks = Vec::with_capacity(16);
                for _ in 0..16 {
                    let engine = engine.clone();
                    tasks.push(tokio::spawn(async move {
                        let user = UserId::new();
                        engine.add(user, hot, one).await.unwrap();
                        engine.checkout(user).await.unwrap()
                    }));
                }
                for t in tasks {
                    black_box(t.await.unwrap());
                }
            }
        });
    });
}

criterion_group!(benches, bench_add_and_checkout, bench_contended_checkout);
criterion_main!(benches);
