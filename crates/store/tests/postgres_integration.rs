//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use serial_test::serial;
use sqlx::PgPool;
use store::{
    Catalog, Coupon, CouponRegistry, ErrorKind, ItemRequest, ObjectId, OrderRepository,
    PostgresStore, Product, RequestContext, StoreError,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    // Create a fresh pool for each test to avoid connection issues
    let store = PostgresStore::connect(&info.connection_string, 5)
        .await
        .unwrap();

    // Clear tables for test isolation
    sqlx::query("TRUNCATE TABLE products, coupons, orders")
        .execute(store.pool())
        .await
        .unwrap();

    store
}

async fn seed_products(store: &PostgresStore) -> (Product, Product) {
    let pancake = Product::new("Pancake", "Classic Pancakes", 5.25);
    let brownie = Product::new("Brownie", "Salted Caramel Brownie", 4.0);
    store
        .insert_products(&[pancake.clone(), brownie.clone()])
        .await
        .unwrap();
    (pancake, brownie)
}

#[tokio::test]
#[serial]
async fn get_product_by_id() {
    let store = get_test_store().await;
    let (pancake, _) = seed_products(&store).await;
    let ctx = RequestContext::new();

    let found = store.get_product(&ctx, &pancake.id.to_hex()).await.unwrap();
    assert_eq!(found, pancake);

    let err = store
        .get_product(&ctx, &ObjectId::new().to_hex())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = store.get_product(&ctx, "not-a-hex").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);
}

#[tokio::test]
#[serial]
async fn list_products_paginates() {
    let store = get_test_store().await;
    let products: Vec<Product> = (0..23)
        .map(|i| Product::new("Cake", format!("Cake {i}"), 3.0))
        .collect();
    store.insert_products(&products).await.unwrap();
    let ctx = RequestContext::new();

    assert_eq!(store.list_products(&ctx, 1).await.unwrap().len(), 20);
    assert_eq!(store.list_products(&ctx, 0).await.unwrap().len(), 20);
    assert_eq!(store.list_products(&ctx, 2).await.unwrap().len(), 3);
    assert!(store.list_products(&ctx, 9).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn find_products_reports_missing_once() {
    let store = get_test_store().await;
    let (pancake, brownie) = seed_products(&store).await;
    let absent = ObjectId::new().to_hex();
    let ctx = RequestContext::new();

    let lookup = store
        .find_products(
            &ctx,
            &[
                pancake.id.to_hex(),
                absent.clone(),
                pancake.id.to_hex(),
                brownie.id.to_hex(),
                absent.clone(),
            ],
        )
        .await
        .unwrap();

    assert_eq!(lookup.missing, vec![absent]);
    assert_eq!(lookup.found.len(), 2);
}

#[tokio::test]
#[serial]
async fn find_products_rejects_malformed_id() {
    let store = get_test_store().await;
    let ctx = RequestContext::new();

    let err = store
        .find_products(&ctx, &["zzz".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::BadRequest { .. }));
}

#[tokio::test]
#[serial]
async fn coupons_are_unique_and_found_by_code() {
    let store = get_test_store().await;
    let ctx = RequestContext::new();

    let inserted = store
        .insert_coupons(&ctx, &[Coupon::new("SAVE10"), Coupon::new("SAVE20")])
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    let inserted = store
        .insert_coupons(&ctx, &[Coupon::new("SAVE10")])
        .await
        .unwrap();
    assert_eq!(inserted, 0);

    let coupon = store.find_one_coupon(&ctx, "SAVE20").await.unwrap();
    assert_eq!(coupon.code, "SAVE20");

    let err = store
        .find_one_coupon(&ctx, "DOES_NOT_EXIST")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[serial]
async fn create_order_persists_items() {
    let store = get_test_store().await;
    let ctx = RequestContext::new();
    let pid1 = ObjectId::new();
    let pid2 = ObjectId::new();

    let order = store
        .create_order(
            &ctx,
            &[
                ItemRequest::new(pid1.to_hex(), 2),
                ItemRequest::new(pid2.to_hex(), 5),
            ],
        )
        .await
        .unwrap();

    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].product_id, pid1);
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.items[1].product_id, pid2);
    assert_eq!(order.items[1].quantity, 5);

    // Verify persistence by reading it back
    let stored = store.get_order(&ctx, order.id).await.unwrap();
    assert_eq!(stored, order);
}

#[tokio::test]
#[serial]
async fn create_order_bad_request_writes_nothing() {
    let store = get_test_store().await;
    let ctx = RequestContext::new();

    let err = store
        .create_order(&ctx, &[ItemRequest::new("not-a-hex", 1)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
#[serial]
async fn cancelled_context_skips_query() {
    let store = get_test_store().await;
    let ctx = RequestContext::new();
    ctx.cancel();

    let err = store
        .create_order(&ctx, &[ItemRequest::new(ObjectId::new().to_hex(), 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Interrupted(_)));
    assert_eq!(err.kind(), ErrorKind::Internal);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}
