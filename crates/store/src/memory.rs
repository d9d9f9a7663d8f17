use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use common::{ObjectId, RequestContext};
use tokio::sync::RwLock;

use crate::model::{missing_ids, parse_ids};
use crate::store::{Catalog, CouponRegistry, OrderRepository};
use crate::{
    Coupon, DEFAULT_PER_PAGE, ItemRequest, Order, OrderItem, Product, ProductLookup, Result,
    StoreError, page_offset,
};

#[derive(Debug, Default)]
struct Data {
    products: Vec<Product>,
    coupons: HashSet<String>,
    orders: Vec<Order>,
}

#[derive(Debug, Default)]
struct Instrumentation {
    find_products_calls: AtomicUsize,
    find_coupon_calls: AtomicUsize,
    create_order_calls: AtomicUsize,
    fail_on_find_products: AtomicBool,
    fail_on_find_coupon: AtomicBool,
    fail_on_create_order: AtomicBool,
    latency_ms: AtomicU64,
}

/// In-memory implementation of every store trait, for tests and development.
///
/// Clones share the same data. Besides the store behaviour it records how
/// often each order-workflow operation was invoked, can be told to fail
/// those operations, and can add artificial latency to every call.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<Data>>,
    instrumentation: Arc<Instrumentation>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product to the catalog and returns its id.
    pub async fn insert_product(&self, product: Product) -> ObjectId {
        let id = product.id;
        self.data.write().await.products.push(product);
        id
    }

    /// Adds several products to the catalog, keeping their order.
    pub async fn insert_products(&self, products: impl IntoIterator<Item = Product>) {
        self.data.write().await.products.extend(products);
    }

    /// Returns the number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.data.read().await.orders.len()
    }

    /// Returns every stored order, oldest first.
    pub async fn orders(&self) -> Vec<Order> {
        self.data.read().await.orders.clone()
    }

    pub fn find_products_calls(&self) -> usize {
        self.instrumentation.find_products_calls.load(Ordering::SeqCst)
    }

    pub fn find_coupon_calls(&self) -> usize {
        self.instrumentation.find_coupon_calls.load(Ordering::SeqCst)
    }

    pub fn create_order_calls(&self) -> usize {
        self.instrumentation.create_order_calls.load(Ordering::SeqCst)
    }

    /// Configures `find_products` to fail with an infrastructure error.
    pub fn set_fail_on_find_products(&self, fail: bool) {
        self.instrumentation
            .fail_on_find_products
            .store(fail, Ordering::SeqCst);
    }

    /// Configures `find_one_coupon` to fail with an infrastructure error.
    pub fn set_fail_on_find_coupon(&self, fail: bool) {
        self.instrumentation
            .fail_on_find_coupon
            .store(fail, Ordering::SeqCst);
    }

    /// Configures `create_order` to fail with an infrastructure error.
    pub fn set_fail_on_create_order(&self, fail: bool) {
        self.instrumentation
            .fail_on_create_order
            .store(fail, Ordering::SeqCst);
    }

    /// Delays every store call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.instrumentation
            .latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    async fn simulate_latency(&self) {
        let ms = self.instrumentation.latency_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    fn check_fault(flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{what} unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl Catalog for InMemoryStore {
    async fn list_products(&self, ctx: &RequestContext, page: u32) -> Result<Vec<Product>> {
        ctx.run(async {
            self.simulate_latency().await;
            let data = self.data.read().await;
            Ok(data
                .products
                .iter()
                .skip(page_offset(page) as usize)
                .take(DEFAULT_PER_PAGE as usize)
                .cloned()
                .collect())
        })
        .await?
    }

    async fn get_product(&self, ctx: &RequestContext, id: &str) -> Result<Product> {
        let id = ObjectId::parse_str(id)?;
        ctx.run(async {
            self.simulate_latency().await;
            let data = self.data.read().await;
            data.products
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| StoreError::not_found("product", id.to_hex()))
        })
        .await?
    }

    async fn find_products(&self, ctx: &RequestContext, ids: &[String]) -> Result<ProductLookup> {
        self.instrumentation
            .find_products_calls
            .fetch_add(1, Ordering::SeqCst);
        let requested = parse_ids(ids)?;

        ctx.run(async {
            self.simulate_latency().await;
            Self::check_fault(&self.instrumentation.fail_on_find_products, "catalog")?;

            let data = self.data.read().await;
            let found: Vec<Product> = data
                .products
                .iter()
                .filter(|p| requested.contains(&p.id))
                .cloned()
                .collect();
            let missing = missing_ids(&requested, &found);
            Ok::<_, StoreError>(ProductLookup { missing, found })
        })
        .await?
    }
}

#[async_trait]
impl CouponRegistry for InMemoryStore {
    async fn find_one_coupon(&self, ctx: &RequestContext, code: &str) -> Result<Coupon> {
        self.instrumentation
            .find_coupon_calls
            .fetch_add(1, Ordering::SeqCst);

        ctx.run(async {
            self.simulate_latency().await;
            Self::check_fault(&self.instrumentation.fail_on_find_coupon, "coupon registry")?;

            let data = self.data.read().await;
            if data.coupons.contains(code) {
                Ok::<_, StoreError>(Coupon::new(code))
            } else {
                Err(StoreError::not_found("coupon", code))
            }
        })
        .await?
    }

    async fn insert_coupons(&self, ctx: &RequestContext, coupons: &[Coupon]) -> Result<u64> {
        ctx.run(async {
            self.simulate_latency().await;
            let mut data = self.data.write().await;
            let inserted = coupons
                .iter()
                .filter(|c| data.coupons.insert(c.code.clone()))
                .count();
            Ok(inserted as u64)
        })
        .await?
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create_order(&self, ctx: &RequestContext, items: &[ItemRequest]) -> Result<Order> {
        self.instrumentation
            .create_order_calls
            .fetch_add(1, Ordering::SeqCst);
        let items = items
            .iter()
            .map(OrderItem::from_request)
            .collect::<Result<Vec<_>>>()?;

        ctx.run(async {
            self.simulate_latency().await;
            Self::check_fault(&self.instrumentation.fail_on_create_order, "order store")?;

            let order = Order {
                id: ObjectId::new(),
                items,
            };
            self.data.write().await.orders.push(order.clone());
            Ok::<_, StoreError>(order)
        })
        .await?
    }
}
