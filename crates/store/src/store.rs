use async_trait::async_trait;
use common::RequestContext;

use crate::{Coupon, ItemRequest, Order, Product, ProductLookup, Result};

/// Read access to the product catalog.
///
/// Implementations must be thread-safe and honour the request context on
/// every call.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Returns one page of products, `DEFAULT_PER_PAGE` at a time.
    ///
    /// `page` is 1-based; 0 is treated as 1. A page past the end is empty.
    async fn list_products(&self, ctx: &RequestContext, page: u32) -> Result<Vec<Product>>;

    /// Returns a single product.
    ///
    /// Fails with `BadRequest` if `id` is malformed and `NotFound` if absent.
    async fn get_product(&self, ctx: &RequestContext, id: &str) -> Result<Product>;

    /// Resolves a batch of product identifiers in a single round trip.
    ///
    /// Fails with `BadRequest` if any identifier is malformed. Identifiers
    /// repeated in `ids` are resolved like any other; `missing` lists each
    /// absent identifier once.
    async fn find_products(&self, ctx: &RequestContext, ids: &[String]) -> Result<ProductLookup>;
}

/// Access to the coupon registry.
#[async_trait]
pub trait CouponRegistry: Send + Sync {
    /// Looks up a coupon by code. Fails with `NotFound` if absent.
    async fn find_one_coupon(&self, ctx: &RequestContext, code: &str) -> Result<Coupon>;

    /// Inserts coupons, skipping codes that already exist.
    ///
    /// Returns the number of coupons actually inserted.
    async fn insert_coupons(&self, ctx: &RequestContext, coupons: &[Coupon]) -> Result<u64>;
}

/// Persistence for orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists a new order made of `items` and assigns its identifier.
    ///
    /// Every product identifier is re-parsed; a malformed one fails with
    /// `BadRequest` and nothing is written.
    async fn create_order(&self, ctx: &RequestContext, items: &[ItemRequest]) -> Result<Order>;
}
