//! Storage layer for the kart order backend.
//!
//! The order orchestrator depends only on the narrow capability traits in
//! [`store`](crate::store); this crate provides two adapters for them:
//! [`InMemoryStore`] for tests and development, and [`PostgresStore`] for
//! production.

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use common::{ErrorKind, ObjectId, RequestContext};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use model::{
    Coupon, DEFAULT_PER_PAGE, ItemRequest, Order, OrderItem, Product, ProductLookup,
    page_offset,
};
pub use postgres::PostgresStore;
pub use store::{Catalog, CouponRegistry, OrderRepository};
