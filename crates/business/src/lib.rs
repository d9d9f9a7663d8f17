//! Business layer of the kart order backend.
//!
//! [`OrderService`] is the order orchestrator: it validates an
//! [`OrderRequest`] against the catalog and the coupon registry and only then
//! persists the order, returning an [`EnrichedOrder`]. It owns the error
//! taxonomy in [`OrderError`] that the HTTP boundary turns into status codes.

pub mod error;
pub mod order;

pub use common::{ErrorKind, RequestContext};
pub use error::OrderError;
pub use order::{EnrichedOrder, OrderRequest, OrderService};
