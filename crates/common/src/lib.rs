//! Shared vocabulary for the kart order backend.
//!
//! - [`ObjectId`]: the fixed-width 12-byte identifier used for products and orders
//! - [`ErrorKind`]: the four-way error classification the HTTP boundary maps to status codes
//! - [`RequestContext`]: per-request cancellation and deadline threaded through every store call

pub mod context;
pub mod error;
pub mod object_id;

pub use context::{Interrupted, RequestContext};
pub use error::ErrorKind;
pub use object_id::{InvalidObjectId, ObjectId};
