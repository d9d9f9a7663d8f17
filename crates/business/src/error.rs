//! Order-creation error types.

use common::ErrorKind;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur while creating an order.
///
/// Rule violations are reported as `Unprocessable`. Store failures are wrapped
/// with the stage that failed and keep the kind of their cause, so a
/// malformed identifier stays `BadRequest` and infrastructure failures,
/// cancellation and deadline expiry are `Internal`.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A line item has a quantity of zero or less.
    #[error("unprocessable entity: quantity must be positive")]
    InvalidQuantity { quantity: i64 },

    /// Some requested products are not in the catalog.
    #[error("unprocessable entity: product ids not found: [{}]", .missing.join(" "))]
    ProductsNotFound { missing: Vec<String> },

    /// The coupon code is not in the registry.
    #[error("unprocessable entity: coupon {code:?} not found")]
    CouponNotFound { code: String },

    #[error("failed to find products: {0}")]
    FindProducts(#[source] StoreError),

    #[error("failed to find one coupon: {0}")]
    FindCoupon(#[source] StoreError),

    #[error("failed to create order: {0}")]
    CreateOrder(#[source] StoreError),
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::InvalidQuantity { .. }
            | OrderError::ProductsNotFound { .. }
            | OrderError::CouponNotFound { .. } => ErrorKind::Unprocessable,
            OrderError::FindProducts(e) | OrderError::FindCoupon(e) | OrderError::CreateOrder(e) => {
                e.kind()
            }
        }
    }

    /// Identifiers the catalog did not know, if that is why the order failed.
    pub fn missing(&self) -> Option<&[String]> {
        match self {
            OrderError::ProductsNotFound { missing } => Some(missing),
            _ => None,
        }
    }

    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            OrderError::InvalidQuantity { .. } => "invalid_quantity",
            OrderError::ProductsNotFound { .. } => "unknown_product",
            OrderError::CouponNotFound { .. } => "unknown_coupon",
            OrderError::FindProducts(_) => "find_products_failed",
            OrderError::FindCoupon(_) => "find_coupon_failed",
            OrderError::CreateOrder(_) => "create_order_failed",
        }
    }
}
