//! Order orchestrator.

use std::time::Instant;

use common::RequestContext;
use store::{Catalog, CouponRegistry, OrderRepository, StoreError};

use super::{EnrichedOrder, OrderRequest};
use crate::error::OrderError;

/// Validates and places orders.
///
/// The workflow runs strictly in sequence: quantities, then the catalog,
/// then the coupon, then persistence. The first failing stage stops the
/// workflow, so nothing is written for a rejected request. The service holds
/// no mutable state and may be shared across concurrent requests.
pub struct OrderService<C, R, O>
where
    C: Catalog,
    R: CouponRegistry,
    O: OrderRepository,
{
    catalog: C,
    coupons: R,
    orders: O,
}

impl<C, R, O> OrderService<C, R, O>
where
    C: Catalog,
    R: CouponRegistry,
    O: OrderRepository,
{
    /// Creates a new order service over the given capabilities.
    pub fn new(catalog: C, coupons: R, orders: O) -> Self {
        Self {
            catalog,
            coupons,
            orders,
        }
    }

    /// Creates an order from `req`.
    ///
    /// Not idempotent: two identical valid requests produce two orders.
    #[tracing::instrument(skip(self, ctx, req), fields(items = req.items.len(), coupon = req.has_coupon()))]
    pub async fn create_order(
        &self,
        ctx: &RequestContext,
        req: OrderRequest,
    ) -> Result<EnrichedOrder, OrderError> {
        let started = Instant::now();
        let result = self.place(ctx, &req).await;
        metrics::histogram!("order_create_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        match &result {
            Ok(enriched) => {
                metrics::counter!("orders_created_total").increment(1);
                tracing::info!(order_id = %enriched.order.id, "order created");
            }
            Err(e) => {
                metrics::counter!("orders_rejected_total", "reason" => e.reason()).increment(1);
                tracing::warn!(error = %e, kind = %e.kind(), "order rejected");
            }
        }
        result
    }

    async fn place(
        &self,
        ctx: &RequestContext,
        req: &OrderRequest,
    ) -> Result<EnrichedOrder, OrderError> {
        // 1. Every quantity must be positive
        if let Some(item) = req.items.iter().find(|i| i.quantity <= 0) {
            return Err(OrderError::InvalidQuantity {
                quantity: item.quantity,
            });
        }

        // 2. Every product must exist
        let lookup = self
            .catalog
            .find_products(ctx, &req.product_ids())
            .await
            .map_err(OrderError::FindProducts)?;
        if !lookup.is_complete() {
            return Err(OrderError::ProductsNotFound {
                missing: lookup.missing,
            });
        }

        // 3. The coupon, if any, must exist
        if req.has_coupon() {
            match self.coupons.find_one_coupon(ctx, &req.coupon_code).await {
                Ok(_) => {}
                Err(StoreError::NotFound { .. }) => {
                    return Err(OrderError::CouponNotFound {
                        code: req.coupon_code.clone(),
                    });
                }
                Err(e) => return Err(OrderError::FindCoupon(e)),
            }
        }

        // 4. Persist
        let order = self
            .orders
            .create_order(ctx, &req.items)
            .await
            .map_err(OrderError::CreateOrder)?;

        Ok(EnrichedOrder {
            order,
            products: lookup.found,
        })
    }
}
