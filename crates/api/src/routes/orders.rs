//! Order placement endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use business::{EnrichedOrder, OrderRequest};
use store::{Catalog, CouponRegistry, OrderRepository};

use crate::AppState;
use crate::error::ApiError;

/// POST /api/order
pub async fn create<S>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<EnrichedOrder>, ApiError>
where
    S: Catalog + CouponRegistry + OrderRepository + Clone + 'static,
{
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let ctx = state.request_context();
    let enriched = state.order_service.create_order(&ctx, req).await?;
    Ok(Json(enriched))
}
