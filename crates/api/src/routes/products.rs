//! Catalog read endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use store::{Catalog, CouponRegistry, OrderRepository, Product};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Requested page; missing or non-numeric values mean the first page.
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }
}

/// GET /api/product?page=N
pub async fn list<S>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Product>>, ApiError>
where
    S: Catalog + CouponRegistry + OrderRepository + Clone + 'static,
{
    let ctx = state.request_context();
    let products = state.store.list_products(&ctx, query.page()).await?;
    Ok(Json(products))
}

/// GET /api/product/{id}
pub async fn get<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError>
where
    S: Catalog + CouponRegistry + OrderRepository + Clone + 'static,
{
    let ctx = state.request_context();
    let product = state.store.get_product(&ctx, &id).await?;
    Ok(Json(product))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(str::to_string),
        }
    }

    #[test]
    fn page_falls_back_to_first() {
        assert_eq!(query(None).page(), 1);
        assert_eq!(query(Some("abc")).page(), 1);
        assert_eq!(query(Some("-2")).page(), 1);
        assert_eq!(query(Some("3")).page(), 3);
    }
}
