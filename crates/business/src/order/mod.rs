//! Order placement: request and response shapes plus the orchestrator.

mod service;

use serde::{Deserialize, Serialize};
use store::{ItemRequest, Order, Product};

pub use service::OrderService;

/// An order as submitted by a client.
///
/// An absent or empty `couponCode` means no coupon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default)]
    pub items: Vec<ItemRequest>,
    #[serde(default)]
    pub coupon_code: String,
}

impl OrderRequest {
    pub fn new(items: Vec<ItemRequest>) -> Self {
        Self {
            items,
            coupon_code: String::new(),
        }
    }

    pub fn with_coupon(mut self, code: impl Into<String>) -> Self {
        self.coupon_code = code.into();
        self
    }

    /// Product identifiers in request order, duplicates included.
    pub fn product_ids(&self) -> Vec<String> {
        self.items.iter().map(|i| i.product_id.clone()).collect()
    }

    pub fn has_coupon(&self) -> bool {
        !self.coupon_code.is_empty()
    }
}

/// A persisted order together with the catalog records it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub products: Vec<Product>,
}

#[cfg(test)]
mod tests {
    use common::ObjectId;
    use store::OrderItem;

    use super::*;

    #[test]
    fn request_without_coupon_defaults_to_empty() {
        let req: OrderRequest = serde_json::from_str(
            r#"{"items":[{"productId":"0102030405060708090a0b0c","quantity":1}]}"#,
        )
        .unwrap();
        assert!(!req.has_coupon());
        assert_eq!(req.product_ids(), vec!["0102030405060708090a0b0c"]);
    }

    #[test]
    fn enriched_order_flattens_order_fields() {
        let product = Product {
            id: ObjectId::from_bytes([1; 12]),
            category: "Waffle".to_string(),
            name: "Berry Waffle".to_string(),
            price: 6.5,
        };
        let enriched = EnrichedOrder {
            order: Order {
                id: ObjectId::from_bytes([2; 12]),
                items: vec![OrderItem {
                    product_id: product.id,
                    quantity: 2,
                }],
            },
            products: vec![product],
        };

        let json = serde_json::to_value(&enriched).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "020202020202020202020202",
                "items": [{"productId": "010101010101010101010101", "quantity": 2}],
                "products": [{
                    "id": "010101010101010101010101",
                    "category": "Waffle",
                    "name": "Berry Waffle",
                    "price": 6.5
                }]
            })
        );
    }
}
