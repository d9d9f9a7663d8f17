//! Records owned by the stores.

use common::ObjectId;
use serde::{Deserialize, Serialize};

/// Number of products returned per catalog page.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Returns the number of products to skip for a 1-based `page`.
///
/// Pages below 1 are treated as page 1.
pub fn page_offset(page: u32) -> u64 {
    u64::from(page.max(1) - 1) * u64::from(DEFAULT_PER_PAGE)
}

/// A catalog entry. Read-only from the order workflow's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ObjectId,
    pub category: String,
    pub name: String,
    pub price: f64,
}

impl Product {
    pub fn new(category: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: ObjectId::new(),
            category: category.into(),
            name: name.into(),
            price,
        }
    }
}

/// A promotional code. Existence is the whole contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
}

impl Coupon {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// A line item as submitted by a client, before identifier parsing.
///
/// Absent fields decode as empty / zero and are rejected by validation
/// rather than by decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub quantity: i64,
}

impl ItemRequest {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A persisted line item. `quantity` is always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ObjectId,
    pub quantity: i64,
}

impl OrderItem {
    /// Parses the product identifier of a submitted line item.
    pub fn from_request(item: &ItemRequest) -> crate::Result<Self> {
        Ok(Self {
            product_id: ObjectId::parse_str(&item.product_id)?,
            quantity: item.quantity,
        })
    }
}

/// A persisted order. The identifier is assigned by the store at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: ObjectId,
    pub items: Vec<OrderItem>,
}

/// Outcome of a batch catalog resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductLookup {
    /// Requested identifiers absent from the catalog, each listed once.
    pub missing: Vec<String>,
    /// Catalog records for the identifiers that were found.
    pub found: Vec<Product>,
}

impl ProductLookup {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Parses every requested identifier, failing on the first malformed one.
pub(crate) fn parse_ids(ids: &[String]) -> crate::Result<Vec<ObjectId>> {
    ids.iter()
        .map(|id| ObjectId::parse_str(id).map_err(Into::into))
        .collect()
}

/// Lists each identifier from `requested` that is not in `found`, once, in request order.
pub(crate) fn missing_ids(requested: &[ObjectId], found: &[Product]) -> Vec<String> {
    let mut missing: Vec<ObjectId> = Vec::new();
    for id in requested {
        if !found.iter().any(|p| p.id == *id) && !missing.contains(id) {
            missing.push(*id);
        }
    }
    missing.iter().map(ObjectId::to_hex).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset_clamps_to_first_page() {
        assert_eq!(page_offset(0), 0);
        assert_eq!(page_offset(1), 0);
        assert_eq!(page_offset(3), 40);
    }

    #[test]
    fn item_request_uses_camel_case() {
        let item: ItemRequest =
            serde_json::from_str(r#"{"productId":"65a1b2c3d4e5f60718293a4b","quantity":2}"#)
                .unwrap();
        assert_eq!(item, ItemRequest::new("65a1b2c3d4e5f60718293a4b", 2));
    }

    #[test]
    fn item_request_missing_fields_default() {
        let item: ItemRequest =
            serde_json::from_str(r#"{"productId":"65a1b2c3d4e5f60718293a4b"}"#).unwrap();
        assert_eq!(item.quantity, 0);

        let item: ItemRequest = serde_json::from_str(r#"{"quantity":3}"#).unwrap();
        assert_eq!(item.product_id, "");
    }

    #[test]
    fn order_serializes_with_hex_ids() {
        let product_id = ObjectId::from_bytes([1; 12]);
        let order = Order {
            id: ObjectId::from_bytes([2; 12]),
            items: vec![OrderItem {
                product_id,
                quantity: 3,
            }],
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "020202020202020202020202",
                "items": [{"productId": "010101010101010101010101", "quantity": 3}]
            })
        );
    }

    #[test]
    fn missing_ids_ignores_duplicates() {
        let present = Product::new("Waffle", "Berry Waffle", 6.5);
        let absent = ObjectId::new();
        let requested = vec![present.id, absent, present.id, absent];

        let missing = missing_ids(&requested, std::slice::from_ref(&present));
        assert_eq!(missing, vec![absent.to_hex()]);
    }

    #[test]
    fn parse_ids_rejects_malformed() {
        let err = parse_ids(&["not-a-hex".to_string()]).unwrap_err();
        assert_eq!(err.kind(), common::ErrorKind::BadRequest);
    }
}
