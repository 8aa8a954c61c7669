//! Cart line items shared between the local cart store and the sync client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ColorId, ProductId};

/// Composite key identifying a cart line: one product in one color variant.
pub type LineKey = (ProductId, Option<ColorId>);

/// One line of an anonymous (locally persisted) cart.
///
/// Serialized with camelCase field names (`productId`, `colorId`, `quantity`,
/// `addedAt`) to match the wire and storage format. There is no version
/// field: unknown fields are ignored on read, a missing `colorId` means "no
/// variant selected", and a missing `addedAt` is tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product identifier.
    pub product_id: ProductId,
    /// Variant identifier; `None` means no variant selected.
    #[serde(default)]
    pub color_id: Option<ColorId>,
    /// Units of this line.
    pub quantity: u32,
    /// Timestamp of first insertion. Informational only: not used for
    /// ordering guarantees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl CartLineItem {
    /// The `(product, color)` key this line is unique by within a cart.
    #[must_use]
    pub const fn key(&self) -> LineKey {
        (self.product_id, self.color_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_line() {
        // Missing colorId and addedAt must both be tolerated.
        let line: CartLineItem =
            serde_json::from_str(r#"{"productId": 5, "quantity": 2}"#).expect("deserialize");
        assert_eq!(line.product_id, ProductId::new(5));
        assert_eq!(line.color_id, None);
        assert_eq!(line.quantity, 2);
        assert_eq!(line.added_at, None);
    }

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        let line: CartLineItem = serde_json::from_str(
            r#"{"productId": 5, "colorId": 3, "quantity": 1, "flashSale": true}"#,
        )
        .expect("deserialize");
        assert_eq!(line.key(), (ProductId::new(5), Some(ColorId::new(3))));
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let line = CartLineItem {
            product_id: ProductId::new(9),
            color_id: None,
            quantity: 4,
            added_at: None,
        };
        let json = serde_json::to_string(&line).expect("serialize");
        assert_eq!(json, r#"{"productId":9,"colorId":null,"quantity":4}"#);
    }
}
