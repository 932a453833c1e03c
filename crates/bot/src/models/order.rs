//! Order domain types: the frozen line-item snapshot and the order itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use packshop_core::{MediaRef, OrderId, OrderStatus, Price, ShippingMethod, UserId};

use crate::models::cart::CartLine;

/// Version tag written into every stored line-item blob.
const SCHEMA_VERSION: u32 = 1;

const fn schema_version() -> u32 {
    SCHEMA_VERSION
}

/// A frozen record of product/pack/quantity/price captured at
/// order-creation time.
///
/// Names are copied, not referenced: deleting the product later must not
/// change what this order says was bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product name at order time.
    pub product: String,
    /// Pack name at order time.
    pub pack: String,
    /// Units contained in one pack at order time.
    pub units_per_pack: i64,
    /// Packs ordered.
    pub quantity: i64,
    /// Price of one pack at order time.
    pub unit_price: Price,
}

impl LineItem {
    /// Subtotal for this item.
    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// The versioned envelope stored in the `orders.items` column.
///
/// Serialized as `{"v":1,"items":[…]}` so the on-disk format can evolve
/// without guessing what an old blob meant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItems {
    #[serde(rename = "v", default = "schema_version")]
    version: u32,
    items: Vec<LineItem>,
}

impl LineItems {
    /// Snapshot the given cart lines into frozen items.
    #[must_use]
    pub fn from_cart(lines: &[CartLine]) -> Self {
        Self {
            version: SCHEMA_VERSION,
            items: lines
                .iter()
                .map(|line| LineItem {
                    product: line.product_name.clone(),
                    pack: line.pack_name.clone(),
                    units_per_pack: line.units_per_pack,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect(),
        }
    }

    /// The frozen items, in cart insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no line items left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all item subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Remove the item at `index`, if it exists.
    pub fn remove(&mut self, index: usize) -> Option<LineItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Serialize for storage.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails (it cannot for
    /// this data shape, but the caller maps it to a corruption error anyway).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a stored blob.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the blob is not a valid line-item
    /// envelope.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// An order: a user, a frozen cart snapshot, and a lifecycle status.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Ordering user.
    pub user_id: UserId,
    /// Frozen line items.
    pub items: LineItems,
    /// Sum of line subtotals, computed at creation (and again on per-item
    /// removal).
    pub total_price: Price,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Payment receipt photo, once uploaded.
    pub receipt_photo: Option<MediaRef>,
    /// Chosen shipping method.
    pub shipping_method: Option<ShippingMethod>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use packshop_core::{CartEntryId, PackId, ProductId};

    use super::*;

    fn line(product: &str, pack: &str, quantity: i64, unit_price: i64) -> CartLine {
        CartLine {
            entry_id: CartEntryId::new(1),
            product_id: ProductId::new(1),
            pack_id: PackId::new(1),
            product_name: product.to_owned(),
            pack_name: pack.to_owned(),
            units_per_pack: 10,
            unit_price: Price::new(unit_price),
            quantity,
        }
    }

    #[test]
    fn snapshot_round_trips_exactly() {
        let items = LineItems::from_cart(&[
            line("Shirt A", "Box-10", 2, 500_000),
            line("Shirt B", "Box-5", 1, 250_000),
        ]);

        let json = items.to_json().expect("serialize");
        let parsed = LineItems::from_json(&json).expect("parse");
        assert_eq!(parsed, items);
        assert_eq!(parsed.total(), Price::new(1_250_000));
    }

    #[test]
    fn stored_blob_carries_version_tag() {
        let items = LineItems::from_cart(&[line("Shirt A", "Box-10", 1, 500_000)]);
        let json = items.to_json().expect("serialize");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["v"], 1);
        assert_eq!(value["items"][0]["product"], "Shirt A");
        assert_eq!(value["items"][0]["unit_price"], 500_000);
    }

    #[test]
    fn remove_recomputes_and_bounds_checks() {
        let mut items = LineItems::from_cart(&[
            line("Shirt A", "Box-10", 2, 500_000),
            line("Shirt B", "Box-5", 1, 250_000),
        ]);

        assert!(items.remove(5).is_none());

        let removed = items.remove(0).expect("index 0 exists");
        assert_eq!(removed.product, "Shirt A");
        assert_eq!(items.len(), 1);
        assert_eq!(items.total(), Price::new(250_000));
    }
}
