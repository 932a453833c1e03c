//! Cart domain types.

use packshop_core::{CartEntryId, PackId, Price, ProductId};

/// One cart entry joined with its product and pack, ready for display.
///
/// Entries whose product or pack has been deleted from the catalog do not
/// appear in this view at all; the repository join excludes them.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// ID of the cart entry itself (used by the per-line remove button).
    pub entry_id: CartEntryId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Referenced pack.
    pub pack_id: PackId,
    /// Product display name.
    pub product_name: String,
    /// Pack display name.
    pub pack_name: String,
    /// Units contained in one pack.
    pub units_per_pack: i64,
    /// Price of one pack.
    pub unit_price: Price,
    /// How many packs of this kind are in the cart.
    pub quantity: i64,
}

impl CartLine {
    /// Subtotal for this line.
    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}
