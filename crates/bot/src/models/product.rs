//! Catalog domain types.

use chrono::{DateTime, Utc};

use packshop_core::{MediaRef, PackId, Price, ProductId};

/// A catalog product.
///
/// A product is only browsable through its packs; it carries the photo and
/// description shown in the public channel listing.
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Free-text description shown under the photo.
    pub description: String,
    /// Transport-hosted product photo.
    pub photo: MediaRef,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

/// A purchasable bundle of a fixed quantity of one product at one price.
#[derive(Debug, Clone)]
pub struct Pack {
    /// Unique pack ID.
    pub id: PackId,
    /// Owning product.
    pub product_id: ProductId,
    /// Display name (e.g. "Box of 10").
    pub name: String,
    /// Units per pack.
    pub quantity: i64,
    /// Price per pack.
    pub price: Price,
}
