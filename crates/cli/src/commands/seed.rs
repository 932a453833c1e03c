//! Catalog seeding command for manual testing.

use packshop_core::{MediaRef, Price};

use packshop_bot::db::CatalogRepository;

use super::CommandError;

/// Insert a demo product with three packs.
///
/// # Errors
///
/// Returns `CommandError` if the database URL is missing or any insert
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;
    let pool = packshop_bot::db::create_pool(&database_url).await?;

    let catalog = CatalogRepository::new(&pool);

    let product_id = catalog
        .create_product(
            "Classic Shirt",
            "Plain cotton shirt, assorted colors.",
            &MediaRef::new("seed-photo-classic-shirt"),
        )
        .await?;

    for (name, quantity, price) in [
        ("Box of 5", 5, 300_000),
        ("Box of 10", 10, 550_000),
        ("Box of 20", 20, 1_000_000),
    ] {
        catalog
            .add_pack(product_id, name, quantity, Price::new(price))
            .await?;
    }

    tracing::info!(%product_id, "Seeded demo product with 3 packs");
    Ok(())
}
