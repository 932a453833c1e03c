//! Catalog store: CRUD, cascade, and range checks.

use packshop_bot::db::{CatalogRepository, RepositoryError};
use packshop_core::{MediaRef, Price, ProductId};
use packshop_integration_tests::test_pool;

#[tokio::test]
async fn deleting_a_product_cascades_its_packs() {
    let pool = test_pool().await;
    let catalog = CatalogRepository::new(&pool);

    let product = catalog
        .create_product("Shirt A", "desc", &MediaRef::new("photo"))
        .await
        .expect("create product");
    let pack_a = catalog
        .add_pack(product, "Box-5", 5, Price::new(300_000))
        .await
        .expect("pack a");
    let pack_b = catalog
        .add_pack(product, "Box-10", 10, Price::new(550_000))
        .await
        .expect("pack b");

    catalog.delete_product(product).await.expect("delete product");

    assert!(catalog.product(product).await.expect("query").is_none());
    assert!(catalog.pack(pack_a).await.expect("query").is_none());
    assert!(catalog.pack(pack_b).await.expect("query").is_none());
}

#[tokio::test]
async fn deleting_a_pack_keeps_its_product() {
    let pool = test_pool().await;
    let catalog = CatalogRepository::new(&pool);

    let product = catalog
        .create_product("Shirt A", "desc", &MediaRef::new("photo"))
        .await
        .expect("create product");
    let pack = catalog
        .add_pack(product, "Box-5", 5, Price::new(300_000))
        .await
        .expect("pack");

    catalog.delete_pack(pack).await.expect("delete pack");

    assert!(catalog.pack(pack).await.expect("query").is_none());
    assert!(catalog.product(product).await.expect("query").is_some());
}

#[tokio::test]
async fn products_list_newest_first() {
    let pool = test_pool().await;
    let catalog = CatalogRepository::new(&pool);

    catalog
        .create_product("First", "desc", &MediaRef::new("p1"))
        .await
        .expect("first");
    catalog
        .create_product("Second", "desc", &MediaRef::new("p2"))
        .await
        .expect("second");

    let products = catalog.products().await.expect("list");
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "Second");
    assert_eq!(products[1].name, "First");
}

#[tokio::test]
async fn pack_range_checks() {
    let pool = test_pool().await;
    let catalog = CatalogRepository::new(&pool);

    let product = catalog
        .create_product("Shirt A", "desc", &MediaRef::new("photo"))
        .await
        .expect("create product");

    assert!(matches!(
        catalog.add_pack(product, "Empty", 0, Price::new(100)).await,
        Err(RepositoryError::Constraint(_))
    ));
    assert!(matches!(
        catalog.add_pack(product, "Negative", 5, Price::new(-1)).await,
        Err(RepositoryError::Constraint(_))
    ));
}

#[tokio::test]
async fn adding_a_pack_to_a_missing_product_reports_not_found() {
    let pool = test_pool().await;
    let catalog = CatalogRepository::new(&pool);

    let result = catalog
        .add_pack(ProductId::new(999), "Box", 5, Price::new(100))
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn deleting_missing_rows_reports_not_found() {
    let pool = test_pool().await;
    let catalog = CatalogRepository::new(&pool);

    assert!(matches!(
        catalog.delete_product(ProductId::new(7)).await,
        Err(RepositoryError::NotFound)
    ));
}
