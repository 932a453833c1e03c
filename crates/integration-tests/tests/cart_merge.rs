//! Cart engine: merge semantics and the orphan-exclusion view.

use packshop_bot::db::{CartRepository, CatalogRepository, RepositoryError, UserRepository};
use packshop_core::{MediaRef, PackId, Price, ProductId, UserId};
use packshop_integration_tests::test_pool;
use sqlx::SqlitePool;

const CUSTOMER: UserId = UserId::new(42);

async fn seed_product(pool: &SqlitePool, name: &str) -> (ProductId, PackId) {
    let catalog = CatalogRepository::new(pool);
    let product = catalog
        .create_product(name, "test product", &MediaRef::new("photo"))
        .await
        .expect("create product");
    let pack = catalog
        .add_pack(product, "Box-10", 10, Price::new(500_000))
        .await
        .expect("add pack");
    (product, pack)
}

async fn seed_customer(pool: &SqlitePool) {
    UserRepository::new(pool)
        .ensure(CUSTOMER, Some("customer"), Some("Customer"))
        .await
        .expect("ensure user");
}

#[tokio::test]
async fn repeated_adds_merge_into_one_entry() {
    let pool = test_pool().await;
    seed_customer(&pool).await;
    let (product, pack) = seed_product(&pool, "Shirt A").await;
    let cart = CartRepository::new(&pool);

    cart.add(CUSTOMER, product, pack, 1).await.expect("first add");
    cart.add(CUSTOMER, product, pack, 1).await.expect("second add");
    cart.add(CUSTOMER, product, pack, 3).await.expect("third add");

    let lines = cart.lines(CUSTOMER).await.expect("cart view");
    assert_eq!(lines.len(), 1, "one entry per (user, product, pack)");
    assert_eq!(lines[0].quantity, 5, "quantities sum across adds");
    assert_eq!(lines[0].subtotal(), Price::new(2_500_000));
}

#[tokio::test]
async fn different_packs_get_their_own_entries() {
    let pool = test_pool().await;
    seed_customer(&pool).await;
    let catalog = CatalogRepository::new(&pool);
    let (product, pack_a) = seed_product(&pool, "Shirt A").await;
    let pack_b = catalog
        .add_pack(product, "Box-20", 20, Price::new(900_000))
        .await
        .expect("second pack");

    let cart = CartRepository::new(&pool);
    cart.add(CUSTOMER, product, pack_a, 1).await.expect("add a");
    cart.add(CUSTOMER, product, pack_b, 1).await.expect("add b");

    let lines = cart.lines(CUSTOMER).await.expect("cart view");
    assert_eq!(lines.len(), 2);
    // Insertion order is preserved.
    assert_eq!(lines[0].pack_name, "Box-10");
    assert_eq!(lines[1].pack_name, "Box-20");
}

#[tokio::test]
async fn deleted_catalog_rows_are_excluded_from_the_view() {
    let pool = test_pool().await;
    seed_customer(&pool).await;
    let catalog = CatalogRepository::new(&pool);
    let (product_a, pack_a) = seed_product(&pool, "Shirt A").await;
    let (product_b, pack_b) = seed_product(&pool, "Shirt B").await;

    let cart = CartRepository::new(&pool);
    cart.add(CUSTOMER, product_a, pack_a, 1).await.expect("add a");
    cart.add(CUSTOMER, product_b, pack_b, 1).await.expect("add b");

    catalog.delete_pack(pack_a).await.expect("delete pack");
    let lines = cart.lines(CUSTOMER).await.expect("cart view");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_name, "Shirt B");

    catalog.delete_product(product_b).await.expect("delete product");
    let lines = cart.lines(CUSTOMER).await.expect("cart view");
    assert!(lines.is_empty(), "orphaned entries never surface");
}

#[tokio::test]
async fn adding_a_deleted_pack_reports_not_found() {
    let pool = test_pool().await;
    seed_customer(&pool).await;
    let catalog = CatalogRepository::new(&pool);
    let (product, pack) = seed_product(&pool, "Shirt A").await;
    catalog.delete_pack(pack).await.expect("delete pack");

    let result = CartRepository::new(&pool)
        .add(CUSTOMER, product, pack, 1)
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn non_positive_quantity_is_rejected() {
    let pool = test_pool().await;
    seed_customer(&pool).await;
    let (product, pack) = seed_product(&pool, "Shirt A").await;

    let result = CartRepository::new(&pool)
        .add(CUSTOMER, product, pack, 0)
        .await;
    assert!(matches!(result, Err(RepositoryError::Constraint(_))));
}

#[tokio::test]
async fn remove_and_clear_delete_entries() {
    let pool = test_pool().await;
    seed_customer(&pool).await;
    let catalog = CatalogRepository::new(&pool);
    let (product, pack_a) = seed_product(&pool, "Shirt A").await;
    let pack_b = catalog
        .add_pack(product, "Box-20", 20, Price::new(900_000))
        .await
        .expect("second pack");

    let cart = CartRepository::new(&pool);
    cart.add(CUSTOMER, product, pack_a, 2).await.expect("add a");
    cart.add(CUSTOMER, product, pack_b, 1).await.expect("add b");

    let lines = cart.lines(CUSTOMER).await.expect("cart view");
    assert!(cart.remove(lines[0].entry_id).await.expect("remove"));
    assert_eq!(cart.lines(CUSTOMER).await.expect("cart view").len(), 1);

    // Removing again is a no-op, not an error.
    assert!(!cart.remove(lines[0].entry_id).await.expect("re-remove"));

    cart.clear(CUSTOMER).await.expect("clear");
    assert!(cart.lines(CUSTOMER).await.expect("cart view").is_empty());
}
