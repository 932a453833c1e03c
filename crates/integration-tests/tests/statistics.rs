//! Statistics aggregator: zero defaults and confirmed-only revenue.

use packshop_bot::db::{
    CartRepository, CatalogRepository, OrderRepository, StatsRepository, UserRepository,
};
use packshop_core::{MediaRef, Price, UserId};
use packshop_integration_tests::test_pool;

#[tokio::test]
async fn empty_database_yields_all_zeros() {
    let pool = test_pool().await;
    let stats = StatsRepository::new(&pool).gather().await.expect("gather");

    assert_eq!(stats.total_orders, 0);
    assert_eq!(stats.today_orders, 0);
    assert_eq!(stats.total_income, Price::ZERO);
    assert_eq!(stats.today_income, Price::ZERO);
    assert_eq!(stats.total_users, 0);
    assert_eq!(stats.total_products, 0);
    assert_eq!(stats.pending_orders, 0);
}

#[tokio::test]
async fn revenue_counts_only_confirmed_orders() {
    let pool = test_pool().await;
    let customer = UserId::new(42);

    UserRepository::new(&pool)
        .ensure(customer, None, None)
        .await
        .expect("ensure user");

    let catalog = CatalogRepository::new(&pool);
    let product = catalog
        .create_product("Shirt A", "desc", &MediaRef::new("photo"))
        .await
        .expect("create product");
    let pack = catalog
        .add_pack(product, "Box-10", 10, Price::new(500_000))
        .await
        .expect("add pack");

    let cart = CartRepository::new(&pool);
    let orders = OrderRepository::new(&pool);

    // One order driven all the way to confirmed.
    cart.add(customer, product, pack, 2).await.expect("fill cart");
    let lines = cart.lines(customer).await.expect("cart view");
    let confirmed = orders.create(customer, &lines).await.expect("create");
    cart.clear(customer).await.expect("clear");
    orders.confirm(confirmed).await.expect("confirm");
    orders
        .attach_receipt(confirmed, &MediaRef::new("receipt"))
        .await
        .expect("receipt");
    orders.confirm_payment(confirmed).await.expect("approve");

    // One order left pending.
    cart.add(customer, product, pack, 1).await.expect("fill cart");
    let lines = cart.lines(customer).await.expect("cart view");
    orders.create(customer, &lines).await.expect("create pending");

    let stats = StatsRepository::new(&pool).gather().await.expect("gather");
    assert_eq!(stats.total_orders, 2);
    assert_eq!(stats.today_orders, 2);
    assert_eq!(stats.pending_orders, 1);
    assert_eq!(stats.total_income, Price::new(1_000_000), "pending revenue excluded");
    assert_eq!(stats.today_income, Price::new(1_000_000));
    assert_eq!(stats.total_users, 1);
    assert_eq!(stats.total_products, 1);
}
