//! End-to-end flows through the dispatcher: admin wizards, customer
//! checkout, receipt review, and the transport boundary.

use packshop_bot::db::{CartRepository, CatalogRepository, OrderRepository, UserRepository};
use packshop_bot::keyboards::menu;
use packshop_bot::sessions::{handle_update, run_update};
use packshop_bot::transport::{ChatTarget, Keyboard, OutboundMessage};
use packshop_core::{MediaRef, OrderStatus, PackId, Price, ProductId, ShippingMethod, UserId};
use packshop_integration_tests::{
    ADMIN_ID, RecordingTransport, body_text, callback_update, photo_update, test_state, text_update,
};

const CUSTOMER: i64 = 42;

fn keyboard_data(message: &OutboundMessage) -> Vec<String> {
    match &message.keyboard {
        Some(Keyboard::Inline(rows)) => rows
            .iter()
            .flatten()
            .map(|button| button.data.clone())
            .collect(),
        _ => Vec::new(),
    }
}

fn target_user(message: &OutboundMessage) -> Option<UserId> {
    match &message.target {
        ChatTarget::User(user) => Some(*user),
        ChatTarget::Channel(_) => None,
    }
}

async fn seed_catalog(state: &packshop_bot::AppState) -> (ProductId, PackId) {
    let catalog = CatalogRepository::new(state.pool());
    let product = catalog
        .create_product("Shirt A", "Plain cotton shirt.", &MediaRef::new("photo-a"))
        .await
        .expect("create product");
    let pack = catalog
        .add_pack(product, "Box-10", 10, Price::new(500_000))
        .await
        .expect("add pack");
    (product, pack)
}

#[tokio::test]
async fn admin_wizards_create_product_and_pack() {
    let state = test_state().await;

    // Add-product wizard: name, description, photo.
    let replies = handle_update(&state, text_update(ADMIN_ID, menu::ADD_PRODUCT)).await;
    assert!(body_text(&replies[0]).contains("Product name?"));

    let replies = handle_update(&state, text_update(ADMIN_ID, "Classic Shirt")).await;
    assert!(body_text(&replies[0]).contains("description"));

    // A photo in the middle of a text step is rejected, not absorbed.
    let replies = handle_update(&state, photo_update(ADMIN_ID, "too-early")).await;
    assert!(body_text(&replies[0]).contains("Finish the current step"));

    let replies = handle_update(&state, text_update(ADMIN_ID, "Soft cotton.")).await;
    assert!(body_text(&replies[0]).contains("photo"));

    let replies = handle_update(&state, photo_update(ADMIN_ID, "photo-classic")).await;
    assert!(body_text(&replies[0]).contains("created ✅"));

    let products = CatalogRepository::new(state.pool())
        .products()
        .await
        .expect("list products");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Classic Shirt");
    let product_id = products[0].id;

    // Add-pack wizard, with a numeric re-prompt along the way.
    let replies =
        handle_update(&state, callback_update(ADMIN_ID, &format!("add_pack:{product_id}"))).await;
    assert!(body_text(&replies[0]).contains("Pack name?"));

    handle_update(&state, text_update(ADMIN_ID, "Box of 10")).await;
    let replies = handle_update(&state, text_update(ADMIN_ID, "ten")).await;
    assert!(body_text(&replies[0]).contains("positive whole number"));

    handle_update(&state, text_update(ADMIN_ID, "10")).await;
    let replies = handle_update(&state, text_update(ADMIN_ID, "500,000")).await;
    assert!(body_text(&replies[0]).contains("added"));

    let packs = CatalogRepository::new(state.pool())
        .packs(product_id)
        .await
        .expect("list packs");
    assert_eq!(packs.len(), 1);
    assert_eq!(packs[0].quantity, 10);
    assert_eq!(packs[0].price, Price::new(500_000));
}

#[tokio::test]
async fn admin_cancel_aborts_a_wizard() {
    let state = test_state().await;

    handle_update(&state, text_update(ADMIN_ID, menu::ADD_PRODUCT)).await;
    handle_update(&state, text_update(ADMIN_ID, "Half-entered product")).await;
    let replies = handle_update(&state, text_update(ADMIN_ID, menu::CANCEL)).await;
    assert!(body_text(&replies[0]).contains("Cancelled"));

    let products = CatalogRepository::new(state.pool())
        .products()
        .await
        .expect("list products");
    assert!(products.is_empty(), "nothing was written");
}

#[tokio::test]
async fn publish_broadcasts_to_the_channel() {
    let state = test_state().await;
    let (product, _pack) = seed_catalog(&state).await;

    let replies = handle_update(
        &state,
        callback_update(ADMIN_ID, &format!("send_to_channel:{product}")),
    )
    .await;

    assert_eq!(
        replies[0].target,
        ChatTarget::Channel("@packshop-test".to_owned())
    );
    assert!(
        keyboard_data(&replies[0])
            .iter()
            .any(|data| data.starts_with("select_pack:")),
        "channel post carries pack buttons"
    );
    assert!(body_text(&replies[1]).contains("Published"));
}

#[tokio::test]
async fn checkout_end_to_end() {
    let state = test_state().await;
    let (product, pack) = seed_catalog(&state).await;

    // Two taps on the channel button merge into one cart line.
    let select = format!("select_pack:{product}:{pack}");
    let replies = handle_update(&state, callback_update(CUSTOMER, &select)).await;
    assert!(body_text(&replies[0]).contains("Added to cart"));
    handle_update(&state, callback_update(CUSTOMER, &select)).await;

    let replies = handle_update(&state, text_update(CUSTOMER, menu::CART)).await;
    let cart_view = body_text(&replies[0]);
    assert!(cart_view.contains("Shirt A"));
    assert!(cart_view.contains("×2"));
    assert!(cart_view.contains("Total: 1,000,000"));

    // Finalize: the collector walks name, address, phone - with a bad phone
    // re-prompting the same step.
    let replies = handle_update(&state, callback_update(CUSTOMER, "finalize_order")).await;
    assert!(body_text(&replies[0]).contains("full name"));

    handle_update(&state, text_update(CUSTOMER, "Erfan Ahmadi")).await;
    handle_update(&state, text_update(CUSTOMER, "12 Bazaar Lane, Tehran")).await;
    let replies = handle_update(&state, text_update(CUSTOMER, "not-a-phone")).await;
    assert!(body_text(&replies[0]).contains("phone"));

    let replies = handle_update(&state, text_update(CUSTOMER, "+989121234567")).await;
    assert!(body_text(&replies[0]).contains("confirm your details"));
    assert!(body_text(&replies[0]).contains("Erfan Ahmadi"));

    let replies = handle_update(&state, callback_update(CUSTOMER, "confirm_user_info")).await;
    assert!(body_text(&replies[0]).contains("shipping method"));

    let replies = handle_update(&state, callback_update(CUSTOMER, "ship_cargo")).await;
    let preview = body_text(&replies[0]);
    assert!(preview.contains("Invoice preview"));
    assert!(preview.contains("Cargo"));
    assert!(preview.contains("Erfan Ahmadi"));

    let replies = handle_update(&state, callback_update(CUSTOMER, "final_confirm")).await;
    assert_eq!(replies.len(), 2);
    assert_eq!(target_user(&replies[0]), Some(UserId::new(CUSTOMER)));
    assert!(body_text(&replies[0]).contains("submitted"));
    assert_eq!(target_user(&replies[1]), Some(UserId::new(ADMIN_ID)));

    // The order exists, pending, with the chosen shipping; the cart is gone.
    let orders = OrderRepository::new(state.pool());
    let placed = orders
        .orders_for_user(UserId::new(CUSTOMER))
        .await
        .expect("orders");
    assert_eq!(placed.len(), 1);
    let order = &placed[0];
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.shipping_method, Some(ShippingMethod::Cargo));
    assert_eq!(order.total_price, Price::new(1_000_000));
    assert!(
        CartRepository::new(state.pool())
            .lines(UserId::new(CUSTOMER))
            .await
            .expect("cart view")
            .is_empty()
    );
    assert!(
        keyboard_data(&replies[1]).contains(&format!("confirm_order:{}", order.id)),
        "admin notification carries review buttons"
    );

    // Admin approves; customer is told to pay.
    let replies = handle_update(
        &state,
        callback_update(ADMIN_ID, &format!("confirm_order:{}", order.id)),
    )
    .await;
    assert!(body_text(&replies[1]).contains("approved"));
    assert_eq!(target_user(&replies[1]), Some(UserId::new(CUSTOMER)));

    // A second press of the same button is a polite no-op.
    let replies = handle_update(
        &state,
        callback_update(ADMIN_ID, &format!("confirm_order:{}", order.id)),
    )
    .await;
    assert!(body_text(&replies[0]).contains("no longer available"));

    // Customer uploads a receipt; the admin gets it with review buttons.
    let replies = handle_update(&state, photo_update(CUSTOMER, "receipt-photo")).await;
    assert!(body_text(&replies[0]).contains("Receipt"));
    assert_eq!(target_user(&replies[1]), Some(UserId::new(ADMIN_ID)));
    assert!(
        keyboard_data(&replies[1]).contains(&format!("confirm_payment:{}", order.id))
    );
    assert_eq!(
        orders.get(order.id).await.expect("get").status,
        OrderStatus::ReceiptSent
    );

    // Admin approves the payment; the order is done.
    let replies = handle_update(
        &state,
        callback_update(ADMIN_ID, &format!("confirm_payment:{}", order.id)),
    )
    .await;
    assert!(body_text(&replies[1]).contains("Payment received"));
    assert_eq!(
        orders.get(order.id).await.expect("get").status,
        OrderStatus::Confirmed
    );
}

#[tokio::test]
async fn collector_cancel_leaves_no_partial_writes() {
    let state = test_state().await;
    let (product, pack) = seed_catalog(&state).await;

    handle_update(
        &state,
        callback_update(CUSTOMER, &format!("select_pack:{product}:{pack}")),
    )
    .await;
    handle_update(&state, callback_update(CUSTOMER, "finalize_order")).await;
    handle_update(&state, text_update(CUSTOMER, "Half Entered")).await;
    handle_update(&state, text_update(CUSTOMER, menu::CANCEL)).await;

    let user = UserRepository::new(state.pool())
        .get(UserId::new(CUSTOMER))
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(user.full_name, None, "nothing committed before the final step");

    // And the abandoned collector is really gone: plain text now hits the menu.
    let replies = handle_update(&state, text_update(CUSTOMER, "hello")).await;
    assert!(body_text(&replies[0]).contains("menu"));
}

#[tokio::test]
async fn starting_a_new_collector_discards_the_previous_one() {
    let state = test_state().await;
    let (product, pack) = seed_catalog(&state).await;

    handle_update(
        &state,
        callback_update(CUSTOMER, &format!("select_pack:{product}:{pack}")),
    )
    .await;
    handle_update(&state, callback_update(CUSTOMER, "finalize_order")).await;
    handle_update(&state, text_update(CUSTOMER, "From The First Form")).await;

    // Restart through the standalone address editor.
    handle_update(&state, callback_update(CUSTOMER, "edit_address")).await;
    handle_update(&state, text_update(CUSTOMER, "From The Second Form")).await;
    handle_update(&state, text_update(CUSTOMER, "5 New Street")).await;
    handle_update(&state, text_update(CUSTOMER, "09121234567")).await;

    let user = UserRepository::new(state.pool())
        .get(UserId::new(CUSTOMER))
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(user.full_name.as_deref(), Some("From The Second Form"));
    assert_eq!(user.address.as_deref(), Some("5 New Street"));
}

#[tokio::test]
async fn stale_and_malformed_presses_degrade_politely() {
    let state = test_state().await;

    let replies = handle_update(&state, callback_update(CUSTOMER, "final_confirm")).await;
    assert!(body_text(&replies[0]).contains("finalize again"));

    let replies = handle_update(&state, callback_update(CUSTOMER, "garbage:data")).await;
    assert!(body_text(&replies[0]).contains("Unknown action"));

    let replies = handle_update(&state, photo_update(CUSTOMER, "unsolicited")).await;
    assert!(body_text(&replies[0]).contains("no order awaiting payment"));
}

#[tokio::test]
async fn run_update_survives_a_failing_transport() {
    let state = test_state().await;
    let (product, pack) = seed_catalog(&state).await;

    let broken = RecordingTransport::failing();
    run_update(
        &state,
        &broken,
        callback_update(CUSTOMER, &format!("select_pack:{product}:{pack}")),
    )
    .await;

    // Delivery failed, but the state mutation had already committed.
    let lines = CartRepository::new(state.pool())
        .lines(UserId::new(CUSTOMER))
        .await
        .expect("cart view");
    assert_eq!(lines.len(), 1);

    let working = RecordingTransport::default();
    run_update(&state, &working, text_update(CUSTOMER, menu::CART)).await;
    let delivered = working.messages();
    assert_eq!(delivered.len(), 1);
    assert!(body_text(&delivered[0]).contains("Your cart"));
}
