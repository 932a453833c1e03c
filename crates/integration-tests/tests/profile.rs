//! User profile store: idempotent creation and field-wise updates.

use packshop_bot::db::{RepositoryError, UserRepository};
use packshop_bot::models::ProfilePatch;
use packshop_core::UserId;
use packshop_integration_tests::test_pool;

const CUSTOMER: UserId = UserId::new(42);

#[tokio::test]
async fn ensure_is_idempotent() {
    let pool = test_pool().await;
    let users = UserRepository::new(&pool);

    users
        .ensure(CUSTOMER, Some("first_username"), Some("First"))
        .await
        .expect("first contact");
    users
        .ensure(CUSTOMER, Some("changed_username"), Some("Changed"))
        .await
        .expect("repeat contact");

    let user = users.get(CUSTOMER).await.expect("query").expect("exists");
    assert_eq!(user.username.as_deref(), Some("first_username"));
    assert_eq!(user.first_name.as_deref(), Some("First"));
}

#[tokio::test]
async fn partial_update_keeps_absent_fields() {
    let pool = test_pool().await;
    let users = UserRepository::new(&pool);
    users
        .ensure(CUSTOMER, None, None)
        .await
        .expect("ensure");

    users
        .update_profile(
            CUSTOMER,
            &ProfilePatch {
                full_name: Some("Erfan Ahmadi".to_owned()),
                address: Some("12 Bazaar Lane".to_owned()),
                phone: Some("09121234567".to_owned()),
                ..ProfilePatch::default()
            },
        )
        .await
        .expect("full update");

    // A later update that only carries a phone number must not touch the
    // rest, and an empty string must not blank anything.
    users
        .update_profile(
            CUSTOMER,
            &ProfilePatch {
                phone: Some("09999999999".to_owned()),
                full_name: Some(String::new()),
                ..ProfilePatch::default()
            },
        )
        .await
        .expect("partial update");

    let user = users.get(CUSTOMER).await.expect("query").expect("exists");
    assert_eq!(user.full_name.as_deref(), Some("Erfan Ahmadi"));
    assert_eq!(user.address.as_deref(), Some("12 Bazaar Lane"));
    assert_eq!(user.phone.as_deref(), Some("09999999999"));
}

#[tokio::test]
async fn updating_a_missing_user_reports_not_found() {
    let pool = test_pool().await;
    let users = UserRepository::new(&pool);

    let result = users
        .update_profile(
            UserId::new(9999),
            &ProfilePatch {
                phone: Some("09121234567".to_owned()),
                ..ProfilePatch::default()
            },
        )
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}
