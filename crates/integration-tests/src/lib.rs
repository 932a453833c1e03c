//! Shared helpers for Packshop integration tests.
//!
//! Every test runs against its own in-memory SQLite database. The pool is
//! pinned to a single connection (with timeouts disabled) because an
//! in-memory database lives and dies with its connection.

use std::str::FromStr;
use std::sync::Mutex;

use secrecy::SecretString;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use packshop_bot::config::BotConfig;
use packshop_bot::sessions::{ChatUser, Update, UpdatePayload};
use packshop_bot::state::AppState;
use packshop_bot::transport::{ChatTransport, OutboundMessage, TransportError};
use packshop_core::{MediaRef, UserId};

/// The admin chat ID every test configuration uses.
pub const ADMIN_ID: i64 = 1;

/// Create a migrated in-memory database.
///
/// # Panics
///
/// Panics if the pool cannot be created or migrations fail; tests cannot
/// proceed without a database.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("in-memory pool");

    sqlx::migrate!("../bot/migrations")
        .run(&pool)
        .await
        .expect("migrations apply");

    pool
}

/// Application state over a fresh in-memory database, with the test admin
/// and a broadcast channel configured.
pub async fn test_state() -> AppState {
    let pool = test_pool().await;
    let config = BotConfig {
        bot_token: SecretString::from("test-token"),
        admin_id: UserId::new(ADMIN_ID),
        database_url: "sqlite::memory:".to_owned(),
        channel: Some("@packshop-test".to_owned()),
        contact: None,
    };
    AppState::new(config, pool)
}

/// A text update from the given user.
#[must_use]
pub fn text_update(user: i64, text: &str) -> Update {
    Update {
        from: chat_user(user),
        payload: UpdatePayload::Text(text.to_owned()),
    }
}

/// A callback (button press) update from the given user.
#[must_use]
pub fn callback_update(user: i64, data: &str) -> Update {
    Update {
        from: chat_user(user),
        payload: UpdatePayload::Callback(data.to_owned()),
    }
}

/// A photo update from the given user.
#[must_use]
pub fn photo_update(user: i64, media: &str) -> Update {
    Update {
        from: chat_user(user),
        payload: UpdatePayload::Photo(MediaRef::new(media)),
    }
}

fn chat_user(id: i64) -> ChatUser {
    ChatUser {
        id: UserId::new(id),
        username: Some(format!("user{id}")),
        first_name: Some(format!("User {id}")),
    }
}

/// The text of a message, whether it is a plain text or a photo caption.
#[must_use]
pub fn body_text(message: &OutboundMessage) -> &str {
    match &message.body {
        packshop_bot::transport::MessageBody::Text(text) => text,
        packshop_bot::transport::MessageBody::Photo { caption, .. } => caption,
    }
}

/// A transport that records what it was asked to deliver, optionally
/// failing every send.
#[derive(Default)]
pub struct RecordingTransport {
    delivered: Mutex<Vec<OutboundMessage>>,
    pub fail: bool,
}

impl RecordingTransport {
    /// A transport whose every delivery fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Everything delivered so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.delivered.lock().expect("transport lock").clone()
    }
}

impl ChatTransport for RecordingTransport {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::Delivery("test transport set to fail".to_owned()));
        }
        self.delivered
            .lock()
            .expect("transport lock")
            .push(message.clone());
        Ok(())
    }
}
