//! Application state shared across update handlers.

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;

use packshop_core::UserId;

use crate::config::BotConfig;
use crate::sessions::Flow;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration, the connection
/// pool, and the per-user conversation flow map.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BotConfig,
    pool: SqlitePool,
    /// At most one in-flight conversation flow per user. Setting a new flow
    /// replaces (and thereby discards) the previous one, partial input
    /// included.
    flows: Mutex<HashMap<UserId, Flow>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: BotConfig, pool: SqlitePool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                flows: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Get a reference to the bot configuration.
    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Remove and return the user's in-flight flow, if any.
    pub async fn take_flow(&self, user: UserId) -> Option<Flow> {
        self.inner.flows.lock().await.remove(&user)
    }

    /// Install a flow for the user, replacing any previous one.
    pub async fn set_flow(&self, user: UserId, flow: Flow) {
        self.inner.flows.lock().await.insert(user, flow);
    }

    /// Drop the user's flow without looking at it.
    pub async fn clear_flow(&self, user: UserId) {
        self.inner.flows.lock().await.remove(&user);
    }
}
