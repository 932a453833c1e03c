//! Read-only statistics rollups.

use sqlx::SqlitePool;

use packshop_core::Price;

use super::RepositoryError;

/// Shop-wide counters and revenue sums.
///
/// Every field is zero on an empty database; nothing here is nullable.
/// "Today" means the server-local calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Orders ever created.
    pub total_orders: i64,
    /// Orders created today.
    pub today_orders: i64,
    /// Revenue across all `confirmed` orders.
    pub total_income: Price,
    /// Revenue across `confirmed` orders created today.
    pub today_income: Price,
    /// Users ever seen.
    pub total_users: i64,
    /// Products currently in the catalog.
    pub total_products: i64,
    /// Orders currently awaiting triage.
    pub pending_orders: i64,
}

/// Repository for statistics queries. Writes nothing.
pub struct StatsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StatsRepository<'a> {
    /// Create a new statistics repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Gather all rollups.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn gather(&self) -> Result<Statistics, RepositoryError> {
        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;

        let today_orders: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders
             WHERE DATE(created_at, 'localtime') = DATE('now', 'localtime')",
        )
        .fetch_one(self.pool)
        .await?;

        let total_income: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_price), 0) FROM orders WHERE status = 'confirmed'",
        )
        .fetch_one(self.pool)
        .await?;

        let today_income: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_price), 0) FROM orders
             WHERE status = 'confirmed'
               AND DATE(created_at, 'localtime') = DATE('now', 'localtime')",
        )
        .fetch_one(self.pool)
        .await?;

        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;

        let pending_orders: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = 'pending'")
                .fetch_one(self.pool)
                .await?;

        Ok(Statistics {
            total_orders,
            today_orders,
            total_income: Price::new(total_income),
            today_income: Price::new(today_income),
            total_users,
            total_products,
            pending_orders,
        })
    }
}
