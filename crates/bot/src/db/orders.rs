//! Order repository and lifecycle engine.
//!
//! Status machine:
//!
//! ```text
//! pending ──confirm──▶ waiting_payment ──receipt──▶ receipt_sent ──approve──▶ confirmed
//!    │                        ▲                          │
//!    └──reject──▶ rejected    └──────payment rejected────┘
//! ```
//!
//! Every transition is a compare-and-set `UPDATE … WHERE status = …`; a
//! zero-row result is resolved into `NotFound` or `InvalidState` by
//! re-reading, never silently ignored. Two near-simultaneous updates to the
//! same order therefore cannot both win.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;

use packshop_core::{MediaRef, OrderId, OrderStatus, Price, ShippingMethod, UserId};

use super::RepositoryError;
use crate::models::{CartLine, LineItems, Order};

/// Errors from order lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The order does not exist.
    #[error("order not found")]
    NotFound,

    /// The operation is not allowed from the order's current status.
    #[error("operation not allowed while order is {actual}")]
    InvalidState {
        /// The status the order actually has.
        actual: OrderStatus,
    },

    /// A line-item index was outside the item list.
    #[error("line item index {index} out of range for {len} items")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The number of items on the order.
        len: usize,
    },

    /// An order cannot be created from an empty cart snapshot.
    #[error("cannot create an order from an empty cart")]
    EmptyCart,

    /// Underlying storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for LifecycleError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    items: String,
    total_price: i64,
    status: String,
    receipt_photo: Option<String>,
    shipping_method: Option<String>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        let shipping_method = self
            .shipping_method
            .map(|s| s.parse::<ShippingMethod>())
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        let items = LineItems::from_json(&self.items).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid line items for order {}: {e}", self.id))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            items,
            total_price: Price::new(self.total_price),
            status,
            receipt_photo: self.receipt_photo.map(MediaRef::new),
            shipping_method,
            created_at: self.created_at,
        })
    }
}

/// Repository for orders and their lifecycle transitions.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a `pending` order from a cart snapshot.
    ///
    /// The snapshot is frozen into line items and the total computed once;
    /// later catalog edits never touch it. The cart itself is NOT cleared
    /// here - that is the caller's move, so the two operations stay
    /// independently testable.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::EmptyCart` for an empty snapshot and
    /// `LifecycleError::Repository` for storage failures.
    pub async fn create(
        &self,
        user: UserId,
        snapshot: &[CartLine],
    ) -> Result<OrderId, LifecycleError> {
        if snapshot.is_empty() {
            return Err(LifecycleError::EmptyCart);
        }

        let items = LineItems::from_cart(snapshot);
        let total = items.total();
        let blob = items.to_json().map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to serialize line items: {e}"))
        })?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (user_id, items, total_price, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
        )
        .bind(user)
        .bind(&blob)
        .bind(total.as_i64())
        .bind(OrderStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(OrderId::new(id))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::NotFound` if the order doesn't exist.
    pub async fn get(&self, id: OrderId) -> Result<Order, LifecycleError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, items, total_price, status, receipt_photo,
                    shipping_method, created_at
             FROM orders
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(r.into_order()?),
            None => Err(LifecycleError::NotFound),
        }
    }

    /// Orders awaiting admin triage, newest first.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Repository` for storage failures.
    pub async fn pending(&self) -> Result<Vec<Order>, LifecycleError> {
        self.by_status(OrderStatus::Pending).await
    }

    /// Orders with an uploaded receipt awaiting payment review, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Repository` for storage failures.
    pub async fn receipt_review(&self) -> Result<Vec<Order>, LifecycleError> {
        self.by_status(OrderStatus::ReceiptSent).await
    }

    async fn by_status(&self, status: OrderStatus) -> Result<Vec<Order>, LifecycleError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, items, total_price, status, receipt_photo,
                    shipping_method, created_at
             FROM orders
             WHERE status = ?1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(status.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| r.into_order().map_err(LifecycleError::from))
            .collect()
    }

    /// All orders of one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Repository` for storage failures.
    pub async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>, LifecycleError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, items, total_price, status, receipt_photo,
                    shipping_method, created_at
             FROM orders
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| r.into_order().map_err(LifecycleError::from))
            .collect()
    }

    /// The user's most recent order a receipt upload could apply to
    /// (`waiting_payment` or `receipt_sent`).
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Repository` for storage failures.
    pub async fn latest_payable_for_user(
        &self,
        user: UserId,
    ) -> Result<Option<Order>, LifecycleError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, items, total_price, status, receipt_photo,
                    shipping_method, created_at
             FROM orders
             WHERE user_id = ?1 AND status IN ('waiting_payment', 'receipt_sent')
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
        )
        .bind(user)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(r.into_order()?)),
            None => Ok(None),
        }
    }

    /// Remove the line item at `index` from a `pending` order and recompute
    /// the total. Removing the last item marks the order `rejected` instead
    /// of leaving a zero-item order behind.
    ///
    /// Runs in a transaction; the final update re-asserts `pending` so a
    /// racing transition cannot be overwritten.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::NotFound` for a missing order,
    /// `LifecycleError::InvalidState` outside `pending`, and
    /// `LifecycleError::OutOfRange` for a bad index.
    pub async fn remove_line_item(
        &self,
        id: OrderId,
        index: usize,
    ) -> Result<Order, LifecycleError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, items, total_price, status, receipt_photo,
                    shipping_method, created_at
             FROM orders
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(LifecycleError::NotFound);
        };
        let mut order = row.into_order()?;

        if order.status != OrderStatus::Pending {
            return Err(LifecycleError::InvalidState {
                actual: order.status,
            });
        }

        let len = order.items.len();
        if order.items.remove(index).is_none() {
            return Err(LifecycleError::OutOfRange { index, len });
        }

        order.total_price = order.items.total();
        order.status = if order.items.is_empty() {
            OrderStatus::Rejected
        } else {
            OrderStatus::Pending
        };

        let blob = order.items.to_json().map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to serialize line items: {e}"))
        })?;

        let result = sqlx::query(
            "UPDATE orders SET items = ?2, total_price = ?3, status = ?4
             WHERE id = ?1 AND status = 'pending'",
        )
        .bind(id)
        .bind(&blob)
        .bind(order.total_price.as_i64())
        .bind(order.status.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Raced with another transition; report what the order is now.
            // Re-read on the same connection: the transaction is still open.
            let actual: Option<String> =
                sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match actual {
                Some(s) => LifecycleError::InvalidState {
                    actual: s
                        .parse()
                        .map_err(|e: packshop_core::StatusParseError| {
                            RepositoryError::DataCorruption(e.to_string())
                        })?,
                },
                None => LifecycleError::NotFound,
            });
        }

        tx.commit().await?;
        Ok(order)
    }

    /// Approve a `pending` order: transition to `waiting_payment`.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidState` outside `pending`.
    pub async fn confirm(&self, id: OrderId) -> Result<(), LifecycleError> {
        self.transition(id, OrderStatus::Pending, OrderStatus::WaitingPayment)
            .await
    }

    /// Approve a `pending` order after per-item edits. Same transition as
    /// [`confirm`](Self::confirm); kept separate because the two reviews are
    /// distinct admin actions.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidState` outside `pending`.
    pub async fn confirm_modified(&self, id: OrderId) -> Result<(), LifecycleError> {
        self.transition(id, OrderStatus::Pending, OrderStatus::WaitingPayment)
            .await
    }

    /// Reject a `pending` order outright. Terminal.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidState` outside `pending`.
    pub async fn reject(&self, id: OrderId) -> Result<(), LifecycleError> {
        self.transition(id, OrderStatus::Pending, OrderStatus::Rejected)
            .await
    }

    /// Reject a `pending` order from the per-item review screen. Terminal.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidState` outside `pending`.
    pub async fn reject_full(&self, id: OrderId) -> Result<(), LifecycleError> {
        self.transition(id, OrderStatus::Pending, OrderStatus::Rejected)
            .await
    }

    /// Attach a payment receipt photo: `waiting_payment` → `receipt_sent`.
    ///
    /// Re-uploading while already `receipt_sent` replaces the photo and
    /// keeps the status, so customers can correct a bad upload.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidState` outside
    /// `waiting_payment`/`receipt_sent`.
    pub async fn attach_receipt(
        &self,
        id: OrderId,
        photo: &MediaRef,
    ) -> Result<(), LifecycleError> {
        let result = sqlx::query(
            "UPDATE orders SET receipt_photo = ?2, status = 'receipt_sent'
             WHERE id = ?1 AND status IN ('waiting_payment', 'receipt_sent')",
        )
        .bind(id)
        .bind(photo.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.diagnose(id).await);
        }
        Ok(())
    }

    /// Approve an uploaded receipt: `receipt_sent` → `confirmed`. Terminal.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidState` outside `receipt_sent`.
    pub async fn confirm_payment(&self, id: OrderId) -> Result<(), LifecycleError> {
        self.transition(id, OrderStatus::ReceiptSent, OrderStatus::Confirmed)
            .await
    }

    /// Reject an uploaded receipt: `receipt_sent` → back to
    /// `waiting_payment` so the customer can resubmit. Not terminal.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidState` outside `receipt_sent`.
    pub async fn reject_payment(&self, id: OrderId) -> Result<(), LifecycleError> {
        self.transition(id, OrderStatus::ReceiptSent, OrderStatus::WaitingPayment)
            .await
    }

    /// Set the shipping method. Allowed from any non-terminal status.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidState` if the order is `confirmed` or
    /// `rejected`.
    pub async fn set_shipping_method(
        &self,
        id: OrderId,
        method: ShippingMethod,
    ) -> Result<(), LifecycleError> {
        let result = sqlx::query(
            "UPDATE orders SET shipping_method = ?2
             WHERE id = ?1 AND status NOT IN ('confirmed', 'rejected')",
        )
        .bind(id)
        .bind(method.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.diagnose(id).await);
        }
        Ok(())
    }

    /// Compare-and-set status transition.
    async fn transition(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), LifecycleError> {
        let result = sqlx::query("UPDATE orders SET status = ?3 WHERE id = ?1 AND status = ?2")
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(self.diagnose(id).await);
        }
        Ok(())
    }

    /// Turn a zero-row CAS result into the right error.
    async fn diagnose(&self, id: OrderId) -> LifecycleError {
        let raw: Result<Option<String>, sqlx::Error> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
                .bind(id)
                .fetch_optional(self.pool)
                .await;

        match raw {
            Ok(Some(s)) => match s.parse::<OrderStatus>() {
                Ok(actual) => LifecycleError::InvalidState { actual },
                Err(e) => RepositoryError::DataCorruption(e.to_string()).into(),
            },
            Ok(None) => LifecycleError::NotFound,
            Err(e) => e.into(),
        }
    }
}
