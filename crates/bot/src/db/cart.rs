//! Cart repository: per-user multiset of (product, pack) entries.

use sqlx::SqlitePool;

use packshop_core::{CartEntryId, PackId, ProductId, UserId};

use super::RepositoryError;
use crate::models::CartLine;

#[derive(sqlx::FromRow)]
struct CartLineRow {
    entry_id: i64,
    product_id: i64,
    pack_id: i64,
    product_name: String,
    pack_name: String,
    units_per_pack: i64,
    unit_price: i64,
    quantity: i64,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            entry_id: CartEntryId::new(row.entry_id),
            product_id: ProductId::new(row.product_id),
            pack_id: PackId::new(row.pack_id),
            product_name: row.product_name,
            pack_name: row.pack_name,
            units_per_pack: row.units_per_pack,
            unit_price: row.unit_price.into(),
            quantity: row.quantity,
        }
    }
}

/// Repository for cart operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add `quantity` packs to the user's cart.
    ///
    /// A single upsert keyed on (user, product, pack): if the entry already
    /// exists its quantity is incremented, otherwise a row is inserted. The
    /// statement is atomic, so two near-simultaneous taps of the same pack
    /// button both count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Constraint` if `quantity < 1`,
    /// `RepositoryError::NotFound` if the product or pack no longer exists,
    /// and `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        user: UserId,
        product: ProductId,
        pack: PackId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        if quantity < 1 {
            return Err(RepositoryError::Constraint("cart quantity must be positive"));
        }

        sqlx::query(
            "INSERT INTO cart_entries (user_id, product_id, pack_id, quantity)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (user_id, product_id, pack_id)
             DO UPDATE SET quantity = quantity + excluded.quantity",
        )
        .bind(user)
        .bind(product)
        .bind(pack)
        .bind(quantity)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }

    /// The user's cart joined with product and pack data, in insertion
    /// order.
    ///
    /// Entries whose product or pack has since been deleted are excluded by
    /// the inner join rather than surfaced as an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, user: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            "SELECT c.id        AS entry_id,
                    c.product_id,
                    c.pack_id,
                    p.name      AS product_name,
                    k.name      AS pack_name,
                    k.quantity  AS units_per_pack,
                    k.price     AS unit_price,
                    c.quantity
             FROM cart_entries c
             JOIN products p ON c.product_id = p.id
             JOIN packs k ON c.pack_id = k.id
             WHERE c.user_id = ?1
             ORDER BY c.id",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    /// Remove a single cart entry.
    ///
    /// # Returns
    ///
    /// Returns `true` if the entry was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, entry: CartEntryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_entries WHERE id = ?1")
            .bind(entry)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every entry in the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_entries WHERE user_id = ?1")
            .bind(user)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
