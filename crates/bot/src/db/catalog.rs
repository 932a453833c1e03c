//! Catalog repository: products and their packs.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use packshop_core::{MediaRef, PackId, Price, ProductId};

use super::RepositoryError;
use crate::models::{Pack, Product};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    photo_id: String,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            photo: MediaRef::new(row.photo_id),
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PackRow {
    id: i64,
    product_id: i64,
    name: String,
    quantity: i64,
    price: i64,
}

impl From<PackRow> for Pack {
    fn from(row: PackRow) -> Self {
        Self {
            id: PackId::new(row.id),
            product_id: ProductId::new(row.product_id),
            name: row.name,
            quantity: row.quantity,
            price: Price::new(row.price),
        }
    }
}

/// Repository for catalog operations.
///
/// Performs only range checks; input sanitation (trimming, numeric parsing)
/// belongs to the admin wizards.
pub struct CatalogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_product(
        &self,
        name: &str,
        description: &str,
        photo: &MediaRef,
    ) -> Result<ProductId, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO products (name, description, photo_id, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id",
        )
        .bind(name)
        .bind(description)
        .bind(photo.as_str())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(ProductId::new(id))
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, photo_id, created_at
             FROM products
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// List all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, photo_id, created_at
             FROM products
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Delete a product and all of its packs.
    ///
    /// Cart entries and orders referencing the product are left alone: order
    /// line items are frozen copies, and the cart view excludes entries
    /// whose catalog rows are gone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM packs WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Add a pack to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Constraint` if `quantity < 1` or
    /// `price < 0`, `RepositoryError::NotFound` if the product doesn't
    /// exist, and `RepositoryError::Database` for other database errors.
    pub async fn add_pack(
        &self,
        product_id: ProductId,
        name: &str,
        quantity: i64,
        price: Price,
    ) -> Result<PackId, RepositoryError> {
        if quantity < 1 {
            return Err(RepositoryError::Constraint("pack quantity must be positive"));
        }
        if price.as_i64() < 0 {
            return Err(RepositoryError::Constraint("pack price must not be negative"));
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO packs (product_id, name, quantity, price)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id",
        )
        .bind(product_id)
        .bind(name)
        .bind(quantity)
        .bind(price.as_i64())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(PackId::new(id))
    }

    /// List the packs of one product, in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn packs(&self, product_id: ProductId) -> Result<Vec<Pack>, RepositoryError> {
        let rows = sqlx::query_as::<_, PackRow>(
            "SELECT id, product_id, name, quantity, price
             FROM packs
             WHERE product_id = ?1
             ORDER BY id",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Pack::from).collect())
    }

    /// Get a pack by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pack(&self, id: PackId) -> Result<Option<Pack>, RepositoryError> {
        let row = sqlx::query_as::<_, PackRow>(
            "SELECT id, product_id, name, quantity, price
             FROM packs
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Pack::from))
    }

    /// Delete a single pack. The parent product is untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the pack doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_pack(&self, id: PackId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM packs WHERE id = ?1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
