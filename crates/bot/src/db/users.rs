//! User repository: chat identities and shipping profiles.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use packshop_core::UserId;

use super::RepositoryError;
use crate::models::{ProfilePatch, User};

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    username: Option<String>,
    first_name: Option<String>,
    full_name: Option<String>,
    phone: Option<String>,
    landline_phone: Option<String>,
    address: Option<String>,
    shop_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.user_id),
            username: row.username,
            first_name: row.first_name,
            full_name: row.full_name,
            phone: row.phone,
            landline_phone: row.landline_phone,
            address: row.address,
            shop_name: row.shop_name,
            created_at: row.created_at,
        }
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the user if they have never been seen before.
    ///
    /// Idempotent: on repeat contact the existing row (including any filled
    /// profile fields) is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn ensure(
        &self,
        id: UserId,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO users (user_id, username, first_name, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(id)
        .bind(username)
        .bind(first_name)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, username, first_name, full_name, phone,
                    landline_phone, address, shop_name, created_at
             FROM users
             WHERE user_id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Apply a partial profile update in one atomic statement.
    ///
    /// Fields the patch leaves empty keep their stored value; a filled
    /// profile field can only ever be replaced, never blanked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: UserId,
        patch: &ProfilePatch,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET
                 full_name      = COALESCE(?2, full_name),
                 phone          = COALESCE(?3, phone),
                 landline_phone = COALESCE(?4, landline_phone),
                 address        = COALESCE(?5, address),
                 shop_name      = COALESCE(?6, shop_name)
             WHERE user_id = ?1",
        )
        .bind(id)
        .bind(ProfilePatch::field(&patch.full_name))
        .bind(ProfilePatch::field(&patch.phone))
        .bind(ProfilePatch::field(&patch.landline_phone))
        .bind(ProfilePatch::field(&patch.address))
        .bind(ProfilePatch::field(&patch.shop_name))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
