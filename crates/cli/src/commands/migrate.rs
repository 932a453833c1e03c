//! Database migration command.
//!
//! Migration files live in `crates/bot/migrations/` and are embedded into
//! the binary, so the CLI can be shipped alone.

use super::CommandError;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database URL is missing, the connection
/// fails, or a migration cannot be applied.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = packshop_bot::db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../bot/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
