//! CLI subcommands.

pub mod migrate;
pub mod seed;

use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] packshop_bot::db::RepositoryError),
}

/// Resolve the database URL from the environment.
pub fn database_url() -> Result<String, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var("PACKSHOP_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("PACKSHOP_DATABASE_URL"))
}
