//! Bot configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PACKSHOP_BOT_TOKEN` - transport credential for the bot account
//! - `PACKSHOP_ADMIN_ID` - chat ID of the single administrator
//! - `PACKSHOP_DATABASE_URL` - SQLite URL (falls back to `DATABASE_URL`),
//!   e.g. `sqlite://packshop.db`
//!
//! ## Optional
//! - `PACKSHOP_CHANNEL` - public channel handle product listings are
//!   broadcast to (e.g. `@packshop`)
//! - `PACKSHOP_CONTACT` - text shown for "Contact us"

use secrecy::SecretString;
use thiserror::Error;

use packshop_core::UserId;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Bot application configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Transport credential (never logged).
    pub bot_token: SecretString,
    /// The one administrator's chat ID.
    pub admin_id: UserId,
    /// SQLite database URL.
    pub database_url: String,
    /// Public channel handle for product broadcasts, if configured.
    pub channel: Option<String>,
    /// "Contact us" text, if configured.
    pub contact: Option<String>,
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let bot_token = SecretString::from(get_required_env("PACKSHOP_BOT_TOKEN")?);

        let admin_raw = get_required_env("PACKSHOP_ADMIN_ID")?;
        let admin_id = admin_raw.parse::<UserId>().map_err(|e| {
            ConfigError::InvalidEnvVar("PACKSHOP_ADMIN_ID".to_owned(), e.to_string())
        })?;

        let database_url = get_database_url("PACKSHOP_DATABASE_URL")?;
        let channel = get_optional_env("PACKSHOP_CHANNEL");
        let contact = get_optional_env("PACKSHOP_CONTACT");

        Ok(Self {
            bot_token,
            admin_id,
            database_url,
            channel,
            contact,
        })
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get database URL with fallback to the generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<String, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(value);
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(value);
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_var_is_an_error() {
        let result = get_required_env("PACKSHOP_TEST_VAR_THAT_DOES_NOT_EXIST");
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidEnvVar("PACKSHOP_ADMIN_ID".to_owned(), "bad".to_owned());
        assert_eq!(
            err.to_string(),
            "Invalid environment variable PACKSHOP_ADMIN_ID: bad"
        );
    }
}
