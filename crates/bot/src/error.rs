//! Unified error handling.
//!
//! Each layer has its own error enum (`RepositoryError`, `LifecycleError`,
//! `TransportError`); this module folds them into one `BotError` and maps
//! every variant to the text a chat user should see. Nothing here panics:
//! a failed operation becomes a reply, not a crash.

use thiserror::Error;

use crate::db::{LifecycleError, RepositoryError};
use crate::transport::TransportError;

/// Application-level error type for update handling.
#[derive(Debug, Error)]
pub enum BotError {
    /// Storage operation failed.
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),

    /// Order lifecycle operation failed.
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// User input failed validation.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Outbound delivery failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl BotError {
    /// The reply text shown to the user who triggered this error.
    ///
    /// Storage internals are never exposed; lifecycle violations explain
    /// themselves so a stale button press reads as "too late", not as a
    /// malfunction.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Repository(_) | Self::Transport(_) => {
                "Something went wrong on our side. Please try again.".to_owned()
            }
            Self::Lifecycle(e) => match e {
                LifecycleError::NotFound => "Order not found.".to_owned(),
                LifecycleError::InvalidState { actual } => {
                    format!("This action is no longer available (the order is {actual}).")
                }
                LifecycleError::OutOfRange { .. } => {
                    "That item is no longer on the order.".to_owned()
                }
                LifecycleError::EmptyCart => "Your cart is empty.".to_owned(),
                LifecycleError::Repository(_) => {
                    "Something went wrong on our side. Please try again.".to_owned()
                }
            },
            Self::Validation(msg) => msg.clone(),
            Self::NotFound(what) => format!("{what} not found."),
        }
    }
}

/// Result type alias for `BotError`.
pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use packshop_core::OrderStatus;

    use super::*;

    #[test]
    fn storage_details_stay_hidden() {
        let err = BotError::Repository(RepositoryError::DataCorruption("bad blob".to_owned()));
        assert!(!err.user_message().contains("bad blob"));
    }

    #[test]
    fn invalid_state_names_the_actual_status() {
        let err = BotError::Lifecycle(LifecycleError::InvalidState {
            actual: OrderStatus::Confirmed,
        });
        assert!(err.user_message().contains("confirmed"));
    }

    #[test]
    fn validation_message_passes_through() {
        let err = BotError::Validation("Please enter a number.".to_owned());
        assert_eq!(err.user_message(), "Please enter a number.");
    }
}
