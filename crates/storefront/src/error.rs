//! Unified error handling.
//!
//! Each layer has its own error enum ([`ConfigError`], [`ApiError`],
//! [`StorageError`], [`ValidationError`]); [`Error`] aggregates them for
//! callers that drive several layers, such as the CLI.
//!
//! Store operations do not return these errors to the presentation layer.
//! They convert them into a [`Notification`](crate::notify::Notification) and
//! a `false`/`None`/empty result.

use pizzeria_core::EmailError;
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Input rejected before any network call was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please log in to place an order")]
    GuestCheckout,

    #[error("Please enter a delivery address")]
    MissingAddress,

    #[error("Please enter a phone number")]
    MissingPhone,

    #[error("Please enter a valid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Please enter a password")]
    EmptyPassword,
}

/// Storefront error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Remote API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Durable storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// User input was rejected.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::from(ValidationError::EmptyCart);
        assert_eq!(err.to_string(), "Validation error: Your cart is empty");

        let err = Error::from(ApiError::Status {
            status: 503,
            message: "down".to_string(),
        });
        assert_eq!(err.to_string(), "API error: API error: 503 - down");
    }

    #[test]
    fn test_invalid_email_wraps_reason() {
        let err = ValidationError::from(EmailError::MissingAtSymbol);
        assert_eq!(
            err.to_string(),
            "Please enter a valid email address: email must contain an @ symbol"
        );
    }
}
