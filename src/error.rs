//! Error types for forgetmenot-companion

use thiserror::Error;

/// Errors that can occur while delivering configuration to the device
#[derive(Debug, Error)]
pub enum CompanionError {
    /// Configuration payload from the settings surface could not be decoded
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Transport reported that the message could not be delivered
    #[error("Failed to deliver message with transactionId={transaction_id}: {message}")]
    Delivery {
        transaction_id: String,
        message: String,
    },

    /// Device message dictionary could not be built
    #[error("Encode error: {0}")]
    Encode(String),

    /// Transport connection failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transaction not found
    #[error("Transaction not found: {0}")]
    NotFound(String),

    /// Backend error (poisoned lock, closed channel, etc.)
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Reasons a settings-surface payload is rejected
#[derive(Debug, Error)]
pub enum ParseError {
    /// The user dismissed the settings surface without saving
    #[error("configuration was cancelled")]
    Cancelled,

    /// Percent-decoding produced bytes that are not UTF-8
    #[error("payload is not valid URL-encoded UTF-8: {0}")]
    Encoding(String),

    /// Decoded payload is not a configuration object
    #[error("payload is not a valid configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<toml::de::Error> for CompanionError {
    fn from(e: toml::de::Error) -> Self {
        CompanionError::Config(e.to_string())
    }
}

/// Result type alias for companion operations
pub type Result<T> = std::result::Result<T, CompanionError>;
