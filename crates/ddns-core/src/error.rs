//! Error types for the DDNS updater
//!
//! Each component boundary has its own variant so the entry point can tell
//! a failed DNS call apart from a failed IP lookup or a failed email.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// A read or write call to the DNS provider API failed
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message, including the underlying cause
        message: String,
    },

    /// The provider returned no A record for the configured name
    #[error("No DNS record found: {0}")]
    NoRecordFound(String),

    /// Both the primary and the fallback public IP lookups failed
    #[error("Public IP resolution failed (primary: {primary}; fallback: {fallback})")]
    Resolution {
        /// Why the primary lookup failed
        primary: String,
        /// Why the fallback lookup failed
        fallback: String,
    },

    /// Sending the change notification failed
    #[error("Notification error: {0}")]
    Notification(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a "no record found" error
    pub fn no_record_found(record_name: impl Into<String>) -> Self {
        Self::NoRecordFound(record_name.into())
    }

    /// Create a resolution error from the two lookup failures
    pub fn resolution(primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self::Resolution {
            primary: primary.into(),
            fallback: fallback.into(),
        }
    }

    /// Create a notification error
    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
