//! Error types for bill retrieval.

use thiserror::Error;

/// Errors that can occur while resolving, fetching or batching bills.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Settings or account file is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Account record is missing credential fields.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credentials are missing or were rejected by the provider.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Provider call failed (network, quota, invalid parameters).
    #[error("Provider error in {action}: {message}")]
    Provider { action: String, message: String },

    /// HTTP request failed before a provider response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider response could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Month label is not a valid `YYYY-MM` value.
    #[error("Invalid month label '{label}': expected YYYY-MM")]
    Parse { label: String },
}

impl BillingError {
    /// Build a provider error for the given API action.
    pub fn provider(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Whether this error aborts the whole run instead of a single account.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Parse { .. })
    }

    /// Short taxonomy label used in log lines and outcomes.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Validation(_) => "validation",
            Self::Authentication(_) => "authentication",
            Self::Provider { .. } | Self::Http(_) | Self::Serialization(_) => "provider",
            Self::Parse { .. } => "parse",
        }
    }
}
