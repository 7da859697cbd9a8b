//! Unified error type for the coinrush service.
//!
//! One enum covers the whole taxonomy the API exposes; each variant carries a
//! human-readable message and maps to a stable machine-readable kind.

use serde::{Deserialize, Serialize};

/// Unified error type for all coinrush operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum CoinrushError {
    /// Invalid input from the caller
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Referenced account does not exist
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Spend would breach the current allowance window
    #[error("Limit exceeded: {message}")]
    LimitExceeded {
        /// Error message describing the rejected spend
        message: String,
    },

    /// Optimistic-concurrency retries exhausted
    #[error("Conflict: {message}")]
    Conflict {
        /// Error message describing the contended update
        message: String,
    },

    /// Transient repository failure, safe for the caller to retry
    #[error("Store error: {message}")]
    Store {
        /// Error message describing the store failure
        message: String,
    },
}

impl CoinrushError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a limit exceeded error
    pub fn limit_exceeded(message: impl Into<String>) -> Self {
        Self::LimitExceeded {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Stable machine-readable kind, independent of the message text
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Invalid { .. } => "invalid_input",
            Self::NotFound { .. } => "not_found",
            Self::LimitExceeded { .. } => "limit_exceeded",
            Self::Conflict { .. } => "conflict",
            Self::Store { .. } => "store_unavailable",
        }
    }

    /// Whether the caller may safely retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store { .. } | Self::Conflict { .. })
    }
}

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, CoinrushError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(CoinrushError::invalid("x").kind(), "invalid_input");
        assert_eq!(CoinrushError::not_found("x").kind(), "not_found");
        assert_eq!(CoinrushError::limit_exceeded("x").kind(), "limit_exceeded");
        assert_eq!(CoinrushError::conflict("x").kind(), "conflict");
        assert_eq!(CoinrushError::store("x").kind(), "store_unavailable");
    }

    #[test]
    fn only_transient_kinds_are_retryable() {
        assert!(CoinrushError::store("down").is_retryable());
        assert!(CoinrushError::conflict("busy").is_retryable());
        assert!(!CoinrushError::invalid("bad").is_retryable());
        assert!(!CoinrushError::limit_exceeded("over").is_retryable());
    }
}
