//! Unified error handling for the hike-planner library.
//!
//! This module provides a consistent error type for all engine operations,
//! replacing mixed error handling patterns (Option, panic, silent point drops).

use std::fmt;

/// Unified error type for hike-planner operations.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutePlanError {
    /// Malformed encoded polyline; the whole decode is aborted
    DecodeError { offset: usize, message: String },
    /// Routing or POI provider transport failure (transient, retryable by the caller)
    ProviderUnavailable {
        provider: String,
        message: String,
    },
    /// Bounding box requested over an empty point set
    UndefinedBoundingBox,
    /// Insertion planned on a route whose point indices are out of order
    InvalidInsertion { message: String },
    /// Generic internal error (upstream logic bug, not user input)
    Internal { message: String },
}

impl fmt::Display for RoutePlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutePlanError::DecodeError { offset, message } => {
                write!(f, "Polyline decode failed at byte {}: {}", offset, message)
            }
            RoutePlanError::ProviderUnavailable { provider, message } => {
                write!(f, "Provider '{}' unavailable: {}", provider, message)
            }
            RoutePlanError::UndefinedBoundingBox => {
                write!(f, "Bounding box is undefined for an empty point set")
            }
            RoutePlanError::InvalidInsertion { message } => {
                write!(f, "Invalid insertion: {}", message)
            }
            RoutePlanError::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for RoutePlanError {}

/// Result type alias for hike-planner operations.
pub type Result<T> = std::result::Result<T, RoutePlanError>;

impl RoutePlanError {
    /// True for failures that are transient and worth retrying upstream.
    ///
    /// Only provider transport failures qualify; geometry and codec errors
    /// are deterministic and will fail again on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, RoutePlanError::ProviderUnavailable { .. })
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        RoutePlanError::Internal {
            message: message.into(),
        }
    }

    pub(crate) fn provider(provider: &str, message: impl Into<String>) -> Self {
        RoutePlanError::ProviderUnavailable {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RoutePlanError::DecodeError {
            offset: 12,
            message: "truncated varint".to_string(),
        };
        assert!(err.to_string().contains("byte 12"));
        assert!(err.to_string().contains("truncated varint"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(RoutePlanError::provider("routing", "connection refused").is_transient());
        assert!(!RoutePlanError::UndefinedBoundingBox.is_transient());
        assert!(!RoutePlanError::internal("bug").is_transient());
    }
}
