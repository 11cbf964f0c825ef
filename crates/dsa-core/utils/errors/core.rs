//! Core error type for analyzer operations
//!
//! Provides the main `CoreError` enum shared by traversal, variable
//! resolution, and the request protocol. Every variant renders a single
//! descriptive message through `Display`, which is what the protocol layer
//! sends back in `error` responses.
//!
//! # Error Philosophy
//!
//! - Use `thiserror` for structured error handling (no `anyhow` in the library)
//! - Per-node failures are values, not panics: the walker logs and moves on
//! - Store and host failures stop only the operation that hit them

use core::fmt;
use thiserror::Error;

/// Main error type for analyzer operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Nothing is selected in the document
    #[error("Please select at least one frame or component to analyze.")]
    EmptySelection,

    /// A color string is not `#rrggbb` / `rrggbb`
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),

    /// A search for variables by color came back empty
    #[error("No variables found for color {hex}")]
    NoVariablesFound { hex: String },

    /// A remote library variable could not be imported
    #[error("Failed to import variable '{key}': {reason}")]
    VariableImportFailed { key: String, reason: String },

    /// A single node could not be processed during traversal
    #[error("Error processing node {node_id}: {message}")]
    NodeProcessing { node_id: String, message: String },

    /// Unexpected failure outside the per-node boundary
    #[error("Error analyzing selection: {0}")]
    InternalAnalysis(String),

    /// The document host rejected an operation
    #[error("Document host error: {0}")]
    Host(String),

    /// The variable store rejected an operation
    #[error("Variable store error: {0}")]
    VariableStore(String),

    /// Traversal was aborted at a checkpoint
    #[error("Analysis cancelled after {visited} nodes")]
    Cancelled { visited: usize },

    /// A request could not be decoded
    #[error("Malformed request: {0}")]
    Protocol(String),
}

impl CoreError {
    /// Create invalid hex error from the offending input.
    pub fn invalid_hex<T: fmt::Display>(input: T) -> Self {
        Self::InvalidHex(input.to_string())
    }

    /// Create node processing error.
    pub fn node_processing<I: fmt::Display, M: fmt::Display>(node_id: I, message: M) -> Self {
        Self::NodeProcessing {
            node_id: node_id.to_string(),
            message: message.to_string(),
        }
    }

    /// Create host error.
    pub fn host<T: fmt::Display>(message: T) -> Self {
        Self::Host(message.to_string())
    }

    /// Create variable store error.
    pub fn store<T: fmt::Display>(message: T) -> Self {
        Self::VariableStore(message.to_string())
    }

    /// Create internal analysis error.
    pub fn internal<T: fmt::Display>(message: T) -> Self {
        Self::InternalAnalysis(message.to_string())
    }

    /// Check if the user can retry after adjusting input or selection.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::EmptySelection
            | Self::InvalidHex(_)
            | Self::NoVariablesFound { .. }
            | Self::VariableImportFailed { .. }
            | Self::NodeProcessing { .. }
            | Self::Cancelled { .. }
            | Self::Protocol(_) => true,

            Self::Host(_) | Self::VariableStore(_) | Self::InternalAnalysis(_) => false,
        }
    }
}

/// Result type alias for convenience.
pub type Result<T> = core::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_message_is_user_facing() {
        assert_eq!(
            CoreError::EmptySelection.to_string(),
            "Please select at least one frame or component to analyze."
        );
    }

    #[test]
    fn constructors_build_expected_variants() {
        assert!(matches!(CoreError::invalid_hex("zz"), CoreError::InvalidHex(_)));
        assert!(matches!(CoreError::host("gone"), CoreError::Host(_)));
        assert!(matches!(CoreError::store("down"), CoreError::VariableStore(_)));

        let err = CoreError::node_processing("1:2", "gradient has no stops");
        assert_eq!(
            err.to_string(),
            "Error processing node 1:2: gradient has no stops"
        );
    }

    #[test]
    fn recoverability() {
        assert!(CoreError::EmptySelection.is_recoverable());
        assert!(CoreError::invalid_hex("x").is_recoverable());
        assert!(!CoreError::internal("boom").is_recoverable());
        assert!(!CoreError::store("down").is_recoverable());
    }
}
