//! Error categorization for logging and UI grouping
//!
//! Groups `CoreError` variants by the part of the system that produced them
//! and attaches a short suggestion where a standard fix exists.

use super::CoreError;
use core::fmt;

/// Error category for filtering and user interface organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Problems with what the user selected
    Selection,

    /// Malformed values such as hex colors
    Format,

    /// Variable lookup, import, and creation failures
    Variables,

    /// Failures while walking the node tree
    Traversal,

    /// Document host failures
    Host,

    /// Request decoding failures
    Protocol,

    /// Unexpected failures that indicate a bug
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ErrorCategory {
    /// Lowercase category name used in log fields.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::Format => "format",
            Self::Variables => "variables",
            Self::Traversal => "traversal",
            Self::Host => "host",
            Self::Protocol => "protocol",
            Self::Internal => "internal",
        }
    }

    /// Check if errors in this category are typically user-fixable.
    #[must_use]
    pub const fn is_user_fixable(self) -> bool {
        matches!(self, Self::Selection | Self::Format | Self::Protocol)
    }
}

impl CoreError {
    /// Get error category for filtering/grouping.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptySelection => ErrorCategory::Selection,
            Self::InvalidHex(_) => ErrorCategory::Format,
            Self::NoVariablesFound { .. }
            | Self::VariableImportFailed { .. }
            | Self::VariableStore(_) => ErrorCategory::Variables,
            Self::NodeProcessing { .. } | Self::Cancelled { .. } => ErrorCategory::Traversal,
            Self::Host(_) => ErrorCategory::Host,
            Self::Protocol(_) => ErrorCategory::Protocol,
            Self::InternalAnalysis(_) => ErrorCategory::Internal,
        }
    }

    /// Get suggested action for this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::EmptySelection => Some("Select a frame, component, or instance first"),
            Self::InvalidHex(_) => Some("Use six hex digits such as '#ff0000'"),
            Self::NoVariablesFound { .. } => Some("Create a variable for this color instead"),
            Self::VariableImportFailed { .. } => {
                Some("Check that the library is enabled for this file")
            }
            Self::InternalAnalysis(_) => Some("Please report this bug to the maintainers"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_categories() {
        assert_eq!(CoreError::EmptySelection.category(), ErrorCategory::Selection);
        assert_eq!(CoreError::invalid_hex("x").category(), ErrorCategory::Format);
        assert_eq!(
            CoreError::VariableImportFailed {
                key: "k".to_string(),
                reason: "offline".to_string(),
            }
            .category(),
            ErrorCategory::Variables
        );
        assert_eq!(
            CoreError::Cancelled { visited: 3 }.category(),
            ErrorCategory::Traversal
        );
    }

    #[test]
    fn error_suggestions() {
        assert!(CoreError::invalid_hex("x").suggestion().is_some());
        assert!(CoreError::host("x").suggestion().is_none());
    }

    #[test]
    fn category_display() {
        assert_eq!(ErrorCategory::Variables.to_string(), "variables");
        assert!(ErrorCategory::Format.is_user_fixable());
        assert!(!ErrorCategory::Internal.is_user_fixable());
    }
}
