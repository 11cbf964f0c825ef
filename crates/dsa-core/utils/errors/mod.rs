//! Error types for the analyzer
//!
//! `CoreError` covers every failure kind the engine can report. Per-node
//! failures during traversal are caught and logged by the walker; everything
//! else propagates to the request handler and becomes one `error` response.
//!
//! # Examples
//!
//! ```rust
//! use dsa_core::utils::errors::{CoreError, ErrorCategory};
//!
//! let err = CoreError::invalid_hex("#12");
//! assert_eq!(err.category(), ErrorCategory::Format);
//! assert!(err.suggestion().is_some());
//! ```

mod category;
mod core;

pub use self::core::{CoreError, Result};
pub use category::ErrorCategory;

/// Convert from JSON decoding errors.
impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}
