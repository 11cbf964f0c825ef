//! Utility functions and shared types
//!
//! Contains the color codec, hash container helpers, and the error module
//! used across the document model, analysis, and variable resolution.
//!
//! # Example
//!
//! ```rust
//! use dsa_core::utils::{hex_to_rgb, rgb_to_hex};
//!
//! let rgb = hex_to_rgb("#3366cc")?;
//! assert_eq!(rgb_to_hex(rgb), "#3366cc");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod color;
pub mod errors;
pub mod hashers;

pub use color::{
    colors_match, hex_to_rgb, normalize_hex, rgb_to_hex, Rgb, Rgba, COLOR_TOLERANCE,
};
pub use errors::{CoreError, ErrorCategory, Result};
pub use hashers::{create_hash_map, create_hash_set};
