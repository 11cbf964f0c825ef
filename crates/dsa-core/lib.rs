//! # DSA Core
//!
//! Design-system consistency analyzer for node documents. Walks a selection
//! of design nodes, canonicalizes their paints, effects, and text styles into
//! comparable descriptors, aggregates how often each is used, and reports
//! structural inconsistencies. A variable resolver finds, creates, and binds
//! color variables for a hex color.
//!
//! ## Features
//!
//! - **Single-pass analysis**: one iterative pre-order walk per request
//! - **Stable output**: entries ordered by first sighting
//! - **Pluggable hosts**: document and variable access behind traits
//! - **JSON protocol**: tagged request/response messages for a UI front end
//!
//! ## Quick Start
//!
//! ```rust
//! use dsa_core::document::{MemoryDocument, MemoryPreferences, MemoryVariableStore, Node, NodeKind};
//! use dsa_core::{RequestHandler, Response};
//!
//! # let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # runtime.block_on(async {
//! let host = MemoryDocument::new(vec![Node::new("1:1", "Card", NodeKind::Frame)]);
//! let mut handler = RequestHandler::new(host, MemoryVariableStore::new(), MemoryPreferences::new());
//!
//! let responses = handler.handle_json(r#"{"type":"analyze-design-system"}"#).await;
//! assert!(matches!(responses.as_slice(), [Response::AnalysisResults { .. }]));
//! # });
//! ```

#![deny(clippy::all)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod document;
pub mod protocol;
pub mod utils;
pub mod variables;

pub use analysis::{AbortFlag, AnalysisConfig, AnalysisResult, DesignAnalysis};
pub use document::{DocumentHost, Node, NodeId, PreferenceStore, VariableStore};
pub use protocol::{Request, RequestHandler, Response};
pub use utils::{CoreError, Result};
pub use variables::{BindReport, ResolverConfig, VariableResolver};

/// Crate version for runtime compatibility checks.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
