//! Variable resolution
//!
//! [`VariableResolver`] runs the find, create, and bind workflows against a
//! [`VariableStore`](crate::document::VariableStore). [`VariableCache`] is
//! the per-request lookup context used by analysis.

mod cache;
pub mod resolver;

pub use cache::VariableCache;
pub use resolver::{BindReport, ResolverConfig, VariableResolver};
