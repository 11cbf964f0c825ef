//! Document model and host capabilities
//!
//! Typed view of the host document: nodes with their paints and effects,
//! variables and collections, and the traits through which the analyzer reads
//! the selection and writes changes back. [`memory`] provides in-memory
//! implementations of every host trait.

pub mod host;
pub mod memory;
pub mod node;
pub mod paint;
pub mod variable;

pub use host::{DocumentHost, PreferenceStore, VariableStore};
pub use memory::{MemoryDocument, MemoryPreferences, MemoryVariableStore, VariableSnapshot};
pub use node::{
    InstanceInfo, InstanceOverride, LayoutMode, MainComponentRef, Node, NodeCapabilities, NodeId,
    NodeKind, TextStyleRef,
};
pub use paint::{
    BlurEffect, BoundVariables, ColorStop, Effect, GradientKind, GradientPaint, ImagePaint, Paint,
    PaintSlot, ShadowEffect, SolidPaint, Vector,
};
pub use variable::{
    ResolvedType, StyleInfo, Variable, VariableAlias, VariableCollection, VariableId, VariableMode,
    VariableRef, VariableValue,
};
