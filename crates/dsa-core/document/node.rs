//! Document nodes
//!
//! A [`Node`] is one element of the host document tree. Which properties are
//! meaningful depends on its [`NodeKind`]; [`NodeKind::capabilities`] is the
//! single place that knowledge lives, so the canonicalizer never has to guess
//! from the presence of a field.

use super::paint::{Effect, Paint};
use bitflags::bitflags;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Opaque node identifier assigned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap a host identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

bitflags! {
    /// Properties a node kind can carry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeCapabilities: u8 {
        /// Has a fill paint list.
        const FILLS = 1 << 0;
        /// Has a stroke paint list.
        const STROKES = 1 << 1;
        /// Has an effect list.
        const EFFECTS = 1 << 2;
        /// Can contain children.
        const CHILDREN = 1 << 3;
        /// Has a text style reference.
        const TEXT_STYLE = 1 << 4;
        /// Has an auto-layout mode.
        const LAYOUT = 1 << 5;
        /// Links to a main component.
        const INSTANCE = 1 << 6;
    }
}

/// Node type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Frame,
    Group,
    Section,
    Component,
    ComponentSet,
    Instance,
    Text,
    Rectangle,
    Ellipse,
    Polygon,
    Star,
    Line,
    Vector,
    BooleanOperation,
    /// Any kind this model does not describe; carries no properties
    #[serde(other)]
    Unknown,
}

impl NodeKind {
    /// Properties meaningful for this kind.
    #[must_use]
    pub const fn capabilities(self) -> NodeCapabilities {
        const PAINTED: NodeCapabilities = NodeCapabilities::FILLS
            .union(NodeCapabilities::STROKES)
            .union(NodeCapabilities::EFFECTS);
        const CONTAINER: NodeCapabilities = PAINTED
            .union(NodeCapabilities::CHILDREN)
            .union(NodeCapabilities::LAYOUT);

        match self {
            Self::Frame | Self::Component | Self::ComponentSet => CONTAINER,
            Self::Instance => CONTAINER.union(NodeCapabilities::INSTANCE),
            Self::Section => NodeCapabilities::FILLS.union(NodeCapabilities::CHILDREN),
            Self::Group => NodeCapabilities::EFFECTS.union(NodeCapabilities::CHILDREN),
            Self::BooleanOperation => PAINTED.union(NodeCapabilities::CHILDREN),
            Self::Text => PAINTED.union(NodeCapabilities::TEXT_STYLE),
            Self::Rectangle | Self::Ellipse | Self::Polygon | Self::Star | Self::Vector => PAINTED,
            Self::Line => NodeCapabilities::STROKES.union(NodeCapabilities::EFFECTS),
            Self::Unknown => NodeCapabilities::empty(),
        }
    }

    /// Host tag for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Frame => "FRAME",
            Self::Group => "GROUP",
            Self::Section => "SECTION",
            Self::Component => "COMPONENT",
            Self::ComponentSet => "COMPONENT_SET",
            Self::Instance => "INSTANCE",
            Self::Text => "TEXT",
            Self::Rectangle => "RECTANGLE",
            Self::Ellipse => "ELLIPSE",
            Self::Polygon => "POLYGON",
            Self::Star => "STAR",
            Self::Line => "LINE",
            Self::Vector => "VECTOR",
            Self::BooleanOperation => "BOOLEAN_OPERATION",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text style reference of a text node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyleRef {
    /// No shared style applied
    #[default]
    Unset,
    /// Different styles on different character ranges
    Mixed,
    /// One shared style id
    Style(String),
}

impl TextStyleRef {
    /// Style id when exactly one style is applied.
    #[must_use]
    pub fn style_id(&self) -> Option<&str> {
        match self {
            Self::Style(id) => Some(id),
            Self::Unset | Self::Mixed => None,
        }
    }
}

/// Auto-layout mode of a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutMode {
    #[default]
    None,
    Horizontal,
    Vertical,
    Grid,
}

/// Main component an instance is linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainComponentRef {
    pub id: NodeId,
    pub name: String,
}

/// One overridden sub-node of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceOverride {
    pub id: NodeId,
    #[serde(default)]
    pub overridden_fields: Vec<String>,
}

/// Instance link information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_component: Option<MainComponentRef>,
    #[serde(default)]
    pub overrides: Vec<InstanceOverride>,
}

/// One element of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fills: Option<Vec<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Vec<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<Vec<Effect>>,
    #[serde(default)]
    pub text_style_id: TextStyleRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_mode: Option<LayoutMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<InstanceInfo>,
    /// Host refuses writes to locked nodes
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a bare node with no paints or children.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            fills: None,
            strokes: None,
            effects: None,
            text_style_id: TextStyleRef::Unset,
            layout_mode: None,
            instance: None,
            locked: false,
            children: Vec::new(),
        }
    }

    /// Set fills.
    #[must_use]
    pub fn with_fills(mut self, fills: Vec<Paint>) -> Self {
        self.fills = Some(fills);
        self
    }

    /// Set strokes.
    #[must_use]
    pub fn with_strokes(mut self, strokes: Vec<Paint>) -> Self {
        self.strokes = Some(strokes);
        self
    }

    /// Set effects.
    #[must_use]
    pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = Some(effects);
        self
    }

    /// Set the text style reference.
    #[must_use]
    pub fn with_text_style(mut self, style: TextStyleRef) -> Self {
        self.text_style_id = style;
        self
    }

    /// Set the auto-layout mode.
    #[must_use]
    pub const fn with_layout(mut self, mode: LayoutMode) -> Self {
        self.layout_mode = Some(mode);
        self
    }

    /// Attach instance link information.
    #[must_use]
    pub fn with_instance(mut self, instance: InstanceInfo) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Capabilities of this node's kind.
    #[must_use]
    pub const fn capabilities(&self) -> NodeCapabilities {
        self.kind.capabilities()
    }

    /// Fills, if the kind has them and any are set.
    #[must_use]
    pub fn fill_paints(&self) -> &[Paint] {
        self.paints_if(NodeCapabilities::FILLS, self.fills.as_deref())
    }

    /// Strokes, if the kind has them and any are set.
    #[must_use]
    pub fn stroke_paints(&self) -> &[Paint] {
        self.paints_if(NodeCapabilities::STROKES, self.strokes.as_deref())
    }

    /// Effects, if the kind has them and any are set.
    #[must_use]
    pub fn effect_list(&self) -> &[Effect] {
        if self.capabilities().contains(NodeCapabilities::EFFECTS) {
            self.effects.as_deref().unwrap_or_default()
        } else {
            &[]
        }
    }

    /// Effective layout mode; `None` for kinds without auto-layout.
    #[must_use]
    pub fn layout(&self) -> Option<LayoutMode> {
        self.capabilities()
            .contains(NodeCapabilities::LAYOUT)
            .then(|| self.layout_mode.unwrap_or_default())
    }

    /// Main component of an instance.
    #[must_use]
    pub fn main_component(&self) -> Option<&MainComponentRef> {
        match self.kind {
            NodeKind::Instance => self.instance.as_ref()?.main_component.as_ref(),
            _ => None,
        }
    }

    fn paints_if<'a>(&self, capability: NodeCapabilities, paints: Option<&'a [Paint]>) -> &'a [Paint] {
        if self.capabilities().contains(capability) {
            paints.unwrap_or_default()
        } else {
            &[]
        }
    }
}
