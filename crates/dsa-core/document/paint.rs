//! Paints and effects attached to nodes
//!
//! Mirrors the host's JSON shape: paints and effects are internally tagged
//! by `type`. Unknown effect kinds deserialize to [`Effect::Unknown`] and are
//! skipped by the canonicalizer.

use super::variable::{VariableAlias, VariableId};
use crate::utils::{Rgb, Rgba};
use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

const fn default_opacity() -> f64 {
    1.0
}

/// Property slot of a paint that can be bound to a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaintSlot {
    /// The solid color of a paint
    Color,
}

/// Variable bindings carried by a paint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundVariables {
    /// Binding for the color slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<VariableAlias>,
}

impl BoundVariables {
    /// Check whether no slot is bound.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.color.is_none()
    }
}

/// Solid color paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolidPaint {
    /// Paint color
    pub color: Rgb,
    /// Paint opacity
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Whether the paint is rendered
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Variable bindings
    #[serde(default, skip_serializing_if = "BoundVariables::is_empty")]
    pub bound_variables: BoundVariables,
}

impl SolidPaint {
    /// Create an opaque, visible, unbound solid paint.
    #[must_use]
    pub fn new(color: Rgb) -> Self {
        Self {
            color,
            opacity: 1.0,
            visible: true,
            bound_variables: BoundVariables::default(),
        }
    }

    /// Bind the color slot to a variable.
    #[must_use]
    pub fn bound_to(mut self, variable: impl Into<VariableId>) -> Self {
        self.bound_variables.color = Some(VariableAlias::new(variable));
        self
    }

    /// Variable bound to the color slot, if any.
    #[must_use]
    pub fn bound_color(&self) -> Option<&VariableId> {
        self.bound_variables.color.as_ref().map(|alias| &alias.id)
    }
}

/// One stop of a gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position along the gradient in `[0, 1]`
    pub position: f64,
    /// Stop color
    pub color: Rgba,
}

/// Gradient paint body shared by every gradient kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientPaint {
    /// Ordered gradient stops
    #[serde(default)]
    pub gradient_stops: Vec<ColorStop>,
    /// Whether the paint is rendered
    #[serde(default = "default_true")]
    pub visible: bool,
}

/// Image paint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePaint {
    /// Host image hash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_hash: Option<String>,
}

/// Gradient flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradientKind {
    /// Linear gradient
    Linear,
    /// Radial gradient
    Radial,
    /// Angular gradient
    Angular,
    /// Diamond gradient
    Diamond,
}

impl GradientKind {
    /// Host tag for this gradient kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "GRADIENT_LINEAR",
            Self::Radial => "GRADIENT_RADIAL",
            Self::Angular => "GRADIENT_ANGULAR",
            Self::Diamond => "GRADIENT_DIAMOND",
        }
    }
}

/// A fill or stroke paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Paint {
    /// Solid color
    Solid(SolidPaint),
    /// Linear gradient
    GradientLinear(GradientPaint),
    /// Radial gradient
    GradientRadial(GradientPaint),
    /// Angular gradient
    GradientAngular(GradientPaint),
    /// Diamond gradient
    GradientDiamond(GradientPaint),
    /// Image fill
    Image(ImagePaint),
    /// Any paint type this model does not describe
    #[serde(other)]
    Unknown,
}

impl Paint {
    /// Shorthand for an unbound solid paint.
    #[must_use]
    pub fn solid(color: Rgb) -> Self {
        Self::Solid(SolidPaint::new(color))
    }

    /// Borrow the gradient body together with its kind.
    #[must_use]
    pub const fn as_gradient(&self) -> Option<(GradientKind, &GradientPaint)> {
        match self {
            Self::GradientLinear(g) => Some((GradientKind::Linear, g)),
            Self::GradientRadial(g) => Some((GradientKind::Radial, g)),
            Self::GradientAngular(g) => Some((GradientKind::Angular, g)),
            Self::GradientDiamond(g) => Some((GradientKind::Diamond, g)),
            Self::Solid(_) | Self::Image(_) | Self::Unknown => None,
        }
    }
}

/// 2D offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    /// Horizontal component
    pub x: f64,
    /// Vertical component
    pub y: f64,
}

/// Drop or inner shadow parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowEffect {
    /// Shadow color including alpha
    pub color: Rgba,
    /// Shadow offset
    #[serde(default)]
    pub offset: Vector,
    /// Blur radius in pixels
    #[serde(default)]
    pub radius: f64,
    /// Spread in pixels
    #[serde(default)]
    pub spread: f64,
    /// Whether the effect is rendered
    #[serde(default = "default_true")]
    pub visible: bool,
}

/// Layer or background blur parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlurEffect {
    /// Blur radius in pixels
    pub radius: f64,
    /// Whether the effect is rendered
    #[serde(default = "default_true")]
    pub visible: bool,
}

/// A visual effect on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effect {
    /// Shadow cast outside the node
    DropShadow(ShadowEffect),
    /// Shadow cast inside the node
    InnerShadow(ShadowEffect),
    /// Blur of the node itself
    LayerBlur(BlurEffect),
    /// Blur of what is behind the node
    BackgroundBlur(BlurEffect),
    /// Any effect kind the analyzer does not recognize
    #[serde(other)]
    Unknown,
}
