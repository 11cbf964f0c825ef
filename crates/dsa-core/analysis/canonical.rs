//! Style canonicalization
//!
//! Turns raw paints, effects, and text style references into descriptor
//! strings that serve as usage-index keys:
//!
//! - solid paint: `#rrggbb`
//! - gradient: `GRADIENT_LINEAR: #ff0000 → #0000ff`
//! - shadow: `DROP_SHADOW: #000000 @ 25%`
//! - blur: `LAYER_BLUR: 4px`
//!
//! [`NodeDigest`] canonicalizes everything on one node up front. A node with
//! a malformed attachment fails as a whole, before anything reaches the
//! aggregator or the detector.

use crate::document::{
    BlurEffect, DocumentHost, Effect, GradientKind, GradientPaint, Node, NodeCapabilities, Paint,
    ShadowEffect, SolidPaint, VariableId,
};
use crate::utils::{rgb_to_hex, CoreError, Result};
use core::fmt;

/// Why an attachment could not be canonicalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    /// A color channel is NaN or infinite
    NonFiniteColor,
    /// A gradient without stops
    EmptyGradient,
    /// A blur radius that is NaN or infinite
    NonFiniteRadius,
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NonFiniteColor => "color channel is not a finite number",
            Self::EmptyGradient => "gradient has no stops",
            Self::NonFiniteRadius => "blur radius is not a finite number",
        })
    }
}

type Canonical<T> = core::result::Result<T, Malformed>;

/// Hex key of a solid paint.
///
/// # Errors
///
/// Fails on non-finite channels.
pub fn solid_hex(paint: &SolidPaint) -> Canonical<String> {
    if paint.color.is_finite() {
        Ok(rgb_to_hex(paint.color))
    } else {
        Err(Malformed::NonFiniteColor)
    }
}

/// Descriptor of a gradient: kind plus ordered stop colors.
///
/// # Errors
///
/// Fails on a gradient without stops or with a non-finite stop color.
pub fn gradient_descriptor(kind: GradientKind, gradient: &GradientPaint) -> Canonical<String> {
    if gradient.gradient_stops.is_empty() {
        return Err(Malformed::EmptyGradient);
    }

    let mut stops = Vec::with_capacity(gradient.gradient_stops.len());
    for stop in &gradient.gradient_stops {
        if !stop.color.is_finite() {
            return Err(Malformed::NonFiniteColor);
        }
        stops.push(rgb_to_hex(stop.color.rgb()));
    }

    Ok(format!("{}: {}", kind.as_str(), stops.join(" → ")))
}

#[allow(clippy::cast_possible_truncation)]
fn shadow_descriptor(tag: &str, shadow: &ShadowEffect) -> Canonical<String> {
    if !shadow.color.is_finite() {
        return Err(Malformed::NonFiniteColor);
    }
    let alpha = (shadow.color.a.clamp(0.0, 1.0) * 100.0).round() as u8;
    Ok(format!("{tag}: {} @ {alpha}%", rgb_to_hex(shadow.color.rgb())))
}

#[allow(clippy::cast_possible_truncation)]
fn blur_descriptor(tag: &str, blur: &BlurEffect) -> Canonical<String> {
    if !blur.radius.is_finite() {
        return Err(Malformed::NonFiniteRadius);
    }
    Ok(format!("{tag}: {}px", blur.radius.round() as i64))
}

/// Descriptor of an effect, `None` for unrecognized kinds.
///
/// # Errors
///
/// Fails on non-finite shadow colors or blur radii.
pub fn effect_descriptor(effect: &Effect) -> Canonical<Option<String>> {
    match effect {
        Effect::DropShadow(shadow) => shadow_descriptor("DROP_SHADOW", shadow).map(Some),
        Effect::InnerShadow(shadow) => shadow_descriptor("INNER_SHADOW", shadow).map(Some),
        Effect::LayerBlur(blur) => blur_descriptor("LAYER_BLUR", blur).map(Some),
        Effect::BackgroundBlur(blur) => blur_descriptor("BACKGROUND_BLUR", blur).map(Some),
        Effect::Unknown => Ok(None),
    }
}

/// Name of the text style applied to a node.
///
/// Unset, mixed, and dangling style ids all yield `None`.
pub fn text_style_name<H: DocumentHost + ?Sized>(node: &Node, host: &H) -> Option<String> {
    if !node.capabilities().contains(NodeCapabilities::TEXT_STYLE) {
        return None;
    }
    let id = node.text_style_id.style_id()?;
    host.style_by_id(id).map(|style| style.name)
}

/// One color seen on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSighting {
    /// Hard-coded solid color
    Direct { hex: String },
    /// Solid color bound to a variable
    Bound { hex: String, variable: VariableId },
    /// Gradient, always counted as a direct use
    Gradient { descriptor: String },
}

/// Canonicalized attachments of one node.
#[derive(Debug, Clone)]
pub struct NodeDigest<'a> {
    /// The node itself
    pub node: &'a Node,
    /// Fill colors, then stroke colors when enabled, in paint order
    pub colors: Vec<ColorSighting>,
    /// Effect descriptors in effect order
    pub effects: Vec<String>,
    /// Resolved text style name
    pub text_style: Option<String>,
}

impl<'a> NodeDigest<'a> {
    /// Canonicalize every attachment of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NodeProcessing`] if any attachment is malformed.
    pub fn from_node<H: DocumentHost + ?Sized>(
        node: &'a Node,
        host: &H,
        include_strokes: bool,
    ) -> Result<Self> {
        let fail = |reason: Malformed| CoreError::node_processing(&node.id, reason);

        let mut colors = Vec::new();
        for paint in node.fill_paints() {
            if let Some(sighting) = Self::sighting(paint, true).map_err(fail)? {
                colors.push(sighting);
            }
        }
        if include_strokes {
            for paint in node.stroke_paints() {
                if let Some(sighting) = Self::sighting(paint, false).map_err(fail)? {
                    colors.push(sighting);
                }
            }
        }

        let mut effects = Vec::new();
        for effect in node.effect_list() {
            if let Some(descriptor) = effect_descriptor(effect).map_err(fail)? {
                effects.push(descriptor);
            }
        }

        Ok(Self {
            node,
            colors,
            effects,
            text_style: text_style_name(node, host),
        })
    }

    fn sighting(paint: &Paint, with_gradients: bool) -> Canonical<Option<ColorSighting>> {
        match paint {
            Paint::Solid(solid) => {
                let hex = solid_hex(solid)?;
                Ok(Some(match solid.bound_color() {
                    Some(variable) => ColorSighting::Bound {
                        hex,
                        variable: variable.clone(),
                    },
                    None => ColorSighting::Direct { hex },
                }))
            }
            Paint::Unknown => Ok(None),
            _ => match paint.as_gradient() {
                Some((kind, gradient)) if with_gradients => Ok(Some(ColorSighting::Gradient {
                    descriptor: gradient_descriptor(kind, gradient)?,
                })),
                _ => Ok(None),
            },
        }
    }

    /// Variables bound by color sightings, in sighting order.
    pub fn bound_variables(&self) -> impl Iterator<Item = &VariableId> {
        self.colors.iter().filter_map(|sighting| match sighting {
            ColorSighting::Bound { variable, .. } => Some(variable),
            _ => None,
        })
    }
}
