//! Color codec: normalized RGB channels to and from `#rrggbb` strings
//!
//! Hex strings are the comparison key for fills throughout the analyzer, so
//! conversion quantizes each channel to 8 bits. Variable values are not
//! quantized the same way, which is why variable matching goes through
//! [`colors_match`] with a per-channel tolerance instead of string equality.

use super::errors::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Per-channel tolerance used when matching variable values against a color.
pub const COLOR_TOLERANCE: f64 = 0.001;

/// Normalized RGB color, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: f64,
    /// Green channel
    pub g: f64,
    /// Blue channel
    pub b: f64,
}

impl Rgb {
    /// Create a color from normalized channels.
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Check that every channel is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    /// Attach an alpha channel.
    #[must_use]
    pub const fn with_alpha(self, a: f64) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }
}

/// Normalized RGBA color as stored on effects, gradient stops, and variables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel
    pub r: f64,
    /// Green channel
    pub g: f64,
    /// Blue channel
    pub b: f64,
    /// Alpha channel, defaults to opaque when absent
    #[serde(default = "opaque")]
    pub a: f64,
}

const fn opaque() -> f64 {
    1.0
}

impl Rgba {
    /// Drop the alpha channel.
    #[must_use]
    pub const fn rgb(self) -> Rgb {
        Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }

    /// Check that every channel is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.rgb().is_finite() && self.a.is_finite()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel_to_byte(channel: f64) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Convert a normalized color to a lowercase `#rrggbb` string.
///
/// Channels are clamped to `[0, 1]` and rounded to the nearest 1/255.
///
/// # Example
///
/// ```rust
/// use dsa_core::utils::{rgb_to_hex, Rgb};
///
/// assert_eq!(rgb_to_hex(Rgb::new(1.0, 0.0, 0.0)), "#ff0000");
/// assert_eq!(rgb_to_hex(Rgb::new(0.5, 0.5, 0.5)), "#808080");
/// ```
#[must_use]
pub fn rgb_to_hex(color: Rgb) -> String {
    format!(
        "#{:02x}{:02x}{:02x}",
        channel_to_byte(color.r),
        channel_to_byte(color.g),
        channel_to_byte(color.b)
    )
}

fn hex_digits(hex: &str) -> Result<&str> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CoreError::invalid_hex(hex));
    }
    Ok(digits)
}

/// Parse `#rrggbb` or `rrggbb` into normalized channels.
///
/// # Errors
///
/// Returns [`CoreError::InvalidHex`] for anything that is not exactly six
/// hex digits with an optional leading `#`.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb> {
    let digits = hex_digits(hex)?;
    let channel = |range: core::ops::Range<usize>| -> Result<f64> {
        u8::from_str_radix(&digits[range], 16)
            .map(|byte| f64::from(byte) / 255.0)
            .map_err(|_| CoreError::invalid_hex(hex))
    };

    Ok(Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

/// Validate a hex color and return it in canonical lowercase `#rrggbb` form.
///
/// # Errors
///
/// Returns [`CoreError::InvalidHex`] when the input is malformed.
pub fn normalize_hex(hex: &str) -> Result<String> {
    let digits = hex_digits(hex)?;
    Ok(format!("#{}", digits.to_ascii_lowercase()))
}

/// Compare two colors channel by channel within `tolerance`.
#[must_use]
pub fn colors_match(a: Rgb, b: Rgb, tolerance: f64) -> bool {
    (a.r - b.r).abs() < tolerance && (a.g - b.g).abs() < tolerance && (a.b - b.b).abs() < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_to_hex_pads_and_lowercases() {
        assert_eq!(rgb_to_hex(Rgb::new(1.0, 0.0, 0.0)), "#ff0000");
        assert_eq!(rgb_to_hex(Rgb::new(0.0, 0.0, 0.0)), "#000000");
        assert_eq!(rgb_to_hex(Rgb::new(1.0 / 255.0, 0.0, 1.0)), "#0100ff");
    }

    #[test]
    fn rgb_to_hex_clamps_out_of_range_channels() {
        assert_eq!(rgb_to_hex(Rgb::new(1.7, -0.2, 0.0)), "#ff0000");
    }

    #[test]
    fn hex_to_rgb_accepts_optional_hash() {
        assert_eq!(hex_to_rgb("#ff0000").unwrap(), Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(hex_to_rgb("00FF00").unwrap(), Rgb::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn hex_to_rgb_rejects_malformed_input() {
        for bad in ["", "#", "#fff", "#ff00000", "ff00zz", "##ff0000", "#ff 000", "#ÿÿÿ"] {
            assert!(
                matches!(hex_to_rgb(bad), Err(CoreError::InvalidHex(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn normalize_hex_canonicalizes() {
        assert_eq!(normalize_hex("FF00AA").unwrap(), "#ff00aa");
        assert_eq!(normalize_hex("#0a0B0c").unwrap(), "#0a0b0c");
        assert!(normalize_hex("#abc").is_err());
    }

    #[test]
    fn tolerance_matching() {
        let red = Rgb::new(1.0, 0.0, 0.0);
        assert!(colors_match(red, Rgb::new(0.9995, 0.0, 0.0), COLOR_TOLERANCE));
        assert!(!colors_match(red, Rgb::new(0.9, 0.0, 0.0), COLOR_TOLERANCE));
    }

    #[test]
    fn rgba_alpha_defaults_to_opaque() {
        let color: Rgba = serde_json::from_str(r#"{"r":1,"g":0,"b":0}"#).unwrap();
        assert!((color.a - 1.0).abs() < f64::EPSILON);
    }
}
