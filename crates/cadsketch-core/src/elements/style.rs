//! Element styling: colors, line types, stroke/fill settings.

use peniko::Color as PenikoColor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A color string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color `{0}`, expected #rgb, #rrggbb or #rrggbbaa")]
pub struct ColorParseError(pub String);

/// RGBA8 color, serialized as a `#rrggbb` / `#rrggbbaa` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let byte = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| err());

        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = byte(0..1)? * 17;
                let g = byte(1..2)? * 17;
                let b = byte(2..3)? * 17;
                Ok(Self::rgb(r, g, b))
            }
            6 => Ok(Self::rgb(byte(0..2)?, byte(2..4)?, byte(4..6)?)),
            8 => Ok(Self::new(byte(0..2)?, byte(2..4)?, byte(4..6)?, byte(6..8)?)),
            _ => Err(err()),
        }
    }

    /// Hex form; the alpha pair is only written when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl From<PenikoColor> for Color {
    fn from(color: PenikoColor) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<Color> for PenikoColor {
    fn from(color: Color) -> Self {
        PenikoColor::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Dash pattern of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

impl LineType {
    /// Cycle to the next line type.
    pub fn next(self) -> Self {
        match self {
            LineType::Solid => LineType::Dashed,
            LineType::Dashed => LineType::Dotted,
            LineType::Dotted => LineType::DashDot,
            LineType::DashDot => LineType::Solid,
        }
    }
}

/// Style properties for elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    /// Stroke color.
    pub stroke_color: Color,
    /// Stroke width in pixels.
    pub stroke_width: f64,
    /// Dash pattern.
    #[serde(default)]
    pub line_type: LineType,
    /// Fill color (None = no fill).
    pub fill_color: Option<Color>,
    /// Fill opacity (0.0 - 1.0).
    pub fill_opacity: f64,
}

impl ElementStyle {
    /// Default stroke style derived from a layer color.
    pub fn for_layer(layer_color: Color) -> Self {
        Self {
            stroke_color: layer_color,
            stroke_width: 1.0,
            line_type: LineType::Solid,
            fill_color: None,
            fill_opacity: 0.5,
        }
    }

    /// Default text style: glyphs are filled with the layer color, unstroked.
    pub fn text_for_layer(layer_color: Color) -> Self {
        Self {
            stroke_color: layer_color,
            stroke_width: 0.0,
            line_type: LineType::Solid,
            fill_color: Some(layer_color),
            fill_opacity: 1.0,
        }
    }

    /// Fill color as a peniko Color with the fill opacity applied.
    pub fn fill_with_opacity(&self) -> Option<PenikoColor> {
        self.fill_color.map(|c| {
            let alpha = (c.a as f64 * self.fill_opacity.clamp(0.0, 1.0)).round() as u8;
            PenikoColor::from_rgba8(c.r, c.g, c.b, alpha)
        })
    }

    /// Stroke color as a peniko Color.
    pub fn stroke(&self) -> PenikoColor {
        self.stroke_color.into()
    }
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self::for_layer(Color::black())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Color::from_hex("#fff").unwrap(), Color::white());
        assert_eq!(Color::from_hex("#FF4444").unwrap(), Color::rgb(255, 68, 68));
        assert_eq!(Color::from_hex("#00000080").unwrap(), Color::new(0, 0, 0, 128));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Color::from_hex("red").is_err());
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
        assert!(Color::from_hex("#ééé").is_err());
    }

    #[test]
    fn test_hex_output() {
        assert_eq!(Color::rgb(136, 136, 136).to_hex(), "#888888");
        assert_eq!(Color::new(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Color::rgb(255, 0, 0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Color = serde_json::from_str("\"#00ff00\"").unwrap();
        assert_eq!(back, Color::rgb(0, 255, 0));
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }

    #[test]
    fn test_layer_default_style() {
        let style = ElementStyle::for_layer(Color::rgb(10, 20, 30));
        assert_eq!(style.stroke_color, Color::rgb(10, 20, 30));
        assert!((style.stroke_width - 1.0).abs() < f64::EPSILON);
        assert_eq!(style.fill_color, None);
        assert!((style.fill_opacity - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_peniko_roundtrip() {
        let c = Color::new(12, 34, 56, 78);
        let p: PenikoColor = c.into();
        assert_eq!(Color::from(p), c);
    }
}
