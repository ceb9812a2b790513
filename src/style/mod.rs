//! # Text Style
//!
//! The style record a text node carries after the surrounding style system
//! has merged inherited values. Every property is optional here; the
//! defaults are filled in by [`TextStyle::compute`].
//!
//! Property names and values follow CSS spelling on the wire (`textAlign`,
//! `"line-through"`, `"uppercase"`), so the same JSON a React reconciler
//! produces can be fed straight in.

use crate::model::Edges;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";
pub const DEFAULT_FONT_SIZE: f64 = 18.0;

/// Style properties of a text node, as produced by style resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    // ── Typography ─────────────────────────────────────────────
    /// Text color. Defaults to black.
    pub color: Option<Color>,
    /// Font family name, looked up in the font context.
    pub font_family: Option<String>,
    /// Font size in points.
    pub font_size: Option<f64>,
    /// Horizontal alignment of lines.
    pub text_align: Option<TextAlign>,
    /// Legacy alias of `text_align`. Still honoured, but reported.
    pub align: Option<TextAlign>,
    pub text_transform: Option<TextTransform>,

    // ── Decoration ─────────────────────────────────────────────
    pub text_decoration: Option<TextDecoration>,
    /// Decoration color. Falls back to the text color.
    pub text_decoration_color: Option<Color>,
    pub text_decoration_style: Option<TextDecorationStyle>,

    // ── Box Model ──────────────────────────────────────────────
    /// Margin outside the node box, used when positioning lines on a page.
    pub margin: Option<Edges>,
    /// Padding inside the node box, used when positioning lines on a page.
    pub padding: Option<Edges>,
}

/// A style with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedTextStyle {
    pub color: Color,
    pub font_family: String,
    pub font_size: f64,
    pub text_align: TextAlign,
    /// Whether `text_align` came from (or coexists with) the legacy `align`.
    pub legacy_align: bool,
    pub text_transform: TextTransform,
    pub text_decoration: TextDecoration,
    pub text_decoration_color: Option<Color>,
    pub text_decoration_style: Option<TextDecorationStyle>,
    pub margin: Edges,
    pub padding: Edges,
}

impl TextStyle {
    /// Apply defaults: black Helvetica 18pt, left aligned.
    pub fn compute(&self) -> ComputedTextStyle {
        ComputedTextStyle {
            color: self.color.unwrap_or(Color::BLACK),
            font_family: self
                .font_family
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
            font_size: self.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            text_align: self.text_align.or(self.align).unwrap_or_default(),
            legacy_align: self.align.is_some(),
            text_transform: self.text_transform.unwrap_or_default(),
            text_decoration: self.text_decoration.unwrap_or_default(),
            text_decoration_color: self.text_decoration_color,
            text_decoration_style: self.text_decoration_style,
            margin: self.margin.unwrap_or_default(),
            padding: self.padding.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    Right,
    Center,
    Justify,
    /// Also taken for values this crate does not know (`start`, `initial`...).
    #[default]
    #[serde(other)]
    Left,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    Underline,
    LineThrough,
    #[default]
    #[serde(other)]
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecorationStyle {
    Double,
    Dotted,
    Dashed,
    Wavy,
    #[default]
    #[serde(other)]
    Solid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextTransform {
    Uppercase,
    Lowercase,
    Capitalize,
    #[default]
    #[serde(other)]
    None,
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorValue")]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// The accepted wire forms of a color.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorValue {
    Css(String),
    Rgba {
        r: f64,
        g: f64,
        b: f64,
        #[serde(default = "opaque")]
        a: f64,
    },
}

fn opaque() -> f64 {
    1.0
}

impl TryFrom<ColorValue> for Color {
    type Error = String;

    fn try_from(value: ColorValue) -> Result<Self, Self::Error> {
        match value {
            ColorValue::Css(s) => Color::parse(&s).ok_or_else(|| format!("unknown color \"{}\"", s)),
            ColorValue::Rgba { r, g, b, a } => Ok(Color { r, g, b, a }),
        }
    }
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse a CSS color name or a `#rgb` / `#rrggbb` hex string.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('#') {
            return Self::hex(value);
        }
        let color = match value.to_ascii_lowercase().as_str() {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "transparent" => Color::TRANSPARENT,
            "red" => Color::rgb(1.0, 0.0, 0.0),
            "green" => Color::rgb(0.0, 128.0 / 255.0, 0.0),
            "blue" => Color::rgb(0.0, 0.0, 1.0),
            "yellow" => Color::rgb(1.0, 1.0, 0.0),
            "orange" => Color::rgb(1.0, 165.0 / 255.0, 0.0),
            "purple" => Color::rgb(128.0 / 255.0, 0.0, 128.0 / 255.0),
            "gray" | "grey" => Color::rgb(128.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0),
            _ => return None,
        };
        Some(color)
    }

    /// Parse `#rgb` or `#rrggbb`.
    pub fn hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        let (r, g, b) = match hex.len() {
            3 => (
                channel(&hex[0..1].repeat(2))?,
                channel(&hex[1..2].repeat(2))?,
                channel(&hex[2..3].repeat(2))?,
            ),
            6 => (
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            ),
            _ => return None,
        };
        Some(Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        })
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let computed = TextStyle::default().compute();
        assert_eq!(computed.color, Color::BLACK);
        assert_eq!(computed.font_family, "Helvetica");
        assert_eq!(computed.font_size, 18.0);
        assert_eq!(computed.text_align, TextAlign::Left);
        assert!(!computed.legacy_align);
        assert_eq!(computed.text_transform, TextTransform::None);
    }

    #[test]
    fn test_legacy_align_fills_text_align_slot() {
        let style = TextStyle {
            align: Some(TextAlign::Center),
            ..Default::default()
        };
        let computed = style.compute();
        assert_eq!(computed.text_align, TextAlign::Center);
        assert!(computed.legacy_align);
    }

    #[test]
    fn test_text_align_wins_over_legacy_align() {
        let style = TextStyle {
            text_align: Some(TextAlign::Right),
            align: Some(TextAlign::Center),
            ..Default::default()
        };
        assert_eq!(style.compute().text_align, TextAlign::Right);
    }

    #[test]
    fn test_deserialize_css_values() {
        let style: TextStyle = serde_json::from_str(
            r##"{
                "color": "#ff0000",
                "fontFamily": "Courier",
                "textAlign": "center",
                "textDecoration": "line-through",
                "textDecorationColor": { "r": 0.0, "g": 0.0, "b": 1.0 },
                "textDecorationStyle": "dashed",
                "textTransform": "uppercase"
            }"##,
        )
        .unwrap();
        assert_eq!(style.color, Some(Color::rgb(1.0, 0.0, 0.0)));
        assert_eq!(style.text_align, Some(TextAlign::Center));
        assert_eq!(style.text_decoration, Some(TextDecoration::LineThrough));
        assert_eq!(style.text_decoration_color, Some(Color::rgb(0.0, 0.0, 1.0)));
        assert_eq!(style.text_decoration_style, Some(TextDecorationStyle::Dashed));
        assert_eq!(style.text_transform, Some(TextTransform::Uppercase));
    }

    #[test]
    fn test_unknown_transform_is_none() {
        let style: TextStyle = serde_json::from_str(r#"{ "textTransform": "small-caps" }"#).unwrap();
        assert_eq!(style.text_transform, Some(TextTransform::None));
    }

    #[test]
    fn test_unknown_decoration_is_none() {
        let style: TextStyle = serde_json::from_str(r#"{ "textDecoration": "overline" }"#).unwrap();
        assert_eq!(style.text_decoration, Some(TextDecoration::None));
        assert_eq!(style.compute().text_decoration, TextDecoration::None);
    }

    #[test]
    fn test_unknown_align_and_decoration_style_fall_back() {
        let style: TextStyle = serde_json::from_str(
            r#"{ "textAlign": "start", "align": "initial", "textDecorationStyle": "groove" }"#,
        )
        .unwrap();
        assert_eq!(style.text_align, Some(TextAlign::Left));
        assert_eq!(style.align, Some(TextAlign::Left));
        assert_eq!(style.text_decoration_style, Some(TextDecorationStyle::Solid));
        // Known values still round-trip by name
        assert_eq!(serde_json::to_string(&TextAlign::Left).unwrap(), "\"left\"");
        assert_eq!(serde_json::to_string(&TextDecorationStyle::Solid).unwrap(), "\"solid\"");
    }

    #[test]
    fn test_unknown_color_name_rejected() {
        let res: Result<TextStyle, _> = serde_json::from_str(r#"{ "color": "blurple" }"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_hex_short_and_long() {
        assert_eq!(Color::hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::hex("000000"), Some(Color::BLACK));
        assert_eq!(Color::hex("#12"), None);
        assert_eq!(Color::parse("Grey"), Color::parse("gray"));
    }
}
