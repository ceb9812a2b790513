//! # Font Management
//!
//! Resolves a family name to the font data used for measurement and drawing.
//!
//! The 12 standard PDF fonts (Helvetica, Times, Courier and their bold and
//! oblique faces) are always available and need no embedding. Custom
//! TrueType/OpenType fonts are parsed with ttf-parser when registered.
//!
//! Lookup is exact by family name. An unknown family resolves to `None`; it
//! is up to the consumer to carry on without a font.

pub mod metrics;

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::FlowError;
pub use metrics::StandardFontMetrics;

/// Looks fonts up by family name.
pub trait FontSource {
    fn get_font(&self, family: &str) -> Option<Arc<Font>>;
}

/// A resolved font: its family name and the data behind it.
#[derive(Debug, PartialEq)]
pub struct Font {
    pub family: String,
    pub data: FontData,
}

#[derive(Debug, PartialEq)]
pub enum FontData {
    /// One of the standard PDF fonts. No embedding needed.
    Standard(StandardFont),
    /// A TrueType/OpenType font that needs to be embedded.
    Custom {
        data: Vec<u8>,
        metrics: CustomFontMetrics,
    },
}

impl Font {
    /// Advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        match &self.data {
            FontData::Standard(font) => font.metrics().char_width(ch, font_size),
            FontData::Custom { metrics, .. } => metrics.char_width(ch, font_size),
        }
    }

    /// Distance from the baseline to the top of the em box, in points.
    pub fn ascent(&self, font_size: f64) -> f64 {
        let (ascender, units) = match &self.data {
            FontData::Standard(font) => (font.metrics().ascender, 1000),
            FontData::Custom { metrics, .. } => (metrics.ascender, metrics.units_per_em),
        };
        ascender as f64 / units as f64 * font_size
    }

    /// Distance from the baseline down to the bottom of descenders (negative).
    pub fn descent(&self, font_size: f64) -> f64 {
        let (descender, units) = match &self.data {
            FontData::Standard(font) => (font.metrics().descender, 1000),
            FontData::Custom { metrics, .. } => (metrics.descender, metrics.units_per_em),
        };
        descender as f64 / units as f64 * font_size
    }

    /// The name the font is referenced by in a PDF `/BaseFont` entry.
    pub fn base_font_name(&self) -> String {
        match &self.data {
            FontData::Standard(font) => font.pdf_name().to_string(),
            FontData::Custom { .. } => sanitize_font_name(&self.family),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.data, FontData::Custom { .. })
    }

    /// Glyph id for `ch` in a custom font. Standard fonts have none.
    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        match &self.data {
            FontData::Standard(_) => None,
            FontData::Custom { metrics, .. } => metrics.glyph_ids.get(&ch).copied(),
        }
    }
}

/// PDF names may not contain whitespace or delimiters.
fn sanitize_font_name(family: &str) -> String {
    family
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    /// Maps characters to their glyph IDs in the original font.
    pub glyph_ids: HashMap<char, u16>,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Result<Self, FlowError> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| FlowError::FontError(format!("cannot parse font data: {}", e)))?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();
        let mut default_advance = 0u16;

        // Basic Multilingual Plane only
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    glyph_ids.insert(ch, glyph_id.0);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            glyph_ids,
        })
    }
}

/// The standard PDF fonts supported without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    pub const ALL: [StandardFont; 12] = [
        Self::Helvetica,
        Self::HelveticaBold,
        Self::HelveticaOblique,
        Self::HelveticaBoldOblique,
        Self::TimesRoman,
        Self::TimesBold,
        Self::TimesItalic,
        Self::TimesBoldItalic,
        Self::Courier,
        Self::CourierBold,
        Self::CourierOblique,
        Self::CourierBoldOblique,
    ];

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica
            | Self::HelveticaBold
            | Self::HelveticaOblique
            | Self::HelveticaBoldOblique => &metrics::HELVETICA,
            Self::TimesRoman | Self::TimesBold | Self::TimesItalic | Self::TimesBoldItalic => {
                &metrics::TIMES
            }
            Self::Courier | Self::CourierBold | Self::CourierOblique | Self::CourierBoldOblique => {
                &metrics::COURIER
            }
        }
    }
}

/// A custom font to register, as it appears in JSON input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Font family name (e.g. "Inter", "Roboto").
    pub family: String,
    /// Base64-encoded font data, or a data URI (e.g. "data:font/ttf;base64,...").
    pub src: String,
}

impl FontEntry {
    /// Decode the font bytes from `src`.
    pub fn decode(&self) -> Result<Vec<u8>, FlowError> {
        let encoded = match self.src.split_once(";base64,") {
            Some((_, payload)) => payload,
            None => self.src.as_str(),
        };
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| {
                FlowError::FontError(format!("invalid base64 for font \"{}\": {}", self.family, e))
            })
    }
}

/// The font registry used for attributed-string construction and layout.
#[derive(Debug)]
pub struct FontContext {
    fonts: HashMap<String, Arc<Font>>,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    /// A context with the standard PDF fonts registered.
    pub fn new() -> Self {
        let mut fonts = HashMap::new();
        for font in StandardFont::ALL {
            fonts.insert(
                font.pdf_name().to_string(),
                Arc::new(Font {
                    family: font.pdf_name().to_string(),
                    data: FontData::Standard(font),
                }),
            );
        }
        // Common family alias for Times-Roman
        if let Some(times) = fonts.get("Times-Roman").cloned() {
            fonts.insert("Times".to_string(), times);
        }
        Self { fonts }
    }

    /// Register a custom font under `family`, replacing any previous entry.
    pub fn register(&mut self, family: &str, data: Vec<u8>) -> Result<(), FlowError> {
        let metrics = CustomFontMetrics::from_font_data(&data)?;
        self.fonts.insert(
            family.to_string(),
            Arc::new(Font {
                family: family.to_string(),
                data: FontData::Custom { data, metrics },
            }),
        );
        Ok(())
    }

    /// Register a font described by a JSON font entry.
    pub fn register_entry(&mut self, entry: &FontEntry) -> Result<(), FlowError> {
        let data = entry.decode()?;
        self.register(&entry.family, data)
    }

    /// Iterate over all registered family names.
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }
}

impl FontSource for FontContext {
    fn get_font(&self, family: &str) -> Option<Arc<Font>> {
        self.fonts.get(family).cloned()
    }
}

/// Metrics used to measure text whose font could not be resolved.
pub fn fallback_metrics() -> &'static StandardFontMetrics {
    StandardFont::Helvetica.metrics()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_fonts_resolve() {
        let ctx = FontContext::new();
        for font in StandardFont::ALL {
            let resolved = ctx.get_font(font.pdf_name()).expect("standard font registered");
            assert_eq!(resolved.data, FontData::Standard(font));
        }
        assert_eq!(
            ctx.get_font("Times").map(|f| f.base_font_name()),
            Some("Times-Roman".to_string())
        );
    }

    #[test]
    fn test_unknown_family_is_none() {
        let ctx = FontContext::new();
        assert!(ctx.get_font("NoSuchFont").is_none());
        assert!(ctx.get_font("helvetica").is_none(), "lookup is case-sensitive");
    }

    #[test]
    fn test_register_garbage_fails() {
        let mut ctx = FontContext::new();
        let err = ctx.register("Broken", vec![0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, FlowError::FontError(_)));
        assert!(ctx.get_font("Broken").is_none());
    }

    #[test]
    fn test_font_entry_decodes_data_uri() {
        let entry = FontEntry {
            family: "X".to_string(),
            src: "data:font/ttf;base64,AAEC".to_string(),
        };
        assert_eq!(entry.decode().unwrap(), vec![0, 1, 2]);
        let bad = FontEntry {
            family: "X".to_string(),
            src: "!!!".to_string(),
        };
        assert!(bad.decode().is_err());
    }

    #[test]
    fn test_ascent_and_descent_scale() {
        let ctx = FontContext::new();
        let helvetica = ctx.get_font("Helvetica").unwrap();
        assert!((helvetica.ascent(10.0) - 7.18).abs() < 1e-9);
        assert!((helvetica.descent(10.0) + 2.07).abs() < 1e-9);
        assert!(!helvetica.is_custom());
        assert_eq!(helvetica.glyph_id('A'), None);
    }

    #[test]
    fn test_sanitize_font_name() {
        assert_eq!(sanitize_font_name("Open Sans (Bold)"), "OpenSansBold");
    }
}
