//! # PDF Content Streams
//!
//! Writes laid-out lines as PDF page content-stream operators. Each run
//! becomes its own text object:
//!
//! ```text
//! BT
//! 0.000 0.000 0.000 rg
//! /F0 18.0 Tf
//! 72.00 700.00 Td
//! (Hello) Tj
//! ET
//! ```
//!
//! Page coordinates come in with y growing downwards and are flipped against
//! the page height. Standard fonts are written as WinAnsi literal strings,
//! custom fonts as hex glyph ids (the font is expected to be embedded with
//! Identity-H encoding by whoever assembles the document).
//!
//! The renderer only produces the stream. It records which fonts and links it
//! used so the caller can build the page's resource dictionary and
//! annotations.

use std::fmt::Write;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::{Font, StandardFont};
use crate::layout::{GlyphRun, Line, Rect};
use crate::style::{Color, TextDecorationStyle};

use super::{ContainerView, Renderer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Stroke each line's rectangle. Debugging aid.
    pub outline_lines: bool,
}

/// A font referenced by the stream as `/{name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontResource {
    pub name: String,
    pub base_font: String,
    pub custom: bool,
}

/// A clickable area for a run carrying a link, in PDF user space
/// (origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub struct LinkArea {
    pub rect: Rect,
    pub href: String,
}

pub struct ContentStreamRenderer {
    page_height: f64,
    options: RenderOptions,
    stream: String,
    fonts: Vec<FontResource>,
    links: Vec<LinkArea>,
}

impl ContentStreamRenderer {
    pub fn new(page_height: f64, options: RenderOptions) -> Self {
        Self {
            page_height,
            options,
            stream: String::new(),
            fonts: Vec::new(),
            links: Vec::new(),
        }
    }

    /// The operators written so far.
    pub fn content(&self) -> &str {
        &self.stream
    }

    pub fn fonts(&self) -> &[FontResource] {
        &self.fonts
    }

    pub fn links(&self) -> &[LinkArea] {
        &self.links
    }

    /// The uncompressed stream.
    pub fn finish(self) -> Vec<u8> {
        self.stream.into_bytes()
    }

    /// The stream deflated for a `/FlateDecode` filter.
    pub fn finish_compressed(self) -> Vec<u8> {
        compress_to_vec_zlib(self.stream.as_bytes(), 6)
    }

    /// Resource name for `font`, registering it on first use. Text without a
    /// resolved font is drawn in Helvetica, matching how it was measured.
    fn font_resource(&mut self, font: Option<&Font>) -> (String, bool) {
        let (base_font, custom) = match font {
            Some(font) => (font.base_font_name(), font.is_custom()),
            None => (StandardFont::Helvetica.pdf_name().to_string(), false),
        };
        if let Some(existing) = self.fonts.iter().find(|f| f.base_font == base_font) {
            return (existing.name.clone(), existing.custom);
        }
        let name = format!("F{}", self.fonts.len());
        self.fonts.push(FontResource {
            name: name.clone(),
            base_font,
            custom,
        });
        (name, custom)
    }

    fn write_line(&mut self, line: &Line) {
        let page_height = self.page_height;

        if self.options.outline_lines {
            let _ = write!(
                self.stream,
                "q\n0.000 0.000 1.000 RG\n0.50 w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                line.rect.x,
                page_height - line.rect.y - line.rect.height,
                line.rect.width,
                line.rect.height
            );
        }

        let baseline_y = page_height - (line.rect.y + line.content.baseline);
        for run in &line.content.runs {
            let x = line.rect.x + run.x;
            self.write_run(run, x, baseline_y);

            if let Some(href) = &run.attributes.link {
                self.links.push(LinkArea {
                    rect: Rect::new(
                        x,
                        page_height - line.rect.y - line.rect.height,
                        run.width,
                        line.rect.height,
                    ),
                    href: href.clone(),
                });
            }
        }
    }

    fn write_run(&mut self, run: &GlyphRun, x: f64, y: f64) {
        let attrs = &run.attributes;
        if run.text.is_empty() {
            return;
        }

        let (font_name, custom) = self.font_resource(attrs.font.as_deref());
        let _ = write!(
            self.stream,
            "BT\n{:.3} {:.3} {:.3} rg\n/{} {:.1} Tf\n{:.2} {:.2} Td\n",
            attrs.color.r, attrs.color.g, attrs.color.b, font_name, attrs.font_size, x, y
        );
        match attrs.font.as_deref().filter(|_| custom) {
            Some(font) => {
                let mut hex = String::new();
                for ch in run.text.chars() {
                    let _ = write!(hex, "{:04X}", font.glyph_id(ch).unwrap_or(0));
                }
                let _ = writeln!(self.stream, "<{}> Tj", hex);
            }
            None => {
                let _ = writeln!(self.stream, "({}) Tj", encode_winansi(&run.text));
            }
        }
        self.stream.push_str("ET\n");

        if attrs.underline {
            self.write_underline(
                x,
                y,
                run.width,
                attrs.font_size,
                attrs.underline_color,
                attrs.underline_style.unwrap_or_default(),
            );
        }
    }

    fn write_underline(
        &mut self,
        x: f64,
        baseline_y: f64,
        width: f64,
        font_size: f64,
        color: Color,
        style: TextDecorationStyle,
    ) {
        let thickness = (font_size * 0.05).max(0.5);
        let y = baseline_y - font_size * 0.1;

        let _ = write!(
            self.stream,
            "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n",
            color.r, color.g, color.b, thickness
        );
        match style {
            TextDecorationStyle::Dotted => {
                let _ = writeln!(self.stream, "[{:.2} {:.2}] 0 d", thickness, thickness * 2.0);
            }
            TextDecorationStyle::Dashed => {
                let _ = writeln!(
                    self.stream,
                    "[{:.2} {:.2}] 0 d",
                    thickness * 4.0,
                    thickness * 2.0
                );
            }
            // Wavy is drawn as a straight stroke
            TextDecorationStyle::Solid | TextDecorationStyle::Double | TextDecorationStyle::Wavy => {}
        }

        self.write_segment(x, y, width);
        if style == TextDecorationStyle::Double {
            self.write_segment(x, y - thickness * 2.0, width);
        }
        self.stream.push_str("Q\n");
    }

    fn write_segment(&mut self, x: f64, y: f64, width: f64) {
        let _ = write!(
            self.stream,
            "{:.2} {:.2} m\n{:.2} {:.2} l\nS\n",
            x,
            y,
            x + width,
            y
        );
    }
}

impl Renderer for ContentStreamRenderer {
    fn render(&mut self, view: &ContainerView<'_>) {
        for line in view.lines() {
            self.write_line(line);
        }
    }
}

/// Encode text as the body of a PDF literal string in WinAnsiEncoding.
/// Characters with no WinAnsi code become `?`.
fn encode_winansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match unicode_to_winansi(ch).unwrap_or(b'?') {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b @ 0x20..=0x7E => out.push(b as char),
            b => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

/// Map a character to its Windows-1252 byte, if it has one.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91), // Curly quotes
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98),
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}
