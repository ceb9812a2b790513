//! # Layout
//!
//! Turning an attributed string into positioned lines, and paginating those
//! lines across regions.
//!
//! Layout happens once per text node. The result is immutable and shared
//! behind an `Arc`; every page a node spans holds a [`TextWindow`] over its
//! own `[start, end)` range of the same line sequence. Splitting a window for
//! the next page never copies line data and never re-runs layout.
//!
//! ```text
//! TextNode ──build──▶ AttributedString ──LayoutEngine──▶ LayoutResult
//!                                                           │ (Arc)
//!                         TextWindow [0, n) ◀───────────────┘
//!                           │ splice(h)
//!                           ├──▶ head [0, k)   rendered on this page
//!                           └──▶ tail [k, n)   carried to the next
//! ```

pub mod engine;
pub mod window;

use std::sync::Arc;

use crate::diagnostics::{Diagnostics, LogDiagnostics};
use crate::error::FlowError;
use crate::font::FontContext;
use crate::model::TextNode;
use crate::text::{AttributedString, AttributedStringBuilder, Attributes};

pub use engine::{EngineConfig, TextLayoutEngine};
pub use window::{paginate, TextWindow};

/// An axis-aligned rectangle in points, y growing downwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// The region text is laid out into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container {
    pub bounds: Rect,
}

impl Container {
    /// A rectangular container at the origin.
    pub fn rect(width: f64, height: f64) -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, width, height),
        }
    }
}

/// A run of characters on one line sharing one set of attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    pub text: String,
    /// Offset from the line's left edge.
    pub x: f64,
    pub width: f64,
    pub attributes: Arc<Attributes>,
}

/// What a line draws. Opaque to pagination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineContent {
    pub runs: Vec<GlyphRun>,
    /// Distance from the line's top edge to its baseline.
    pub baseline: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub rect: Rect,
    pub content: LineContent,
}

impl Line {
    /// A copy of this line moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            rect: self.rect.translate(dx, dy),
            content: self.content.clone(),
        }
    }

    /// The line's text, runs concatenated.
    pub fn text(&self) -> String {
        self.content.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub lines: Vec<Line>,
}

/// What a layout engine produces: blocks of lines. Only the first block is
/// paginated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    pub blocks: Vec<Block>,
}

impl LayoutResult {
    pub fn lines(&self) -> &[Line] {
        self.blocks
            .first()
            .map(|b| b.lines.as_slice())
            .unwrap_or(&[])
    }

    pub fn line_count(&self) -> usize {
        self.lines().len()
    }
}

/// Lays an attributed string out inside a container.
///
/// Implementations must be pure functions of their inputs: the same engine
/// value is shared by every node a [`Typesetter`] lays out.
pub trait LayoutEngine {
    fn layout(
        &self,
        string: &AttributedString,
        container: &Container,
    ) -> Result<LayoutResult, FlowError>;
}

/// Everything needed to turn text nodes into lines: the layout engine, the
/// font registry, and where diagnostics go.
///
/// One typesetter is constructed up front and passed by reference to every
/// [`TextWindow::layout`] call.
pub struct Typesetter {
    engine: Box<dyn LayoutEngine>,
    fonts: FontContext,
    diagnostics: Box<dyn Diagnostics>,
}

impl Default for Typesetter {
    fn default() -> Self {
        Self::new()
    }
}

impl Typesetter {
    /// Knuth-Plass layout, the standard fonts, diagnostics to `log`.
    pub fn new() -> Self {
        Self {
            engine: Box::new(TextLayoutEngine::default()),
            fonts: FontContext::new(),
            diagnostics: Box::new(LogDiagnostics),
        }
    }

    pub fn with_engine(mut self, engine: impl LayoutEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    pub fn with_fonts(mut self, fonts: FontContext) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + 'static) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    pub fn fonts(&self) -> &FontContext {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontContext {
        &mut self.fonts
    }

    /// Flatten a node into its attributed string.
    pub fn attributed_string(&self, node: &TextNode) -> AttributedString {
        AttributedStringBuilder::new(&self.fonts, self.diagnostics.as_ref()).build(node)
    }

    pub fn lay_out(
        &self,
        string: &AttributedString,
        container: &Container,
    ) -> Result<LayoutResult, FlowError> {
        self.engine.layout(string, container)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectedDiagnostics;
    use crate::style::{TextStyle, TextTransform};

    #[test]
    fn test_layout_result_reads_first_block() {
        let line = Line {
            rect: Rect::new(0.0, 0.0, 10.0, 5.0),
            content: LineContent::default(),
        };
        let result = LayoutResult {
            blocks: vec![
                Block {
                    lines: vec![line.clone()],
                },
                Block {
                    lines: vec![line.clone(), line],
                },
            ],
        };
        assert_eq!(result.line_count(), 1);
        assert_eq!(LayoutResult::default().line_count(), 0);
    }

    #[test]
    fn test_line_translated_copy() {
        let line = Line {
            rect: Rect::new(1.0, 2.0, 3.0, 4.0),
            content: LineContent::default(),
        };
        let moved = line.translated(10.0, -2.0);
        assert_eq!(moved.rect, Rect::new(11.0, 0.0, 3.0, 4.0));
        assert_eq!(line.rect, Rect::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_typesetter_builds_with_transform() {
        let typesetter = Typesetter::new().with_diagnostics(CollectedDiagnostics::new());
        let node = TextNode::text(
            "HELLO ",
            TextStyle {
                text_transform: Some(TextTransform::Lowercase),
                ..Default::default()
            },
        );
        let string = typesetter.attributed_string(&node);
        assert_eq!(string.string(), "hello ");
        assert!(typesetter.fonts().families().any(|f| f == "Courier"));
    }

    #[test]
    fn test_typesetter_font_registration() {
        use crate::font::{FontEntry, FontSource};

        let mut typesetter = Typesetter::new();
        let broken = FontEntry {
            family: "Broken".to_string(),
            src: "AAAA".to_string(),
        };
        let err = typesetter.fonts_mut().register_entry(&broken).unwrap_err();
        assert!(matches!(err, FlowError::FontError(_)));
        assert!(typesetter.fonts().get_font("Broken").is_none());

        // A failed registration leaves the registry usable
        let node = TextNode::text(
            "x",
            TextStyle {
                font_family: Some("Courier".to_string()),
                ..Default::default()
            },
        );
        let string = typesetter.attributed_string(&node);
        assert!(string.fragments()[0].attributes.font.is_some());
    }

    #[test]
    fn test_typesetter_uses_configured_engine() {
        let engine = testing::UniformEngine::new(3, 10.0);
        let calls = engine.calls.clone();
        let typesetter = Typesetter::new().with_engine(engine);
        let result = typesetter
            .lay_out(&AttributedString::default(), &Container::rect(100.0, 100.0))
            .unwrap();
        assert_eq!(result.line_count(), 3);
        assert_eq!(calls.get(), 1);
    }
}
