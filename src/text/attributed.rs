//! Flattening a text tree into an attributed string.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::font::FontSource;
use crate::model::{TextChild, TextNode};
use crate::style::TextDecoration;

use super::transform::transform_text;
use super::{AttributedString, Attributes, Fragment};

/// Walks a text node and produces its fragments in document order.
///
/// Leaf children become one fragment each, carrying the node's computed
/// style. Nested nodes contribute their own fragments verbatim.
pub struct AttributedStringBuilder<'a> {
    fonts: &'a dyn FontSource,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> AttributedStringBuilder<'a> {
    pub fn new(fonts: &'a dyn FontSource, diagnostics: &'a dyn Diagnostics) -> Self {
        Self { fonts, diagnostics }
    }

    pub fn build(&self, node: &TextNode) -> AttributedString {
        AttributedString::from_fragments(self.fragments(node))
    }

    pub fn fragments(&self, node: &TextNode) -> Vec<Fragment> {
        let style = node.style.compute();

        if style.legacy_align {
            self.diagnostics.report(Diagnostic::DeprecatedAlign);
        }

        let mut fragments = Vec::new();
        let mut font_reported = false;

        for child in &node.children {
            match child {
                TextChild::Leaf(text) => {
                    let font = self.fonts.get_font(&style.font_family);
                    if font.is_none() && !font_reported {
                        self.diagnostics.report(Diagnostic::UnresolvedFont {
                            family: style.font_family.clone(),
                        });
                        font_reported = true;
                    }

                    fragments.push(Fragment {
                        text: transform_text(text, style.text_transform),
                        attributes: Attributes {
                            font,
                            color: style.color,
                            font_size: style.font_size,
                            link: node.href.clone(),
                            align: style.text_align,
                            underline: style.text_decoration == TextDecoration::Underline,
                            underline_color: style.text_decoration_color.unwrap_or(style.color),
                            underline_style: style.text_decoration_style,
                        },
                    });
                }
                TextChild::Nested(nested) => fragments.extend(self.fragments(nested)),
            }
        }

        fragments
    }
}
