//! The built-in layout engine: measures characters with font metrics, breaks
//! them into lines and stacks the lines top to bottom.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::font::fallback_metrics;
use crate::style::TextAlign;
use crate::text::{is_newline, AttributedString, Attributes, LineBreakStrategy, LineSpan};

use super::{Block, Container, GlyphRun, LayoutEngine, LayoutResult, Line, LineContent, Rect};

/// Tuning for [`TextLayoutEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Line height as a multiple of the largest font size on the line.
    pub line_height: f64,
    pub strategy: LineBreakStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            line_height: 1.2,
            strategy: LineBreakStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextLayoutEngine {
    config: EngineConfig,
}

impl TextLayoutEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn with_strategy(strategy: LineBreakStrategy) -> Self {
        Self::new(EngineConfig {
            strategy,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Advance width of `ch`. Text without a resolved font is measured as
/// Helvetica.
fn measure(ch: char, attrs: &Attributes) -> f64 {
    if is_newline(ch) {
        return 0.0;
    }
    match &attrs.font {
        Some(font) => font.char_width(ch, attrs.font_size),
        None => fallback_metrics().char_width(ch, attrs.font_size),
    }
}

/// (ascent, descent) in points, descent negative.
fn vertical_metrics(attrs: &Attributes) -> (f64, f64) {
    match &attrs.font {
        Some(font) => (font.ascent(attrs.font_size), font.descent(attrs.font_size)),
        None => {
            let m = fallback_metrics();
            (
                m.ascender as f64 / 1000.0 * attrs.font_size,
                m.descender as f64 / 1000.0 * attrs.font_size,
            )
        }
    }
}

impl LayoutEngine for TextLayoutEngine {
    fn layout(
        &self,
        string: &AttributedString,
        container: &Container,
    ) -> Result<LayoutResult, FlowError> {
        let bounds = container.bounds;
        // Also rejects NaN
        if !(bounds.width > 0.0 && bounds.height > 0.0) {
            log::debug!(
                "container {}x{} has no area, laying out no lines",
                bounds.width,
                bounds.height
            );
            return Ok(LayoutResult {
                blocks: vec![Block::default()],
            });
        }

        let styled = string.styled_chars();
        let fragments = string.fragments();
        let attrs: Vec<Arc<Attributes>> = fragments
            .iter()
            .map(|f| Arc::new(f.attributes.clone()))
            .collect();

        let chars: Vec<char> = styled.iter().map(|&(ch, _)| ch).collect();
        let widths: Vec<f64> = styled
            .iter()
            .map(|&(ch, idx)| measure(ch, &attrs[idx]))
            .collect();

        let spans = self.config.strategy.break_lines(&chars, &widths, bounds.width);

        let mut lines = Vec::with_capacity(spans.len());
        let mut y = bounds.y;
        let bottom = bounds.y + bounds.height;

        for (n, span) in spans.iter().enumerate() {
            // A blank line takes its metrics from the terminator it sits on
            let owners: Vec<usize> = if span.start < span.end {
                styled[span.start..span.end].iter().map(|&(_, idx)| idx).collect()
            } else {
                styled
                    .get(span.start)
                    .or_else(|| styled.last())
                    .map(|&(_, idx)| vec![idx])
                    .unwrap_or_default()
            };

            let font_size = owners
                .iter()
                .map(|&idx| attrs[idx].font_size)
                .fold(0.0_f64, f64::max);
            let height = font_size * self.config.line_height;

            if y + height > bottom + 1e-9 {
                log::debug!(
                    "dropping {} of {} lines that overflow container height {}",
                    spans.len() - n,
                    spans.len(),
                    bounds.height
                );
                break;
            }

            let (ascent, descent) = owners
                .iter()
                .map(|&idx| vertical_metrics(&attrs[idx]))
                .fold((0.0_f64, 0.0_f64), |(a, d), (la, ld)| (a.max(la), d.min(ld)));
            // Half-leading above and below the glyph box
            let baseline = (height - (ascent - descent)) / 2.0 + ascent;

            let align = owners
                .first()
                .map_or(TextAlign::Left, |&idx| attrs[idx].align);
            let slack = (bounds.width - span.width).max(0.0);
            let x_offset = match align {
                TextAlign::Left | TextAlign::Justify => 0.0,
                TextAlign::Right => slack,
                TextAlign::Center => slack / 2.0,
            };

            lines.push(Line {
                rect: Rect::new(bounds.x + x_offset, y, span.width, height),
                content: LineContent {
                    runs: build_runs(span, &styled, &widths, &attrs),
                    baseline,
                },
            });
            y += height;
        }

        Ok(LayoutResult {
            blocks: vec![Block { lines }],
        })
    }
}

/// Group a span's characters into runs of consecutive same-fragment chars.
fn build_runs(
    span: &LineSpan,
    styled: &[(char, usize)],
    widths: &[f64],
    attrs: &[Arc<Attributes>],
) -> Vec<GlyphRun> {
    let mut runs: Vec<GlyphRun> = Vec::new();
    let mut current: Option<usize> = None;
    let mut x = 0.0;

    for i in span.start..span.end {
        let (ch, idx) = styled[i];
        if is_newline(ch) {
            continue;
        }
        match runs.last_mut() {
            Some(run) if current == Some(idx) => {
                run.text.push(ch);
                run.width += widths[i];
            }
            _ => {
                runs.push(GlyphRun {
                    text: ch.to_string(),
                    x,
                    width: widths[i],
                    attributes: attrs[idx].clone(),
                });
                current = Some(idx);
            }
        }
        x += widths[i];
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectedDiagnostics;
    use crate::font::FontContext;
    use crate::model::TextNode;
    use crate::style::TextStyle;
    use crate::text::AttributedStringBuilder;

    fn courier(size: f64) -> TextStyle {
        TextStyle {
            font_family: Some("Courier".to_string()),
            font_size: Some(size),
            ..Default::default()
        }
    }

    fn build(node: &TextNode) -> AttributedString {
        let fonts = FontContext::new();
        let diagnostics = CollectedDiagnostics::new();
        AttributedStringBuilder::new(&fonts, &diagnostics).build(node)
    }

    fn lay_out(node: &TextNode, width: f64, height: f64) -> LayoutResult {
        TextLayoutEngine::with_strategy(LineBreakStrategy::Greedy)
            .layout(&build(node), &Container::rect(width, height))
            .unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_single_line_metrics() {
        let result = lay_out(&TextNode::text("Hello", TextStyle::default()), 500.0, 500.0);
        assert_eq!(result.blocks.len(), 1);
        assert_eq!(result.line_count(), 1);
        let line = &result.lines()[0];
        assert!(approx(line.rect.height, 18.0 * 1.2));
        assert_eq!(line.rect.y, 0.0);
        assert!(line.content.baseline > 0.0 && line.content.baseline < line.rect.height);
        assert_eq!(line.text(), "Hello");
    }

    #[test]
    fn test_wraps_and_stacks_lines() {
        // Courier 10pt: every char is 6pt wide
        let result = lay_out(&TextNode::text("aaaa bbbb cccc", courier(10.0)), 60.0, 500.0);
        let texts: Vec<String> = result.lines().iter().map(|l| l.text()).collect();
        assert_eq!(texts, vec!["aaaa bbbb ", "cccc"]);
        assert!(approx(result.lines()[0].rect.width, 54.0));
        assert!(approx(result.lines()[1].rect.y, 12.0));
    }

    #[test]
    fn test_degenerate_container_is_empty() {
        let node = TextNode::text("Hello", TextStyle::default());
        assert_eq!(lay_out(&node, 0.0, 100.0).line_count(), 0);
        assert_eq!(lay_out(&node, 100.0, -1.0).line_count(), 0);
        assert_eq!(lay_out(&node, f64::NAN, 100.0).line_count(), 0);
    }

    #[test]
    fn test_empty_string_has_no_lines() {
        assert_eq!(lay_out(&TextNode::default(), 100.0, 100.0).line_count(), 0);
    }

    #[test]
    fn test_lines_past_container_bottom_are_dropped() {
        let result = lay_out(&TextNode::text("a\nb\nc", courier(10.0)), 100.0, 25.0);
        let texts: Vec<String> = result.lines().iter().map(|l| l.text()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_alignment_offsets() {
        let mut style = courier(10.0);
        style.text_align = Some(TextAlign::Right);
        let right = lay_out(&TextNode::text("ab", style.clone()), 100.0, 100.0);
        assert!(approx(right.lines()[0].rect.x, 88.0));

        style.text_align = Some(TextAlign::Center);
        let center = lay_out(&TextNode::text("ab", style.clone()), 100.0, 100.0);
        assert!(approx(center.lines()[0].rect.x, 44.0));

        style.text_align = Some(TextAlign::Justify);
        let justify = lay_out(&TextNode::text("ab", style), 100.0, 100.0);
        assert_eq!(justify.lines()[0].rect.x, 0.0);
    }

    #[test]
    fn test_unresolved_font_measured_as_helvetica() {
        let style = TextStyle {
            font_family: Some("Nope".to_string()),
            font_size: Some(10.0),
            ..Default::default()
        };
        let result = lay_out(&TextNode::text("a", style), 100.0, 100.0);
        assert_eq!(result.line_count(), 1);
        assert!(approx(result.lines()[0].rect.width, 5.56));
        assert!(result.lines()[0].content.runs[0].attributes.font.is_none());
    }

    #[test]
    fn test_runs_split_by_fragment_and_tallest_font_wins() {
        let node = TextNode::new(
            courier(10.0),
            vec!["ab".into(), TextNode::text("cd", courier(20.0)).into()],
        );
        let result = lay_out(&node, 500.0, 500.0);
        let line = &result.lines()[0];
        assert_eq!(line.content.runs.len(), 2);
        assert_eq!(line.content.runs[0].text, "ab");
        assert_eq!(line.content.runs[1].text, "cd");
        assert!(approx(line.content.runs[1].x, 12.0));
        assert!(approx(line.rect.height, 24.0));
    }

    #[test]
    fn test_blank_line_keeps_height() {
        let result = lay_out(&TextNode::text("a\n\nb", courier(10.0)), 100.0, 100.0);
        assert_eq!(result.line_count(), 3);
        assert!(approx(result.lines()[1].rect.height, 12.0));
        assert!(result.lines()[1].content.runs.is_empty());
    }

    #[test]
    fn test_engine_config_from_json() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "lineHeight": 1.5, "strategy": "greedy" }"#).unwrap();
        assert_eq!(config.line_height, 1.5);
        assert_eq!(config.strategy, LineBreakStrategy::Greedy);
        let defaults: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, EngineConfig::default());
        assert_eq!(defaults.strategy, LineBreakStrategy::KnuthPlass);
    }
}
