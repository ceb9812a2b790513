//! # Attributed Text
//!
//! The flattened form of a text tree (an ordered list of fragments, each a
//! run of text with one set of attributes) and the line breaking that turns
//! it into lines of a given width.
//!
//! Break opportunities come from UAX#14. Two strategies are available: a
//! greedy first-fit breaker and a Knuth-Plass total-fit breaker that falls
//! back to greedy when a paragraph has no feasible solution.

pub mod attributed;
pub mod knuth_plass;
pub mod transform;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::Font;
use crate::style::{Color, TextAlign, TextDecorationStyle};

pub use attributed::AttributedStringBuilder;
pub use transform::transform_text;

/// Styling carried by one fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    /// `None` when the family could not be resolved.
    pub font: Option<Arc<Font>>,
    pub color: Color,
    pub font_size: f64,
    pub link: Option<String>,
    pub align: TextAlign,
    pub underline: bool,
    pub underline_color: Color,
    pub underline_style: Option<TextDecorationStyle>,
}

/// A contiguous run of text sharing one set of attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub attributes: Attributes,
}

/// An ordered sequence of fragments, read as a single character stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributedString {
    fragments: Vec<Fragment>,
}

impl AttributedString {
    pub fn from_fragments(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// The plain text of all fragments concatenated.
    pub fn string(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    /// Number of characters across all fragments.
    pub fn char_count(&self) -> usize {
        self.fragments.iter().map(|f| f.text.chars().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.iter().all(|f| f.text.is_empty())
    }

    /// Every character paired with the index of the fragment it came from.
    pub fn styled_chars(&self) -> Vec<(char, usize)> {
        self.fragments
            .iter()
            .enumerate()
            .flat_map(|(idx, f)| f.text.chars().map(move |ch| (ch, idx)))
            .collect()
    }
}

/// One line's worth of characters, as a half-open char range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
    /// Width of the span excluding trailing whitespace.
    pub width: f64,
}

/// How lines are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineBreakStrategy {
    /// Fill each line as far as it goes.
    Greedy,
    /// Minimize demerits over the whole paragraph.
    #[default]
    KnuthPlass,
}

impl LineBreakStrategy {
    /// Break `chars` (with per-char advance `widths`) into lines no wider than
    /// `max_width` where possible.
    pub fn break_lines(&self, chars: &[char], widths: &[f64], max_width: f64) -> Vec<LineSpan> {
        match self {
            LineBreakStrategy::Greedy => break_greedy(chars, widths, max_width),
            LineBreakStrategy::KnuthPlass => break_optimal(chars, widths, max_width),
        }
    }
}

pub(crate) fn is_newline(ch: char) -> bool {
    ch == '\n' || ch == '\r' || ch == '\u{2028}' || ch == '\u{2029}'
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Returns a vec of length `text.chars().count()`. Each entry is the break
/// opportunity *before* that character position (i.e. "can we break before
/// char[i]?"). Index 0 is always `None` (no break before the first char).
pub(crate) fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields the byte offset AFTER each break
    let mut byte_to_char = vec![0usize; text.len() + 1];
    let mut char_idx = 0;
    for (byte_idx, _) in text.char_indices() {
        byte_to_char[byte_idx] = char_idx;
        char_idx += 1;
    }
    byte_to_char[text.len()] = char_idx;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        // A break at the very end is implied
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

/// Build a span over `chars[start..end]`, dropping a trailing line terminator.
pub(crate) fn make_span(chars: &[char], widths: &[f64], start: usize, end: usize) -> LineSpan {
    let mut end = end.max(start);
    while end > start && is_newline(chars[end - 1]) {
        end -= 1;
    }
    let mut visible_end = end;
    while visible_end > start && chars[visible_end - 1].is_whitespace() {
        visible_end -= 1;
    }
    LineSpan {
        start,
        end,
        width: widths[start..visible_end].iter().sum(),
    }
}

/// Greedy first-fit line breaking.
pub fn break_greedy(chars: &[char], widths: &[f64], max_width: f64) -> Vec<LineSpan> {
    let mut spans = Vec::new();
    if chars.is_empty() {
        return spans;
    }

    let text: String = chars.iter().collect();
    let break_opps = compute_break_opportunities(&text);

    let mut line_start = 0;
    let mut line_width = 0.0;
    let mut last_break_point: Option<usize> = None;

    for (i, &ch) in chars.iter().enumerate() {
        let char_width = widths[i];

        // A break *before* char[i] means the previous line can end at char[i-1]
        if i > 0 {
            if let Some(opp) = break_opps[i] {
                match opp {
                    BreakOpportunity::Mandatory => {
                        spans.push(make_span(chars, widths, line_start, i));
                        line_start = i;
                        line_width = 0.0;
                        last_break_point = None;
                    }
                    BreakOpportunity::Allowed => {
                        last_break_point = Some(i - 1);
                    }
                }
            }
        }

        if is_newline(ch) {
            continue;
        }

        // Whitespace hangs past the edge instead of forcing a break
        if line_width + char_width > max_width && line_start < i && !ch.is_whitespace() {
            if let Some(bp) = last_break_point.filter(|&bp| bp >= line_start) {
                spans.push(make_span(chars, widths, line_start, bp + 1));
                line_start = bp + 1;
                line_width = chars[line_start..=i]
                    .iter()
                    .zip(widths[line_start..=i].iter())
                    .filter(|(c, _)| !is_newline(**c))
                    .map(|(_, w)| w)
                    .sum();
                last_break_point = None;
                continue;
            }

            // No break point on this line: force one before the overflowing char
            spans.push(make_span(chars, widths, line_start, i));
            line_start = i;
            line_width = char_width;
            last_break_point = None;
            continue;
        }

        line_width += char_width;
    }

    if line_start < chars.len() {
        spans.push(make_span(chars, widths, line_start, chars.len()));
    }

    spans
}

/// Knuth-Plass line breaking, paragraph by paragraph.
///
/// Mandatory breaks split the text into paragraphs that are broken
/// independently. A paragraph with no feasible solution is broken greedily.
pub fn break_optimal(chars: &[char], widths: &[f64], max_width: f64) -> Vec<LineSpan> {
    let mut spans = Vec::new();
    if chars.is_empty() {
        return spans;
    }

    let text: String = chars.iter().collect();
    let break_opps = compute_break_opportunities(&text);

    let mut bounds = Vec::new();
    let mut seg_start = 0;
    for (i, opp) in break_opps.iter().enumerate() {
        if let Some(BreakOpportunity::Mandatory) = opp {
            bounds.push((seg_start, i));
            seg_start = i;
        }
    }
    bounds.push((seg_start, chars.len()));

    for (start, end) in bounds {
        let mut end = end;
        while end > start && is_newline(chars[end - 1]) {
            end -= 1;
        }
        if start == end {
            // Blank line between two mandatory breaks
            spans.push(LineSpan {
                start,
                end,
                width: 0.0,
            });
            continue;
        }

        let seg_chars = &chars[start..end];
        let seg_widths = &widths[start..end];
        let seg_spans = match knuth_plass::break_paragraph(seg_chars, seg_widths, max_width) {
            Some(found) => found,
            None => {
                log::debug!(
                    "no feasible Knuth-Plass breaks for chars {}..{} at width {}, breaking greedily",
                    start,
                    end,
                    max_width
                );
                break_greedy(seg_chars, seg_widths, max_width)
            }
        };

        spans.extend(seg_spans.into_iter().map(|s| LineSpan {
            start: s.start + start,
            end: s.end + start,
            width: s.width,
        }));
    }

    spans
}
