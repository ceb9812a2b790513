//! # Text Windows
//!
//! A [`TextWindow`] is a view of `[start, end)` over a node's laid-out lines.
//! The line sequence itself is computed once and shared; windows only move
//! their bounds.
//!
//! Pagination is a sequence of [`TextWindow::splice`] calls. Each call keeps
//! the lines that fit the given height and hands back a new window over the
//! rest:
//!
//! ```text
//! lines:  0   1   2   3   4   5
//!        [───────────────────────)   window.splice(50) with 20pt lines
//!        [───────)                   window      -> 0..2 (40pt fits)
//!                [───────────────)   returned    -> 2..6
//! ```
//!
//! A line whose bottom lands exactly on the boundary stays in the head. An
//! empty tail (`start == end`) means nothing is left to place.

use std::sync::Arc;

use crate::error::FlowError;
use crate::model::{AbsoluteLayout, TextNode};
use crate::render::{ContainerView, Renderer};

use super::{Container, LayoutResult, Line, Typesetter};

#[derive(Debug, Clone)]
enum LayoutState {
    Uncomputed,
    Computed(Arc<LayoutResult>),
}

/// A text node plus a window over its laid-out lines.
///
/// Cloning is cheap: the node and the layout result are reference counted.
#[derive(Debug, Clone)]
pub struct TextWindow {
    node: Arc<TextNode>,
    state: LayoutState,
    start: usize,
    end: usize,
}

impl TextWindow {
    /// A window bound to `node`, not yet laid out.
    pub fn new(node: impl Into<Arc<TextNode>>) -> Self {
        Self {
            node: node.into(),
            state: LayoutState::Uncomputed,
            start: 0,
            end: 0,
        }
    }

    pub fn node(&self) -> &TextNode {
        &self.node
    }

    pub fn is_computed(&self) -> bool {
        matches!(self.state, LayoutState::Computed(_))
    }

    /// The shared layout result, once computed.
    pub fn result(&self) -> Option<&Arc<LayoutResult>> {
        match &self.state {
            LayoutState::Computed(result) => Some(result),
            LayoutState::Uncomputed => None,
        }
    }

    /// Whether both windows view the same layout result.
    pub fn shares_layout_with(&self, other: &TextWindow) -> bool {
        match (self.result(), other.result()) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Lay the node out into a `width` x `height` rectangle.
    ///
    /// Runs at most once: after the first success, further calls return
    /// `Ok(())` without touching the result, whatever the dimensions. A failed
    /// call leaves the window uncomputed.
    pub fn layout(
        &mut self,
        typesetter: &Typesetter,
        width: f64,
        height: f64,
    ) -> Result<(), FlowError> {
        if self.is_computed() {
            log::trace!("text already laid out, ignoring {}x{}", width, height);
            return Ok(());
        }

        let string = typesetter.attributed_string(&self.node);
        let result = typesetter.lay_out(&string, &Container::rect(width, height))?;
        log::debug!(
            "laid out {} chars into {} lines at {}x{}",
            string.char_count(),
            result.line_count(),
            width,
            height
        );

        self.start = 0;
        self.end = result.line_count();
        self.state = LayoutState::Computed(Arc::new(result));
        self.check_bounds();
        Ok(())
    }

    /// The lines inside the window. Empty before layout.
    pub fn lines(&self) -> &[Line] {
        match &self.state {
            LayoutState::Computed(result) => &result.lines()[self.start..self.end],
            LayoutState::Uncomputed => &[],
        }
    }

    pub fn line_count(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Total height of the lines in the window, `None` before layout.
    pub fn height(&self) -> Option<f64> {
        self.result()
            .map(|_| self.lines().iter().map(|l| l.rect.height).sum())
    }

    /// Index of the first line that does not fit within `height`, in the same
    /// index space as [`start`](Self::start) and [`end`](Self::end).
    ///
    /// Returns `end` when every line fits and `start` when `height <= 0`.
    pub fn line_index_at_height(&self, height: f64) -> usize {
        if !(height > 0.0) {
            return self.start;
        }
        let mut acc = 0.0;
        for (i, line) in self.lines().iter().enumerate() {
            acc += line.rect.height;
            if acc > height {
                return self.start + i;
            }
        }
        self.end
    }

    /// Split off everything that does not fit within `height`.
    ///
    /// `self` keeps the lines that fit; the returned window holds the rest,
    /// sharing the same layout result. Fails with [`FlowError::NotLaidOut`]
    /// if [`layout`](Self::layout) has not run.
    pub fn splice(&mut self, height: f64) -> Result<TextWindow, FlowError> {
        if !self.is_computed() {
            return Err(FlowError::NotLaidOut);
        }
        let idx = self.line_index_at_height(height);
        Ok(self.split_at(idx))
    }

    fn split_at(&mut self, idx: usize) -> TextWindow {
        assert!(
            self.start <= idx && idx <= self.end,
            "split index {} outside window {}..{}",
            idx,
            self.start,
            self.end
        );
        let mut tail = self.clone();
        tail.start = idx;
        self.end = idx;
        self.check_bounds();
        tail.check_bounds();
        tail
    }

    fn check_bounds(&self) {
        let count = self.result().map_or(0, |r| r.line_count());
        assert!(
            self.start <= self.end && self.end <= count,
            "text window {}..{} invalid for {} lines",
            self.start,
            self.end,
            count
        );
    }

    /// Copies of the window's lines placed on the page.
    ///
    /// Lines move right by `left` plus the node's left margin and padding,
    /// and are re-based vertically so the window's first line starts at `top`
    /// plus the top margin and padding. The shared result is untouched.
    pub fn positioned_lines(&self, placement: AbsoluteLayout) -> Vec<Line> {
        let lines = self.lines();
        let Some(first) = lines.first() else {
            return Vec::new();
        };
        let style = self.node.style.compute();
        let dx = placement.left + style.margin.left + style.padding.left;
        let dy = placement.top + style.margin.top + style.padding.top - first.rect.y;
        lines.iter().map(|line| line.translated(dx, dy)).collect()
    }

    /// Draw the window at `placement`.
    pub fn render<R: Renderer + ?Sized>(
        &self,
        placement: AbsoluteLayout,
        renderer: &mut R,
    ) -> Result<(), FlowError> {
        if !self.is_computed() {
            return Err(FlowError::NotLaidOut);
        }
        let lines = self.positioned_lines(placement);
        renderer.render(&ContainerView::single(&lines));
        Ok(())
    }
}

/// Split a laid-out window into one window per page.
///
/// The first window gets `first_height` (what is left on the current page)
/// and may come back empty. Every following window gets a full
/// `page_height`; when not even one line fits there, the next line is placed
/// anyway so pagination always ends.
pub fn paginate(
    mut window: TextWindow,
    first_height: f64,
    page_height: f64,
) -> Result<Vec<TextWindow>, FlowError> {
    let mut tail = window.splice(first_height)?;
    let mut pages = vec![window];

    while !tail.is_empty() {
        let mut page = tail;
        let mut idx = page.line_index_at_height(page_height);
        if idx == page.start {
            log::debug!(
                "line {} does not fit a {}pt page, placing it anyway",
                idx,
                page_height
            );
            idx += 1;
        }
        tail = page.split_at(idx);
        pages.push(page);
    }

    Ok(pages)
}
