//! # Rendering
//!
//! The drawing side of a text window. A window hands its translated lines to
//! a [`Renderer`] wrapped in a [`ContainerView`]; what the renderer does with
//! them (PDF operators, a canvas, a test recorder) is up to it.

pub mod content_stream;

use crate::layout::Line;

pub use content_stream::{ContentStreamRenderer, FontResource, LinkArea, RenderOptions};

/// Lines to draw, already in page coordinates.
#[derive(Debug, Clone, Copy)]
pub struct BlockView<'a> {
    pub lines: &'a [Line],
}

#[derive(Debug, Clone)]
pub struct ContainerView<'a> {
    pub blocks: Vec<BlockView<'a>>,
}

impl<'a> ContainerView<'a> {
    /// A view with one block holding `lines`.
    pub fn single(lines: &'a [Line]) -> Self {
        Self {
            blocks: vec![BlockView { lines }],
        }
    }

    /// Every line of every block, in order.
    pub fn lines(&self) -> impl Iterator<Item = &'a Line> + '_ {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }
}

/// Draws laid-out lines.
pub trait Renderer {
    fn render(&mut self, view: &ContainerView<'_>);
}
