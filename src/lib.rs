//! # Pageflow
//!
//! Paginates rich text into fixed-size regions.
//!
//! A text node is laid out once, at the width of the region it flows into.
//! After that, pagination never touches the layout again: each page gets a
//! window over a contiguous range of the already computed lines, and moving
//! to the next page just hands the remaining range to a new window.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    : Text tree: nodes, leaves, styles
//!       ↓
//!   [text]     : Flatten into an attributed string, break lines
//!       ↓
//!   [layout]   : Lay out once, then splice windows page by page
//!       ↓
//!   [render]   : Place a window on its page and draw it
//! ```
//!
//! ## Example
//!
//! ```
//! use pageflow::{lay_out, paginate, parse_node, AbsoluteLayout};
//! use pageflow::render::{ContentStreamRenderer, RenderOptions};
//!
//! let node = parse_node(r#"{ "style": { "fontSize": 12 }, "children": ["Hello, world"] }"#)?;
//! let window = lay_out(node, 300.0, 10_000.0)?;
//!
//! for page in paginate(window, 100.0, 700.0)? {
//!     let mut renderer = ContentStreamRenderer::new(842.0, RenderOptions::default());
//!     page.render(AbsoluteLayout::new(72.0, 72.0), &mut renderer)?;
//!     let _stream = renderer.finish();
//! }
//! # Ok::<(), pageflow::FlowError>(())
//! ```

pub mod diagnostics;
pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod render;
pub mod style;
pub mod text;

pub use error::FlowError;
pub use layout::{paginate, TextWindow, Typesetter};
pub use model::{AbsoluteLayout, TextChild, TextNode};

/// Parse a text tree from JSON.
pub fn parse_node(json: &str) -> Result<TextNode, FlowError> {
    Ok(serde_json::from_str(json)?)
}

/// Lay a node out with the default [`Typesetter`] and return a window over
/// all of its lines.
pub fn lay_out(node: TextNode, width: f64, height: f64) -> Result<TextWindow, FlowError> {
    let typesetter = Typesetter::new();
    let mut window = TextWindow::new(node);
    window.layout(&typesetter, width, height)?;
    Ok(window)
}
