//! # Text Tree
//!
//! The input representation: a text node with a style and an ordered list of
//! children. A child is either a run of plain text or another text node with
//! its own style (a nested `<Text>` inside a `<Text>`).
//!
//! Style resolution has already happened by the time a tree reaches this
//! crate: a nested node's style is complete on its own and inherits nothing
//! further from its parent here.

use crate::style::TextStyle;
use serde::{Deserialize, Serialize};

/// A styled text node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default)]
    pub children: Vec<TextChild>,
    /// Link target attached to every fragment of this node's own text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// One child of a text node. On the wire a JSON string is a leaf and a JSON
/// object is a nested node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextChild {
    Leaf(String),
    Nested(TextNode),
}

impl TextNode {
    pub fn new(style: TextStyle, children: Vec<TextChild>) -> Self {
        Self {
            style,
            children,
            href: None,
        }
    }

    /// A node with a single text leaf.
    pub fn text(content: &str, style: TextStyle) -> Self {
        Self::new(style, vec![TextChild::Leaf(content.to_string())])
    }

    pub fn with_href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }
}

impl From<&str> for TextChild {
    fn from(text: &str) -> Self {
        TextChild::Leaf(text.to_string())
    }
}

impl From<TextNode> for TextChild {
    fn from(node: TextNode) -> Self {
        TextChild::Nested(node)
    }
}

/// Edge values (top, right, bottom, left) in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Absolute position of a node's box on its page, as computed by the
/// surrounding box layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteLayout {
    pub top: f64,
    pub left: f64,
}

impl AbsoluteLayout {
    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::TextTransform;

    #[test]
    fn test_children_strings_and_objects() {
        let node: TextNode = serde_json::from_str(
            r#"{
                "style": { "fontSize": 12 },
                "children": [
                    "Hello ",
                    { "style": { "textTransform": "uppercase" }, "children": ["world"] }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[0], TextChild::Leaf("Hello ".to_string()));
        match &node.children[1] {
            TextChild::Nested(inner) => {
                assert_eq!(inner.style.text_transform, Some(TextTransform::Uppercase));
                assert_eq!(inner.children, vec![TextChild::from("world")]);
            }
            other => panic!("expected nested node, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_fields_default() {
        let node: TextNode = serde_json::from_str("{}").unwrap();
        assert!(node.children.is_empty());
        assert_eq!(node.href, None);
    }

    #[test]
    fn test_edges_helpers() {
        let e = Edges::symmetric(2.0, 5.0);
        assert_eq!(e.horizontal(), 10.0);
        assert_eq!(e.vertical(), 4.0);
        assert_eq!(Edges::uniform(1.0).left, 1.0);
    }
}
