//! Case transforms applied to leaf text before layout.

use crate::style::TextTransform;

/// Apply a text transform to a string.
///
/// `Capitalize` upper-cases the first character of the string only; words
/// after the first are left as written.
pub fn transform_text(text: &str, transform: TextTransform) -> String {
    match transform {
        TextTransform::None => text.to_string(),
        TextTransform::Uppercase => text.to_uppercase(),
        TextTransform::Lowercase => text.to_lowercase(),
        TextTransform::Capitalize => {
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_transform_none_passthrough() {
        assert_eq!(transform_text("Hello World", TextTransform::None), "Hello World");
    }

    #[test]
    fn text_transform_uppercase() {
        assert_eq!(transform_text("hello world", TextTransform::Uppercase), "HELLO WORLD");
    }

    #[test]
    fn text_transform_lowercase() {
        assert_eq!(transform_text("HELLO ", TextTransform::Lowercase), "hello ");
    }

    #[test]
    fn text_transform_capitalize_first_char_only() {
        assert_eq!(
            transform_text("hello world", TextTransform::Capitalize),
            "Hello world"
        );
        assert_eq!(transform_text("ßtraße", TextTransform::Capitalize), "SStraße");
    }

    #[test]
    fn text_transform_capitalize_empty() {
        assert_eq!(transform_text("", TextTransform::Capitalize), "");
    }
}
