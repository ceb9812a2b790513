//! # Diagnostics
//!
//! Non-fatal problems found while building attributed strings. They are
//! handed to an explicit [`Diagnostics`] sink instead of being printed from
//! wherever they happen, so callers decide whether to log, collect or ignore.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A non-fatal condition encountered while preparing text for layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The node used the legacy `align` style instead of `textAlign`.
    DeprecatedAlign,
    /// No font is registered under this family; layout continues without one.
    UnresolvedFont { family: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DeprecatedAlign => write!(
                f,
                "\"align\" style prop will be deprecated on future versions. Please use \"textAlign\" instead in Text node"
            ),
            Diagnostic::UnresolvedFont { family } => {
                write!(f, "font family \"{}\" is not registered", family)
            }
        }
    }
}

/// Receives diagnostics from the attributed-string builder.
pub trait Diagnostics {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to the `log` facade at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
    }
}

/// Keeps diagnostics in memory so they can be inspected after a build.
#[derive(Debug, Default)]
pub struct CollectedDiagnostics {
    entries: RefCell<Vec<Diagnostic>>,
}

impl CollectedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything reported so far, in report order.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        self.entries.borrow_mut().drain(..).collect()
    }
}

impl Diagnostics for CollectedDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries.borrow_mut().push(diagnostic);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &D {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic)
    }
}

/// Lets a caller keep a handle on a sink it gives away to a typesetter.
impl<D: Diagnostics + ?Sized> Diagnostics for Rc<D> {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collected_keeps_order() {
        let sink = CollectedDiagnostics::new();
        sink.report(Diagnostic::DeprecatedAlign);
        sink.report(Diagnostic::UnresolvedFont {
            family: "Comic".to_string(),
        });
        assert_eq!(
            sink.entries(),
            vec![
                Diagnostic::DeprecatedAlign,
                Diagnostic::UnresolvedFont {
                    family: "Comic".to_string()
                },
            ]
        );
        assert_eq!(sink.take().len(), 2);
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn test_deprecated_align_message_names_replacement() {
        assert!(Diagnostic::DeprecatedAlign.to_string().contains("textAlign"));
    }
}
