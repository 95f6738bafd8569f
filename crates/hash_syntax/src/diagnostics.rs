//! Syntax diagnostics for Hash sources.

use miette::Diagnostic;
use thiserror::Error;

use crate::ast::Span;

/// A lexing or parsing error with its location.
///
/// Rendering with source context is left to the caller: attach the file contents to a
/// `miette::Report` built from this error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(hash::syntax))]
pub struct SyntaxError {
    pub message: String,
    #[label("here")]
    pub span: Span,
    #[help]
    pub hint: Option<String>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_hint() {
        let err = SyntaxError::new("Expected ';'", Span::new(1, 2)).with_hint("add a semicolon");
        assert_eq!(err.hint.as_deref(), Some("add a semicolon"));
        assert_eq!(err.to_string(), "Expected ';'");
    }
}
