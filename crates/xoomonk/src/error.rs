//! The crate's single error type.
//!
//! One closed enum per failure family, a manual `Display` for the one-line rendering, and
//! `std::error::Error` so the CLI can use `?` freely.

use std::fmt;

use crate::lexer::Position;

/// Result alias used throughout scanning, parsing, and evaluation.
pub type XoomonkResult<T> = Result<T, XoomonkError>;

/// The closed set of error kinds from the error handling design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ErrorKind {
    SyntaxError,
    UndefinedVariable,
    UnassignedVariable,
    UnresolvedStore,
    TypeError,
    Resource,
    /// AST kind unknown to the evaluator; indicates a parser/evaluator mismatch and should be
    /// unreachable from parser-produced trees.
    Unimplemented,
}

/// A single interpreter error: a kind, a human-readable detail, and (for every kind but
/// `Unimplemented`) the source position it was raised at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XoomonkError {
    pub kind: ErrorKind,
    pub detail: String,
    pub position: Option<Position>,
}

impl XoomonkError {
    #[must_use]
    pub fn new(kind: ErrorKind, detail: impl Into<String>, position: Option<Position>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            position,
        }
    }

    pub(crate) fn syntax(detail: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::SyntaxError, detail, Some(position))
    }

    pub(crate) fn undefined_variable(name: &str, position: Position) -> Self {
        Self::new(
            ErrorKind::UndefinedVariable,
            format!("undefined variable '{name}'"),
            Some(position),
        )
    }

    pub(crate) fn unassigned_variable(name: &str, position: Position) -> Self {
        Self::new(
            ErrorKind::UnassignedVariable,
            format!("variable '{name}' is not yet assigned"),
            Some(position),
        )
    }

    pub(crate) fn unresolved_store(name: &str, position: Position) -> Self {
        Self::new(
            ErrorKind::UnresolvedStore,
            format!("attempt to assign resolved variable '{name}' while the store still has pending slots"),
            Some(position),
        )
    }

    pub(crate) fn type_error(detail: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::TypeError, detail, Some(position))
    }

    pub(crate) fn resource(detail: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::Resource, detail, Some(position))
    }

    pub(crate) fn unimplemented(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unimplemented, detail, None)
    }

    /// Renders a multi-line diagnostic suitable for `--raise-exceptions`.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self.position {
            Some(position) => format!(
                "{kind}: {detail}\n  at line {line}, column {column}",
                kind = self.kind,
                detail = self.detail,
                line = position.line,
                column = position.column,
            ),
            None => format!("{kind}: {detail}", kind = self.kind, detail = self.detail),
        }
    }
}

impl fmt::Display for XoomonkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(
                f,
                "{}:{}: {}: {}",
                position.line, position.column, self.kind, self.detail
            ),
            None => write!(f, "{}: {}", self.kind, self.detail),
        }
    }
}

impl std::error::Error for XoomonkError {}
