//! Syntax errors and the diagnostic records handed to callers.
//!
//! Message text uses the classic Lua wording; tooling should key off
//! [`SyntaxError::code`] rather than the text.

use std::fmt;

use crate::lexer::{LexError, LexErrorKind};
use crate::token::Span;

/// Classifies a syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// Scanning failed before a token could be produced.
    Lex(LexErrorKind),
    /// `'<expected>' expected near '<near>'`.
    Expected { expected: String, near: String },
    /// A closing delimiter is missing and the opener is on an earlier line.
    ExpectedToClose {
        expected: String,
        opener: String,
        opener_line: usize,
        near: String,
    },
    /// The current token cannot start or continue the production.
    UnexpectedSymbol { near: String },
    MalformedNumber { near: String },
    /// `(` on a new line after a complete prefix expression.
    AmbiguousSyntax { near: String },
    /// Assignment target is a call or parenthesized expression.
    InvalidAssignmentTarget { near: String },
    /// Expression statement that is not a call.
    InvalidCallStatement { near: String },
    /// Nesting exceeded the configured depth.
    TooManySyntaxLevels { near: String },
    /// `'<first>' or '<second>' expected near '<near>'`.
    ExpectedEither {
        first: String,
        second: String,
        near: String,
    },
    /// A method name was not followed by call arguments.
    FunctionArgumentsExpected { near: String },
}

impl SyntaxErrorKind {
    /// Stable numeric code: 1xx for lex errors, 2xx for grammar errors.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Lex(kind) => kind.code(),
            Self::Expected { .. } => 201,
            Self::ExpectedToClose { .. } => 202,
            Self::UnexpectedSymbol { .. } => 203,
            Self::MalformedNumber { .. } => 204,
            Self::AmbiguousSyntax { .. } => 205,
            Self::InvalidAssignmentTarget { .. } => 206,
            Self::InvalidCallStatement { .. } => 207,
            Self::TooManySyntaxLevels { .. } => 208,
            Self::ExpectedEither { .. } => 209,
            Self::FunctionArgumentsExpected { .. } => 210,
        }
    }
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(kind) => write!(f, "{kind}"),
            Self::Expected { expected, near } => {
                write!(f, "'{expected}' expected near '{near}'")
            }
            Self::ExpectedToClose {
                expected,
                opener,
                opener_line,
                near,
            } => write!(
                f,
                "'{expected}' expected (to close '{opener}' at line {opener_line}) near '{near}'"
            ),
            Self::UnexpectedSymbol { near } => {
                write!(f, "unexpected symbol near '{near}'")
            }
            Self::MalformedNumber { near } => {
                write!(f, "malformed number near '{near}'")
            }
            Self::AmbiguousSyntax { near } => {
                write!(
                    f,
                    "ambiguous syntax (function call x new statement) near '{near}'"
                )
            }
            Self::InvalidAssignmentTarget { near } | Self::InvalidCallStatement { near } => {
                write!(f, "syntax error near '{near}'")
            }
            Self::TooManySyntaxLevels { near } => {
                write!(f, "chunk has too many syntax levels near '{near}'")
            }
            Self::ExpectedEither {
                first,
                second,
                near,
            } => write!(f, "'{first}' or '{second}' expected near '{near}'"),
            Self::FunctionArgumentsExpected { near } => {
                write!(f, "function arguments expected near '{near}'")
            }
        }
    }
}

/// The single fatal error a parse can produce.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "{chunk_name}: {kind} (line {}, column {})",
    span.start.line,
    span.start.column
)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// The offending token, or the scan position for lex errors.
    pub span: Span,
    /// Source unit name, for display only.
    pub chunk_name: String,
}

impl SyntaxError {
    #[must_use]
    pub fn new(kind: SyntaxErrorKind, span: Span, chunk_name: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            chunk_name: chunk_name.into(),
        }
    }

    /// Wrap a lexer failure, keeping its position.
    #[must_use]
    pub fn from_lex(error: LexError, chunk_name: impl Into<String>) -> Self {
        Self::new(SyntaxErrorKind::Lex(error.kind), error.span, chunk_name)
    }

    /// Full message text without the chunk name.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "{} (line {}, column {})",
            self.kind, self.span.start.line, self.span.start.column
        )
    }

    #[must_use]
    pub const fn code(&self) -> u16 {
        self.kind.code()
    }

    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            message: self.message(),
            span: self.span,
            code: self.code(),
            severity: Severity::Error,
            chunk_name: self.chunk_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A structured report delivered to a [`DiagnosticSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub code: u16,
    pub severity: Severity,
    pub chunk_name: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}[{}]: {}",
            self.chunk_name, self.severity, self.code, self.message
        )
    }
}

/// Receiver for diagnostics; display and aggregation are up to the caller.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Position;

    fn at(line: usize, column: usize) -> Span {
        Span::empty(Position::new(line, column, 0))
    }

    #[test]
    fn simple_expectation_wording() {
        let err = SyntaxError::new(
            SyntaxErrorKind::Expected {
                expected: "then".to_string(),
                near: "x".to_string(),
            },
            at(3, 7),
            "main.lua",
        );
        assert_eq!(err.message(), "'then' expected near 'x' (line 3, column 7)");
        assert_eq!(
            err.to_string(),
            "main.lua: 'then' expected near 'x' (line 3, column 7)"
        );
        assert_eq!(err.code(), 201);
    }

    #[test]
    fn matched_delimiter_wording() {
        let err = SyntaxError::new(
            SyntaxErrorKind::ExpectedToClose {
                expected: "end".to_string(),
                opener: "function".to_string(),
                opener_line: 1,
                near: "<eof>".to_string(),
            },
            at(4, 1),
            "<unknown>",
        );
        assert_eq!(
            err.message(),
            "'end' expected (to close 'function' at line 1) near '<eof>' (line 4, column 1)"
        );
    }

    #[test]
    fn lex_errors_keep_their_code() {
        let lex = LexError {
            kind: LexErrorKind::UnfinishedLongString,
            span: at(2, 5),
        };
        let err = SyntaxError::from_lex(lex, "x.lua");
        assert_eq!(err.code(), 102);
        assert_eq!(
            err.message(),
            "unfinished long string near '<eof>' (line 2, column 5)"
        );
    }

    #[test]
    fn diagnostics_reach_the_sink() {
        let err = SyntaxError::new(
            SyntaxErrorKind::UnexpectedSymbol {
                near: ")".to_string(),
            },
            at(1, 4),
            "<unknown>",
        );
        let mut sink: Vec<Diagnostic> = Vec::new();
        sink.report(err.to_diagnostic());
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].severity, Severity::Error);
        assert_eq!(sink[0].code, 203);
        assert_eq!(
            sink[0].to_string(),
            "<unknown>: error[203]: unexpected symbol near ')' (line 1, column 4)"
        );
    }
}
