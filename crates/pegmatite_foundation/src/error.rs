//! Error types for the Pegmatite system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Compile-time failures and parse failures share one [`Error`] type; a failed
//! parse carries its structured [`SyntaxError`] in [`ErrorKind::Syntax`].

use std::fmt;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::expectation::{Expectation, build_message};
use crate::location::Location;

/// The main error type for Pegmatite operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Fills in the pass name unless the error already names one.
    #[must_use]
    pub fn in_pass(mut self, pass: &str) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(if context.pass.is_some() {
            context
        } else {
            context.with_pass(pass)
        });
        self
    }

    /// Creates a missing rule error.
    #[must_use]
    pub fn missing_rule(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingRule(name.into()))
    }

    /// Creates a left recursion error.
    #[must_use]
    pub fn left_recursion(rule: impl Into<String>, path: Vec<String>) -> Self {
        Self::new(ErrorKind::LeftRecursion {
            rule: rule.into(),
            path,
        })
    }

    /// Creates a codegen error.
    #[must_use]
    pub fn codegen(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Codegen(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Wraps a syntax error.
    #[must_use]
    pub fn syntax(error: SyntaxError) -> Self {
        Self::new(ErrorKind::Syntax(Box::new(error)))
    }

    /// Returns the syntax error if this is a failed parse.
    #[must_use]
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match &self.kind {
            ErrorKind::Syntax(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true if this error was raised while compiling a grammar.
    #[must_use]
    pub fn is_compile_error(&self) -> bool {
        !matches!(
            self.kind,
            ErrorKind::Syntax(_) | ErrorKind::StartRuleNotAllowed(_) | ErrorKind::Internal(_)
        )
    }
}

impl From<SyntaxError> for Error {
    fn from(error: SyntaxError) -> Self {
        Self::syntax(error)
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A rule reference names no rule.
    #[error("rule \"{0}\" is not defined")]
    MissingRule(String),

    /// A rule can reach itself without consuming input.
    #[error("possible infinite loop when parsing (left recursion: {})", path.join(" -> "))]
    LeftRecursion {
        /// The rule that recurses.
        rule: String,
        /// The chain of rule names ending where it started.
        path: Vec<String>,
    },

    /// Two rules share a name.
    #[error("rule \"{0}\" is already defined")]
    DuplicateRule(String),

    /// A label shadows a label visible in an enclosing scope.
    #[error("label \"{label}\" is already defined")]
    DuplicateLabel {
        /// The repeated label.
        label: String,
    },

    /// A repetition whose body can succeed without consuming input.
    #[error("possible infinite loop when parsing (repetition used with an expression that may not consume any input) in rule \"{rule}\"")]
    InfiniteRepetition {
        /// The rule containing the repetition.
        rule: String,
    },

    /// A character class range whose start is after its end.
    #[error("invalid character range: {start:?}-{end:?}")]
    InvalidCharacterRange {
        /// Range start.
        start: char,
        /// Range end.
        end: char,
    },

    /// An allowed start rule names no rule.
    #[error("unknown start rule \"{0}\"")]
    UnknownStartRule(String),

    /// A parse asked for a start rule outside the allowed set.
    #[error("can't start parsing from rule \"{0}\"")]
    StartRuleNotAllowed(String),

    /// Action, predicate, or initializer code with no bound closure.
    #[error("no binding for code block {0:?}")]
    UnboundCode(String),

    /// Code generation produced an invalid instruction sequence.
    #[error("code generation failed: {0}")]
    Codegen(String),

    /// The input does not match the grammar.
    #[error("{0}")]
    Syntax(Box<SyntaxError>),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A failed parse: what was expected, what was found, and where.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[error("{message}")]
pub struct SyntaxError {
    /// Human-readable message.
    pub message: String,
    /// What was expected, or `None` for errors raised by `error()` in actions.
    pub expected: Option<Vec<Expectation>>,
    /// The text found at the failure, or `None` at end of input.
    pub found: Option<String>,
    /// Where the failure occurred.
    pub location: Location,
}

impl SyntaxError {
    /// Builds an error from an expectation set, with the standard message.
    #[must_use]
    pub fn expected(expected: Vec<Expectation>, found: Option<String>, location: Location) -> Self {
        let message = build_message(&expected, found.as_deref());
        Self {
            message,
            expected: Some(expected),
            found,
            location,
        }
    }

    /// Builds an error with a custom message and no expectations.
    #[must_use]
    pub fn simple(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            expected: None,
            found: None,
            location,
        }
    }

    /// Formats the error against its input, with the offending line and a caret.
    #[must_use]
    pub fn format_with_source(&self, source_name: &str, input: &str) -> String {
        use std::fmt::Write;

        let start = self.location.start;
        let mut out = format!("error: {}\n --> {source_name}:{start}\n", self.message);
        if let Some(line) = input.lines().nth(start.line.saturating_sub(1) as usize) {
            let gutter = start.line.to_string();
            let pad = " ".repeat(gutter.len());
            let width = (self.location.end.column.saturating_sub(start.column)).max(1) as usize;
            let _ = writeln!(out, "{pad} |");
            let _ = writeln!(out, "{gutter} | {line}");
            let _ = writeln!(
                out,
                "{pad} | {}{}",
                " ".repeat(start.column.saturating_sub(1) as usize),
                "^".repeat(width)
            );
        }
        out
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The compiler pass that raised the error.
    pub pass: Option<String>,
    /// The grammar rule being processed.
    pub rule: Option<String>,
    /// Source location in the grammar, when the AST carries one.
    pub location: Option<Location>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pass name.
    #[must_use]
    pub fn with_pass(mut self, pass: impl Into<String>) -> Self {
        self.pass = Some(pass.into());
        self
    }

    /// Sets the rule name.
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Sets the grammar location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "in rule {rule}")?;
            if let Some(loc) = &self.location {
                write!(f, " at {}", loc.start)?;
            }
        }
        if let Some(pass) = &self.pass {
            if self.rule.is_some() {
                write!(f, " ")?;
            }
            write!(f, "({pass})")?;
        }
        Ok(())
    }
}
