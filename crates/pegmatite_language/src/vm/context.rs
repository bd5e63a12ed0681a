//! The view of a parse that bound action and predicate closures receive.

use std::ops::Range;

use pegmatite_foundation::{Location, Value};
use thiserror::Error;

use super::locate::Locator;

/// Aborts the parse from inside an action or predicate.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Escape {
    /// Fail as if `description` had been expected here.
    #[error("expected {description}")]
    Expected {
        /// What was expected.
        description: String,
        /// Where; `None` means the current span.
        location: Option<Location>,
    },
    /// Fail with a custom message.
    #[error("{message}")]
    Error {
        /// The message.
        message: String,
        /// Where; `None` means the current span.
        location: Option<Location>,
    },
}

/// Result of a bound closure.
pub type ActionResult<T> = std::result::Result<T, Escape>;

/// Everything an action or predicate can see.
///
/// For actions the span runs from where the action's expression started to
/// the current position. For predicates both ends are the current position.
pub struct ActionContext<'a> {
    pub(super) input: &'a str,
    pub(super) span: Range<usize>,
    pub(super) labels: &'a [String],
    pub(super) args: Vec<Value>,
    pub(super) locator: &'a mut Locator,
    pub(super) state: &'a mut Value,
    pub(super) options: &'a Value,
}

impl<'a> ActionContext<'a> {
    /// The matched text.
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.input.get(self.span.clone()).unwrap_or_default()
    }

    /// Byte offsets of the span.
    #[must_use]
    pub fn offset(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Line/column location of the span.
    pub fn location(&mut self) -> Location {
        self.locator
            .location(self.input, self.span.start, self.span.end)
    }

    /// Labeled values, in label declaration order.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// The value bound to `name`.
    #[must_use]
    pub fn label(&self, name: &str) -> Option<&Value> {
        let idx = self.labels.iter().position(|l| l == name)?;
        self.args.get(idx)
    }

    /// Per-parse state created by the initializer (null without one).
    #[must_use]
    pub fn state(&self) -> &Value {
        &*self.state
    }

    /// Mutable per-parse state.
    pub fn state_mut(&mut self) -> &mut Value {
        &mut *self.state
    }

    /// The pass-through options of this parse.
    #[must_use]
    pub fn options(&self) -> &Value {
        self.options
    }

    /// Escape reporting that `description` was expected over the current span.
    #[must_use]
    pub fn expected(&self, description: impl Into<String>) -> Escape {
        Escape::Expected {
            description: description.into(),
            location: None,
        }
    }

    /// Escape reporting that `description` was expected at `location`.
    #[must_use]
    pub fn expected_at(&self, description: impl Into<String>, location: Location) -> Escape {
        Escape::Expected {
            description: description.into(),
            location: Some(location),
        }
    }

    /// Escape with a custom message over the current span.
    #[must_use]
    pub fn error(&self, message: impl Into<String>) -> Escape {
        Escape::Error {
            message: message.into(),
            location: None,
        }
    }

    /// Escape with a custom message at `location`.
    #[must_use]
    pub fn error_at(&self, message: impl Into<String>, location: Location) -> Escape {
        Escape::Error {
            message: message.into(),
            location: Some(location),
        }
    }
}
