//! Rule invocation events.

use std::fmt;

use pegmatite_foundation::{Location, Value};
use tracing::trace;

/// What happened to a rule invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraceEventKind {
    /// The rule was entered.
    Enter,
    /// The rule matched.
    Match,
    /// The rule failed.
    Fail,
}

impl TraceEventKind {
    /// Returns the event name (`rule.enter`, `rule.match`, `rule.fail`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "rule.enter",
            Self::Match => "rule.match",
            Self::Fail => "rule.fail",
        }
    }
}

impl fmt::Display for TraceEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule event.
#[derive(Clone, Copy, Debug)]
pub struct TraceEvent<'a> {
    /// Event kind.
    pub kind: TraceEventKind,
    /// Rule name.
    pub rule: &'a str,
    /// `start..start` for enter and fail, `start..end` for match.
    pub location: Location,
    /// The rule's result, for match events.
    pub result: Option<&'a Value>,
}

/// Receives rule events from parses of grammars compiled with tracing.
pub trait Tracer {
    /// Handles one event.
    fn trace(&mut self, event: &TraceEvent<'_>);
}

/// Forwards events to `tracing` under the `pegmatite::trace` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn trace(&mut self, event: &TraceEvent<'_>) {
        match event.result {
            Some(result) => trace!(
                target: "pegmatite::trace",
                kind = event.kind.as_str(),
                rule = event.rule,
                location = %event.location,
                result = %result,
            ),
            None => trace!(
                target: "pegmatite::trace",
                kind = event.kind.as_str(),
                rule = event.rule,
                location = %event.location,
            ),
        }
    }
}
