//! Recorded rule events.

use pegmatite_foundation::{Location, Value};
use pegmatite_language::{TraceEvent, TraceEventKind};

/// An owned copy of a rule event, tagged with where it happened.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceRecord {
    /// Monotonic record ID, unique within one tracer.
    pub id: u64,
    /// Which parse the event belongs to.
    pub parse: u64,
    /// Event kind.
    pub kind: TraceEventKind,
    /// Rule name.
    pub rule: String,
    /// Event location.
    pub location: Location,
    /// Result of a matching rule.
    pub result: Option<Value>,
    /// Rule nesting depth; the start rule is at depth 0.
    pub depth: usize,
}

impl TraceRecord {
    /// Copies an event.
    #[must_use]
    pub fn new(id: u64, parse: u64, event: &TraceEvent<'_>, depth: usize) -> Self {
        Self {
            id,
            parse,
            kind: event.kind,
            rule: event.rule.to_string(),
            location: event.location,
            result: event.result.cloned(),
            depth,
        }
    }

    /// Returns the event name (`rule.enter`, `rule.match`, `rule.fail`).
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Returns true for `rule.match` and `rule.fail` events.
    #[must_use]
    pub fn is_exit(&self) -> bool {
        self.kind != TraceEventKind::Enter
    }
}
