//! Trace output formatters.
//!
//! Provides human-readable and JSON formatters for trace records.

use std::fmt::Write;

use serde_json::json;

use super::record::TraceRecord;

// =============================================================================
// Trace Formatter Trait
// =============================================================================

/// Trait for formatting trace records.
pub trait TraceFormatter {
    /// Formats a single trace record to a string.
    fn format(&self, record: &TraceRecord) -> String;

    /// Formats multiple records, one per line.
    fn format_many(&self, records: &[&TraceRecord]) -> String {
        records
            .iter()
            .map(|r| self.format(r))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// =============================================================================
// Human-Readable Formatter
// =============================================================================

/// Formats trace records as `1:1-1:4 rule.match  start`, indenting the rule
/// name two spaces per nesting level.
#[derive(Clone, Debug, Default)]
pub struct HumanFormatter {
    /// Whether to prefix record IDs.
    pub show_ids: bool,
    /// Whether to prefix parse numbers.
    pub show_parse: bool,
    /// Whether to append results of matching rules.
    pub show_results: bool,
}

impl HumanFormatter {
    /// Creates a new human formatter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to show record IDs.
    #[must_use]
    pub fn with_ids(mut self) -> Self {
        self.show_ids = true;
        self
    }

    /// Builder method to show parse numbers.
    #[must_use]
    pub fn with_parse(mut self) -> Self {
        self.show_parse = true;
        self
    }

    /// Builder method to show match results.
    #[must_use]
    pub fn with_results(mut self) -> Self {
        self.show_results = true;
        self
    }
}

impl TraceFormatter for HumanFormatter {
    fn format(&self, record: &TraceRecord) -> String {
        let mut line = String::new();

        if self.show_ids {
            let _ = write!(line, "[{:06}] ", record.id);
        }
        if self.show_parse {
            let _ = write!(line, "P{:04} ", record.parse);
        }

        let _ = write!(
            line,
            "{} {:<10}  {}{}",
            record.location,
            record.event_type(),
            "  ".repeat(record.depth),
            record.rule
        );

        if self.show_results {
            if let Some(result) = &record.result {
                let _ = write!(line, " => {result}");
            }
        }

        line
    }
}

// =============================================================================
// JSON Formatter
// =============================================================================

/// Formats trace records as JSON objects.
///
/// `location` and `result` use the same JSON shapes as the rest of the
/// public API (`{"start": {"offset", "line", "column"}, "end": ...}`).
#[derive(Clone, Debug, Default)]
pub struct JsonFormatter {
    /// Whether to pretty-print JSON.
    pub pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method for pretty printing.
    #[must_use]
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Converts a record to a JSON value.
    #[must_use]
    pub fn to_json(record: &TraceRecord) -> serde_json::Value {
        let mut value = json!({
            "id": record.id,
            "parse": record.parse,
            "type": record.event_type(),
            "rule": record.rule,
            "location": record.location,
            "depth": record.depth,
        });
        if let (Some(result), Some(object)) = (&record.result, value.as_object_mut()) {
            object.insert("result".to_string(), json!(result));
        }
        value
    }
}

impl TraceFormatter for JsonFormatter {
    fn format(&self, record: &TraceRecord) -> String {
        let value = Self::to_json(record);
        if self.pretty {
            format!("{value:#}")
        } else {
            value.to_string()
        }
    }

    fn format_many(&self, records: &[&TraceRecord]) -> String {
        let items: Vec<_> = records.iter().map(|r| self.format(r)).collect();
        if self.pretty {
            format!("[\n  {}\n]", items.join(",\n  "))
        } else {
            format!("[{}]", items.join(","))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
