//! Recording tracer for parses.
//!
//! Grammars compiled with tracing report every rule invocation to the
//! tracer passed in `ParseOptions`. [`RecordingTracer`] keeps those events
//! in a ring buffer and can echo them to stderr as they arrive.
//!
//! # Example
//!
//! ```text
//! let mut tracer = RecordingTracer::new(TracerConfig::new().to_stderr());
//! parser.parse_with("1+2", ParseOptions::new().tracer(&mut tracer))?;
//! tracer.format_records(&tracer.buffer().recent(10));
//! ```

pub mod buffer;
pub mod format;
pub mod record;

pub use buffer::{TraceBuffer, TraceBufferStats};
pub use format::{HumanFormatter, JsonFormatter, TraceFormatter};
pub use record::TraceRecord;

use std::io::{self, Write};

use pegmatite_language::{TraceEvent, TraceEventKind, Tracer};

// =============================================================================
// Trace Output
// =============================================================================

/// Where trace output should be sent as events arrive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceOutput {
    /// No output (events are still recorded in the buffer).
    #[default]
    None,
    /// Write each event to stderr.
    Stderr,
}

// =============================================================================
// Tracer Configuration
// =============================================================================

/// Configuration for [`RecordingTracer`].
#[derive(Clone, Debug)]
pub struct TracerConfig {
    /// Maximum records to keep in buffer.
    pub buffer_size: usize,
    /// Where to echo events.
    pub output: TraceOutput,
    /// Whether echoed and formatted events are JSON.
    pub json_format: bool,
    /// Event types to keep, such as `rule.fail` (empty = all).
    pub event_filter: Vec<String>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            buffer_size: 10_000,
            output: TraceOutput::None,
            json_format: false,
            event_filter: Vec::new(),
        }
    }
}

impl TracerConfig {
    /// Creates a new tracer configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Builder method to output to stderr.
    #[must_use]
    pub fn to_stderr(mut self) -> Self {
        self.output = TraceOutput::Stderr;
        self
    }

    /// Builder method to use JSON format.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Builder method to filter event types.
    #[must_use]
    pub fn filter_events<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_filter = types.into_iter().map(Into::into).collect();
        self
    }

    fn keeps(&self, kind: TraceEventKind) -> bool {
        self.event_filter.is_empty() || self.event_filter.iter().any(|t| t == kind.as_str())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Failure writing recorded events.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The writer failed.
    #[error("failed to write trace: {0}")]
    Io(#[from] io::Error),
    /// A record could not be serialized.
    #[error("failed to serialize trace record: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Recording Tracer
// =============================================================================

/// A [`Tracer`] that records rule events with their nesting depth.
///
/// Depth is tracked across every event, including those the filter drops,
/// so filtered records still indent correctly.
#[derive(Debug)]
pub struct RecordingTracer {
    config: TracerConfig,
    buffer: TraceBuffer,
    parse: u64,
    depth: usize,
    human_formatter: HumanFormatter,
    json_formatter: JsonFormatter,
}

impl RecordingTracer {
    /// Creates a new tracer with the given configuration.
    #[must_use]
    pub fn new(config: TracerConfig) -> Self {
        let buffer_size = config.buffer_size;
        Self {
            config,
            buffer: TraceBuffer::new(buffer_size),
            parse: 0,
            depth: 0,
            human_formatter: HumanFormatter::new(),
            json_formatter: JsonFormatter::new(),
        }
    }

    /// Creates a tracer that echoes every event to stderr.
    #[must_use]
    pub fn to_stderr() -> Self {
        Self::new(TracerConfig::new().to_stderr())
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Sets whether to use JSON output format.
    pub fn set_json_format(&mut self, json: bool) {
        self.config.json_format = json;
    }

    /// Sets the trace output destination.
    pub fn set_output(&mut self, output: TraceOutput) {
        self.config.output = output;
    }

    /// Marks the start of another parse.
    ///
    /// Records carry the parse number they were made under. Depth is reset
    /// in case a previous parse ended with an internal error mid-rule.
    pub fn start_parse(&mut self) -> u64 {
        self.parse += 1;
        self.depth = 0;
        self.parse
    }

    /// Returns the current parse number.
    #[must_use]
    pub fn current_parse(&self) -> u64 {
        self.parse
    }

    /// Returns the current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn output_record(&self, record: &TraceRecord) {
        let line = self.format_record(record);
        let _ = writeln!(io::stderr(), "{line}");
    }

    /// Formats a record using the current format settings.
    #[must_use]
    pub fn format_record(&self, record: &TraceRecord) -> String {
        if self.config.json_format {
            self.json_formatter.format(record)
        } else {
            self.human_formatter.format(record)
        }
    }

    /// Formats multiple records.
    #[must_use]
    pub fn format_records(&self, records: &[&TraceRecord]) -> String {
        if self.config.json_format {
            self.json_formatter.format_many(records)
        } else {
            self.human_formatter.format_many(records)
        }
    }

    /// Writes every buffered record as one JSON object per line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the writer fails.
    pub fn write_json_lines<W: Write>(&self, mut writer: W) -> Result<(), TraceError> {
        for record in self.buffer.iter() {
            serde_json::to_writer(&mut writer, &JsonFormatter::to_json(record))?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Returns the trace buffer.
    #[must_use]
    pub fn buffer(&self) -> &TraceBuffer {
        &self.buffer
    }

    /// Clears the trace buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Returns buffer statistics.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        self.buffer.stats()
    }
}

impl Default for RecordingTracer {
    fn default() -> Self {
        Self::new(TracerConfig::default())
    }
}

impl Tracer for RecordingTracer {
    fn trace(&mut self, event: &TraceEvent<'_>) {
        let depth = match event.kind {
            TraceEventKind::Enter => {
                self.depth += 1;
                self.depth - 1
            }
            TraceEventKind::Match | TraceEventKind::Fail => {
                self.depth = self.depth.saturating_sub(1);
                self.depth
            }
        };

        if !self.config.keeps(event.kind) {
            return;
        }

        self.buffer.push(self.parse, event, depth);
        if self.config.output == TraceOutput::Stderr {
            if let Some(record) = self.buffer.last() {
                self.output_record(record);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
