//! Tracing and trace inspection for Pegmatite.
//!
//! This crate provides:
//! - [`RecordingTracer`] - A [`pegmatite_language::Tracer`] that keeps rule events
//! - [`TraceBuffer`] - The ring buffer behind it
//! - [`HumanFormatter`], [`JsonFormatter`] - Renderings of recorded events

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod trace;

pub use trace::{
    HumanFormatter, JsonFormatter, RecordingTracer, TraceBuffer, TraceBufferStats, TraceFormatter,
    TraceError, TraceOutput, TraceRecord, TracerConfig,
};
