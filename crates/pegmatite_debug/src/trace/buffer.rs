//! Ring buffer for trace records.
//!
//! Provides a fixed-size buffer that keeps the most recent trace records,
//! with lookups by parse and by rule.

use std::collections::{HashMap, HashSet, VecDeque};

use pegmatite_language::TraceEvent;

use super::record::TraceRecord;

// =============================================================================
// Trace Buffer
// =============================================================================

/// A ring buffer for storing trace records.
///
/// Maintains a fixed maximum size, discarding oldest records when full.
#[derive(Clone, Debug)]
pub struct TraceBuffer {
    /// The records, oldest first.
    records: VecDeque<TraceRecord>,
    /// Maximum number of records to store.
    max_size: usize,
    /// Next record ID to assign.
    next_id: u64,
}

impl TraceBuffer {
    /// Creates a new trace buffer with the given maximum size.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
            next_id: 0,
        }
    }

    /// Creates a buffer holding 10,000 records.
    #[must_use]
    pub fn default_size() -> Self {
        Self::new(10_000)
    }

    /// Copies an event into the buffer and returns its record ID.
    pub fn push(&mut self, parse: u64, event: &TraceEvent<'_>, depth: usize) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        if self.max_size == 0 {
            return id;
        }
        if self.records.len() == self.max_size {
            self.records.pop_front();
        }
        self.records.push_back(TraceRecord::new(id, parse, event, depth));
        id
    }

    /// Returns the number of records in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clears all records. IDs keep increasing.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Returns an iterator over all records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter()
    }

    /// Returns the most recently pushed record.
    #[must_use]
    pub fn last(&self) -> Option<&TraceRecord> {
        self.records.back()
    }

    /// Returns the most recent N records.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<&TraceRecord> {
        let start = self.records.len().saturating_sub(count);
        self.records.iter().skip(start).collect()
    }

    /// Returns records matching a predicate.
    pub fn filter<F>(&self, predicate: F) -> Vec<&TraceRecord>
    where
        F: Fn(&TraceRecord) -> bool,
    {
        self.records.iter().filter(|r| predicate(r)).collect()
    }

    /// Returns records of one parse.
    #[must_use]
    pub fn records_for_parse(&self, parse: u64) -> Vec<&TraceRecord> {
        self.filter(|r| r.parse == parse)
    }

    /// Returns records of one rule.
    #[must_use]
    pub fn records_for_rule(&self, rule: &str) -> Vec<&TraceRecord> {
        self.filter(|r| r.rule == rule)
    }

    /// Returns records of a specific event type.
    #[must_use]
    pub fn by_event_type(&self, event_type: &str) -> Vec<&TraceRecord> {
        self.filter(|r| r.event_type() == event_type)
    }

    /// Returns statistics about the buffer.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        let mut event_counts = HashMap::new();
        let mut rule_counts = HashMap::new();
        let mut parses = HashSet::new();
        let mut max_depth = 0;
        for record in &self.records {
            *event_counts.entry(record.event_type()).or_insert(0) += 1;
            if !record.is_exit() {
                *rule_counts.entry(record.rule.clone()).or_insert(0) += 1;
            }
            parses.insert(record.parse);
            max_depth = max_depth.max(record.depth);
        }

        TraceBufferStats {
            record_count: self.records.len(),
            max_size: self.max_size,
            parse_count: parses.len(),
            max_depth,
            event_counts,
            rule_counts,
        }
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::default_size()
    }
}

// =============================================================================
// Buffer Statistics
// =============================================================================

/// Statistics about a trace buffer.
#[derive(Clone, Debug)]
pub struct TraceBufferStats {
    /// Number of records currently in buffer.
    pub record_count: usize,
    /// Maximum buffer size.
    pub max_size: usize,
    /// Number of distinct parses.
    pub parse_count: usize,
    /// Deepest rule nesting seen.
    pub max_depth: usize,
    /// Count of each event type.
    pub event_counts: HashMap<&'static str, usize>,
    /// Invocations per rule.
    pub rule_counts: HashMap<String, usize>,
}

// =============================================================================
// Tests
// =============================================================================
