//! Lazy offset to line/column resolution.

use std::collections::BTreeMap;

use pegmatite_foundation::{Cursor, Location, Position};

/// Resolves byte offsets to positions, scanning forward from the nearest
/// offset already resolved.
#[derive(Debug, Default)]
pub struct Locator {
    cache: BTreeMap<usize, Cursor>,
}

impl Locator {
    /// Creates an empty locator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `offset` in `input`.
    pub fn position(&mut self, input: &str, offset: usize) -> Position {
        let offset = offset.min(input.len());
        let mut cursor = self
            .cache
            .range(..=offset)
            .next_back()
            .map_or_else(Cursor::new, |(_, cursor)| *cursor);
        cursor.advance_to(input, offset);
        let position = cursor.position();
        self.cache.insert(position.offset, cursor);
        position
    }

    /// Resolves the span `start..end` in `input`.
    pub fn location(&mut self, input: &str, start: usize, end: usize) -> Location {
        let start = self.position(input, start);
        let end = self.position(input, end);
        Location::new(start, end)
    }
}
