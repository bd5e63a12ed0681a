//! Input location tracking.
//!
//! [`Position`] is a point in the parsed input and [`Location`] a span between
//! two positions. [`Cursor`] advances a position character by character and is
//! the building block of the matcher's lazy location cache.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in the input.
///
/// `offset` is a byte offset into the UTF-8 input; `line` and `column` are
/// 1-based, and columns count Unicode scalar values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    /// Byte offset from the start of the input.
    pub offset: usize,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// The position at the start of any input.
    #[must_use]
    pub const fn start() -> Self {
        Self::new(0, 1, 1)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of input between two positions (end exclusive).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Where the span starts.
    pub start: Position,
    /// Where the span ends (exclusive).
    pub end: Position,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Creates an empty location at a single position.
    #[must_use]
    pub const fn at(position: Position) -> Self {
        Self::new(position, position)
    }

    /// Returns the length of this span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    /// Returns true if this span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Returns the text this span covers in the given input.
    #[must_use]
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start.offset..self.end.offset]
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Incremental line/column cursor.
///
/// `\n`, `\r`, `\u{2028}` and `\u{2029}` end a line; a `\n` directly after a
/// `\r` does not start another one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    position: Position,
    seen_cr: bool,
}

impl Cursor {
    /// Creates a cursor at the start of the input.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            position: Position::start(),
            seen_cr: false,
        }
    }

    /// Returns the current position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Advances past one character.
    pub fn advance(&mut self, c: char) {
        match c {
            '\n' => {
                if !self.seen_cr {
                    self.position.line += 1;
                }
                self.position.column = 1;
                self.seen_cr = false;
            }
            '\r' | '\u{2028}' | '\u{2029}' => {
                self.position.line += 1;
                self.position.column = 1;
                self.seen_cr = c == '\r';
            }
            _ => {
                self.position.column += 1;
                self.seen_cr = false;
            }
        }
        self.position.offset += c.len_utf8();
    }

    /// Advances over `input[self.offset..target]`.
    ///
    /// A target inside a multi-byte character stops at the character boundary
    /// before it. If the cursor's own offset is not a boundary of `input`, it
    /// does not move.
    pub fn advance_to(&mut self, input: &str, target: usize) {
        let target = target.min(input.len());
        if target <= self.position.offset {
            return;
        }
        let Some(rest) = input.get(self.position.offset..) else {
            return;
        };
        for c in rest.chars() {
            if self.position.offset + c.len_utf8() > target {
                break;
            }
            self.advance(c);
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}
