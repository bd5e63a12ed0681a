//! Expectation descriptors recorded at match failures, and the message
//! format built from them.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One element of a character class: a single character or an inclusive range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ClassPart {
    /// A single character, like `a` in `[abc]`.
    Char(char),
    /// An inclusive range, like `a-z` in `[a-z]`.
    Range(char, char),
}

impl ClassPart {
    /// Returns true if `c` falls in this part.
    #[must_use]
    pub fn contains(&self, c: char) -> bool {
        match *self {
            Self::Char(x) => x == c,
            Self::Range(lo, hi) => lo <= c && c <= hi,
        }
    }
}

/// What the matcher expected to find where a terminal failed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Expectation {
    /// A literal string.
    Literal {
        /// The literal text as written in the grammar.
        text: String,
        /// Whether the literal matches case-insensitively.
        ignore_case: bool,
    },
    /// A character class.
    Class {
        /// The class parts.
        parts: Vec<ClassPart>,
        /// Whether the class is inverted (`[^...]`).
        inverted: bool,
        /// Whether the class matches case-insensitively.
        ignore_case: bool,
    },
    /// Any character.
    Any,
    /// The end of input.
    End,
    /// A free-form description (display names, `expected()` in actions).
    Other {
        /// The description shown in messages.
        description: String,
    },
}

impl Expectation {
    /// Creates a literal expectation.
    pub fn literal(text: impl Into<String>, ignore_case: bool) -> Self {
        Self::Literal {
            text: text.into(),
            ignore_case,
        }
    }

    /// Creates a free-form expectation.
    pub fn other(description: impl Into<String>) -> Self {
        Self::Other {
            description: description.into(),
        }
    }

    /// Returns the human-readable description used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Literal { text, .. } => format!("\"{}\"", literal_escape(text)),
            Self::Class {
                parts, inverted, ..
            } => {
                let mut out = String::from("[");
                if *inverted {
                    out.push('^');
                }
                for part in parts {
                    match *part {
                        ClassPart::Char(c) => out.push_str(&class_escape(c)),
                        ClassPart::Range(lo, hi) => {
                            out.push_str(&class_escape(lo));
                            out.push('-');
                            out.push_str(&class_escape(hi));
                        }
                    }
                }
                out.push(']');
                out
            }
            Self::Any => "any character".to_string(),
            Self::End => "end of input".to_string(),
            Self::Other { description } => description.clone(),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

fn escape_control(c: char, out: &mut String) {
    match c {
        '\0' => out.push_str("\\0"),
        '\t' => out.push_str("\\t"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\u{0}'..='\u{1F}' | '\u{7F}'..='\u{9F}' => {
            out.push_str(&format!("\\x{:02X}", u32::from(c)));
        }
        _ => out.push(c),
    }
}

/// Escapes text for display inside double quotes.
#[must_use]
pub fn literal_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => escape_control(c, &mut out),
        }
    }
    out
}

/// Escapes a character for display inside a class.
#[must_use]
pub fn class_escape(c: char) -> String {
    let mut out = String::new();
    match c {
        '\\' => out.push_str("\\\\"),
        ']' => out.push_str("\\]"),
        '^' => out.push_str("\\^"),
        '-' => out.push_str("\\-"),
        _ => escape_control(c, &mut out),
    }
    out
}

/// Describes an expectation set: sorted, de-duplicated, joined with `,` and `or`.
#[must_use]
pub fn describe_expected(expected: &[Expectation]) -> String {
    let mut descriptions: Vec<String> = expected.iter().map(Expectation::describe).collect();
    descriptions.sort();
    descriptions.dedup();

    match descriptions.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} or {second}"),
        [init @ .., last] => format!("{}, or {last}", init.join(", ")),
    }
}

/// Describes what was found at the failure position.
#[must_use]
pub fn describe_found(found: Option<&str>) -> String {
    match found {
        Some(text) if !text.is_empty() => format!("\"{}\"", literal_escape(text)),
        _ => "end of input".to_string(),
    }
}

/// Builds the standard `Expected ... but ... found.` message.
#[must_use]
pub fn build_message(expected: &[Expectation], found: Option<&str>) -> String {
    format!(
        "Expected {} but {} found.",
        describe_expected(expected),
        describe_found(found)
    )
}
