//! Integration tests for Position, Location, and Cursor

use pegmatite_foundation::{Cursor, Location, Position};

#[test]
fn start_position() {
    assert_eq!(Position::start(), Position::new(0, 1, 1));
    assert_eq!(Position::default(), Position::start());
}

#[test]
fn display() {
    let loc = Location::new(Position::new(0, 1, 1), Position::new(5, 2, 3));
    assert_eq!(loc.to_string(), "1:1-2:3");
    assert_eq!(Location::at(Position::start()).to_string(), "1:1-1:1");
}

#[test]
fn location_text() {
    let input = "hello world";
    let loc = Location::new(Position::new(6, 1, 7), Position::new(11, 1, 12));
    assert_eq!(loc.text(input), "world");
}

#[test]
fn cursor_counts_lines_and_columns() {
    let input = "ab\ncd";
    let mut cursor = Cursor::default();
    cursor.advance_to(input, 4);
    assert_eq!(cursor.position(), Position::new(4, 2, 2));
}

#[test]
fn cursor_treats_crlf_as_one_break() {
    let input = "a\r\nb";
    let mut cursor = Cursor::default();
    cursor.advance_to(input, input.len());
    assert_eq!(cursor.position(), Position::new(4, 2, 2));
}

#[test]
fn cursor_counts_chars_not_bytes() {
    let input = "éé!";
    let mut cursor = Cursor::default();
    cursor.advance_to(input, input.len());
    let pos = cursor.position();
    assert_eq!(pos.offset, 5);
    assert_eq!(pos.column, 4);
}

#[test]
fn cursor_unicode_line_separators() {
    let input = "a\u{2028}b\u{2029}c";
    let mut cursor = Cursor::default();
    cursor.advance_to(input, input.len());
    assert_eq!(cursor.position().line, 3);
    assert_eq!(cursor.position().column, 2);
}
