//! Integration tests for expectation descriptions and messages

use pegmatite_foundation::expectation::{build_message, describe_expected, describe_found};
use pegmatite_foundation::{ClassPart, Expectation};

fn lit(s: &str) -> Expectation {
    Expectation::literal(s, false)
}

#[test]
fn describes_each_kind() {
    assert_eq!(lit("a\"b").describe(), "\"a\\\"b\"");
    assert_eq!(Expectation::Any.describe(), "any character");
    assert_eq!(Expectation::End.describe(), "end of input");
    assert_eq!(Expectation::other("number").describe(), "number");
    let class = Expectation::Class {
        parts: vec![ClassPart::Range('a', 'z'), ClassPart::Char(']')],
        inverted: true,
        ignore_case: false,
    };
    assert_eq!(class.describe(), "[^a-z\\]]");
}

#[test]
fn expected_list_is_sorted_and_deduplicated() {
    assert_eq!(describe_expected(&[lit("b"), lit("a"), lit("b")]), "\"a\" or \"b\"");
    assert_eq!(
        describe_expected(&[lit("c"), lit("a"), lit("b")]),
        "\"a\", \"b\", or \"c\""
    );
    assert_eq!(describe_expected(&[Expectation::End]), "end of input");
}

#[test]
fn found_text() {
    assert_eq!(describe_found(Some("x")), "\"x\"");
    assert_eq!(describe_found(Some("\n")), "\"\\n\"");
    assert_eq!(describe_found(None), "end of input");
    assert_eq!(describe_found(Some("")), "end of input");
}

#[test]
fn standard_message() {
    assert_eq!(
        build_message(&[lit("a"), Expectation::other("digit")], Some("z")),
        "Expected \"a\" or digit but \"z\" found."
    );
    assert_eq!(
        build_message(&[Expectation::End], Some("!")),
        "Expected end of input but \"!\" found."
    );
    assert_eq!(
        build_message(&[lit(";")], None),
        "Expected \";\" but end of input found."
    );
}
