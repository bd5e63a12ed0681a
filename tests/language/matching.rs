//! Matcher integration tests
//!
//! Tests PEG semantics and error reporting through the public Parser API.

use pegmatite_foundation::{ClassPart, Error, Expectation, Position, SyntaxError, Value};
use pegmatite_language::{
    CompileOptions, Expression as E, Grammar, Optimize, Parser, Rule, compile_parser,
};

fn parser(rules: Vec<Rule>) -> Parser {
    compile_parser(Grammar::new(rules), CompileOptions::default()).unwrap()
}

fn start(expr: E) -> Parser {
    parser(vec![Rule::new("start", expr)])
}

fn syntax(result: Result<Value, Error>) -> SyntaxError {
    result.unwrap_err().as_syntax().cloned().unwrap()
}

fn digit() -> E {
    E::class(vec![ClassPart::Range('0', '9')], false, false)
}

// =============================================================================
// Results
// =============================================================================

#[test]
fn sequence_builds_array() {
    let p = start(E::sequence(vec![E::literal("a"), E::optional(E::literal("b")), E::any()]));
    assert_eq!(
        p.parse("ac").unwrap(),
        Value::array([Value::from("a"), Value::Null, Value::from("c")])
    );
}

#[test]
fn repetition_builds_array() {
    let p = start(E::zero_or_more(digit()));
    assert_eq!(p.parse("").unwrap(), Value::empty_array());
    assert_eq!(p.parse("12").unwrap(), Value::array(["1", "2"]));
}

#[test]
fn text_returns_matched_slice() {
    let p = start(E::text(E::sequence(vec![E::literal("a"), E::one_or_more(digit())])));
    assert_eq!(p.parse("a123").unwrap(), Value::from("a123"));
}

#[test]
fn lookahead_results_are_null() {
    let p = start(E::sequence(vec![E::simple_and(E::literal("a")), E::any()]));
    assert_eq!(p.parse("a").unwrap(), Value::array([Value::Null, Value::from("a")]));
}

// =============================================================================
// Backtracking
// =============================================================================

#[test]
fn choice_is_ordered() {
    // "a" wins over "ab", leaving "b" unconsumed.
    let p = start(E::choice(vec![E::literal("a"), E::literal("ab")]));
    assert!(p.parse("ab").is_err());
    let p = start(E::choice(vec![E::literal("ab"), E::literal("a")]));
    assert_eq!(p.parse("ab").unwrap(), Value::from("ab"));
}

#[test]
fn failed_sequence_restores_position() {
    let p = start(E::choice(vec![
        E::sequence(vec![E::literal("a"), E::literal("b")]),
        E::sequence(vec![E::literal("a"), E::literal("c")]),
    ]));
    assert_eq!(p.parse("ac").unwrap(), Value::array(["a", "c"]));
}

#[test]
fn repetition_is_greedy_without_backtracking() {
    let p = start(E::sequence(vec![E::zero_or_more(E::literal("a")), E::literal("a")]));
    assert!(p.parse("aaa").is_err());
}

#[test]
fn negative_lookahead() {
    let keyword = E::sequence(vec![
        E::literal("if"),
        E::simple_not(E::class(vec![ClassPart::Range('a', 'z')], false, false)),
    ]);
    let p = start(E::choice(vec![E::text(keyword), E::literal("iffy")]));
    assert_eq!(p.parse("if").unwrap(), Value::from("if"));
    assert_eq!(p.parse("iffy").unwrap(), Value::from("iffy"));
}

#[test]
fn parses_are_repeatable() {
    let p = start(E::one_or_more(digit()));
    for _ in 0..3 {
        assert_eq!(p.parse("42").unwrap(), Value::array(["4", "2"]));
        assert!(p.parse("4x").is_err());
    }
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn rightmost_failure_wins() {
    let p = start(E::choice(vec![
        E::sequence(vec![E::literal("a"), E::literal("b"), E::literal("c")]),
        E::sequence(vec![E::literal("a"), E::literal("x")]),
    ]));
    let err = syntax(p.parse("abz"));
    assert_eq!(err.expected, Some(vec![Expectation::literal("c", false)]));
    assert_eq!(err.found.as_deref(), Some("z"));
    assert_eq!(err.location.start, Position::new(2, 1, 3));
    assert_eq!(err.message, "Expected \"c\" but \"z\" found.");
}

#[test]
fn expectations_at_same_position_are_merged() {
    let p = start(E::choice(vec![E::literal("b"), E::literal("a"), digit()]));
    let err = syntax(p.parse("?"));
    assert_eq!(err.message, "Expected \"a\", \"b\", or [0-9] but \"?\" found.");
}

#[test]
fn trailing_input_expects_end() {
    let p = start(E::literal("a"));
    let err = syntax(p.parse("ab"));
    assert_eq!(err.message, "Expected end of input but \"b\" found.");
    assert_eq!(err.location.start.offset, 1);
    assert_eq!(err.location.end.offset, 2);
}

#[test]
fn end_of_input_failure() {
    let p = start(E::sequence(vec![E::literal("a"), E::literal("b")]));
    let err = syntax(p.parse("a"));
    assert_eq!(err.message, "Expected \"b\" but end of input found.");
    assert!(err.found.is_none());
    assert_eq!(err.location.start, err.location.end);
}

#[test]
fn named_rules_replace_inner_expectations() {
    let p = parser(vec![
        Rule::new("start", E::sequence(vec![E::rule_ref("number"), E::literal(";")])),
        Rule::new("number", E::one_or_more(digit())).with_display_name("number"),
    ]);
    assert_eq!(syntax(p.parse("x")).message, "Expected number but \"x\" found.");
}

#[test]
fn error_location_has_line_and_column() {
    let p = start(E::sequence(vec![E::literal("a\n"), E::literal("bc"), E::literal("d")]));
    let err = syntax(p.parse("a\nbcx"));
    assert_eq!(err.location.start, Position::new(4, 2, 3));
}

// =============================================================================
// Options
// =============================================================================

fn ambiguous() -> Grammar {
    Grammar::new(vec![
        Rule::new(
            "start",
            E::choice(vec![
                E::sequence(vec![E::rule_ref("num"), E::literal("+")]),
                E::sequence(vec![E::rule_ref("num"), E::literal("-")]),
                E::rule_ref("num"),
            ]),
        ),
        Rule::new("num", E::text(E::one_or_more(digit()))),
    ])
}

#[test]
fn cache_does_not_change_results() {
    let plain = compile_parser(ambiguous(), CompileOptions::default()).unwrap();
    let cached = compile_parser(ambiguous(), CompileOptions::new().with_cache(true)).unwrap();
    for input in ["12+", "12-", "12", "12*", ""] {
        assert_eq!(plain.parse(input).ok(), cached.parse(input).ok(), "input {input:?}");
    }
}

#[test]
fn size_and_speed_agree() {
    let speed = compile_parser(ambiguous(), CompileOptions::default()).unwrap();
    let size =
        compile_parser(ambiguous(), CompileOptions::new().with_optimize(Optimize::Size)).unwrap();
    for input in ["1+", "9-", "123", "x", "1*"] {
        assert_eq!(
            speed.parse(input).map_err(|e| e.to_string()),
            size.parse(input).map_err(|e| e.to_string())
        );
    }
}

#[test]
fn parser_is_shareable_across_threads() {
    let p = std::sync::Arc::new(compile_parser(ambiguous(), CompileOptions::default()).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let p = std::sync::Arc::clone(&p);
            std::thread::spawn(move || p.parse(&format!("{i}+")).is_ok())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
