//! Property tests over a fixed grammar and random input

use pegmatite::foundation::{ClassPart, ErrorKind};
use pegmatite::language::Optimize;
use pegmatite::{CompileOptions, Expression as E, Grammar, Parser, Rule, Value, compile_parser};
use proptest::prelude::*;

/// `s = (word / num / "(" s ")")+`, with the whole match returned as text.
fn grammar() -> Grammar {
    Grammar::new(vec![
        Rule::new("start", E::text(E::rule_ref("s"))),
        Rule::new(
            "s",
            E::one_or_more(E::choice(vec![
                E::rule_ref("word"),
                E::rule_ref("num"),
                E::sequence(vec![E::literal("("), E::rule_ref("s"), E::literal(")")]),
            ])),
        ),
        Rule::new(
            "word",
            E::one_or_more(E::class(vec![ClassPart::Range('a', 'c')], false, true)),
        )
        .with_display_name("word"),
        Rule::new(
            "num",
            E::sequence(vec![
                E::class(vec![ClassPart::Range('0', '9')], false, false),
                E::simple_not(E::literal("!")),
            ]),
        ),
    ])
}

fn parser(options: CompileOptions) -> Parser {
    compile_parser(grammar(), options).unwrap()
}

fn input() -> impl Strategy<Value = String> {
    "[abcAB0-9()!é\n]{0,16}"
}

proptest! {
    #[test]
    fn parsing_is_deterministic(text in input()) {
        let p = parser(CompileOptions::default());
        let first = p.parse(&text).map_err(|e| e.to_string());
        let second = p.parse(&text).map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn success_consumes_everything(text in input()) {
        let p = parser(CompileOptions::default());
        if let Ok(value) = p.parse(&text) {
            prop_assert_eq!(value, Value::from(text.as_str()));
        }
    }

    #[test]
    fn errors_are_well_formed(text in input()) {
        let p = parser(CompileOptions::default());
        if let Err(err) = p.parse(&text) {
            let ErrorKind::Syntax(syntax) = &err.kind else {
                return Err(TestCaseError::fail(format!("not a syntax error: {err}")));
            };
            let loc = syntax.location;
            prop_assert!(loc.start.offset <= loc.end.offset);
            prop_assert!(loc.end.offset <= text.len());
            prop_assert!(text.is_char_boundary(loc.start.offset));
            let expected_found = text[loc.start.offset..].chars().next().map(String::from);
            prop_assert_eq!(syntax.found.as_deref(), expected_found.as_deref());
            prop_assert!(syntax.expected.as_ref().is_some_and(|e| !e.is_empty()));
        }
    }

    #[test]
    fn size_and_cache_are_transparent(text in input()) {
        let reference = parser(CompileOptions::default()).parse(&text).map_err(|e| e.to_string());
        let size = parser(CompileOptions::new().with_optimize(Optimize::Size));
        prop_assert_eq!(size.parse(&text).map_err(|e| e.to_string()), reference.clone());
        let cached = parser(CompileOptions::new().with_cache(true));
        prop_assert_eq!(cached.parse(&text).ok(), reference.ok());
    }
}
