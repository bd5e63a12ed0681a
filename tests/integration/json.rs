//! A JSON grammar built with actions
//!
//! Exercises objects and arrays built by actions, case-insensitive literals,
//! inverted classes, and error positions across lines.

use pegmatite::foundation::ClassPart;
use pegmatite::language::Optimize;
use pegmatite::{
    Bindings, CompileOptions, Expression as E, Grammar, Parser, Rule, Value, compile_parser,
};

fn lit(s: &str) -> E {
    E::literal(s)
}

fn r(name: &str) -> E {
    E::rule_ref(name)
}

/// `open ws items:(item (ws "," ws item)*)? ws close`.
fn list(open: &str, item: &str, close: &str, code: &str) -> E {
    E::action(
        E::sequence(vec![
            lit(open),
            r("ws"),
            E::labeled(
                "items",
                E::optional(E::sequence(vec![
                    r(item),
                    E::zero_or_more(E::action(
                        E::sequence(vec![r("ws"), lit(","), r("ws"), E::labeled("v", r(item))]),
                        "pick",
                    )),
                ])),
            ),
            r("ws"),
            lit(close),
        ]),
        code,
    )
}

fn grammar() -> Grammar {
    Grammar::new(vec![
        Rule::new(
            "document",
            E::action(
                E::sequence(vec![r("ws"), E::labeled("v", r("value")), r("ws")]),
                "pick",
            ),
        ),
        Rule::new(
            "value",
            E::choice(vec![
                r("object"),
                r("array"),
                r("string"),
                r("number"),
                E::action(E::literal_ic("true"), "true"),
                E::action(E::literal_ic("false"), "false"),
                E::action(lit("null"), "null"),
            ]),
        ),
        Rule::new("object", list("{", "member", "}", "object")),
        Rule::new(
            "member",
            E::action(
                E::sequence(vec![
                    E::labeled("k", r("string")),
                    r("ws"),
                    lit(":"),
                    r("ws"),
                    E::labeled("v", r("value")),
                ]),
                "member",
            ),
        ),
        Rule::new("array", list("[", "value", "]", "array")),
        Rule::new(
            "string",
            E::action(
                E::sequence(vec![
                    lit("\""),
                    E::labeled(
                        "s",
                        E::text(E::zero_or_more(E::class(
                            vec![ClassPart::Char('"'), ClassPart::Char('\n')],
                            true,
                            false,
                        ))),
                    ),
                    lit("\""),
                ]),
                "string",
            ),
        )
        .with_display_name("string"),
        Rule::new(
            "number",
            E::action(
                E::sequence(vec![
                    E::optional(lit("-")),
                    E::one_or_more(E::class(vec![ClassPart::Range('0', '9')], false, false)),
                    E::optional(E::sequence(vec![
                        lit("."),
                        E::one_or_more(E::class(vec![ClassPart::Range('0', '9')], false, false)),
                    ])),
                ]),
                "number",
            ),
        )
        .with_display_name("number"),
        Rule::new(
            "ws",
            E::zero_or_more(E::class(
                vec![ClassPart::Char(' '), ClassPart::Char('\n'), ClassPart::Char('\t')],
                false,
                false,
            )),
        )
        .with_display_name("whitespace"),
    ])
}

fn items(ctx: &pegmatite::language::ActionContext<'_>) -> Vec<Value> {
    let mut out = Vec::new();
    if let Some(Value::Array(parts)) = ctx.label("items") {
        out.extend(parts.get(0).cloned());
        if let Some(Value::Array(rest)) = parts.get(1) {
            out.extend(rest.iter().cloned());
        }
    }
    out
}

fn bindings() -> Bindings {
    Bindings::new()
        .bind_action("pick", |ctx| Ok(ctx.label("v").cloned().unwrap_or_default()))
        .bind_action("true", |_| Ok(Value::Bool(true)))
        .bind_action("false", |_| Ok(Value::Bool(false)))
        .bind_action("null", |_| Ok(Value::Null))
        .bind_action("string", |ctx| Ok(ctx.label("s").cloned().unwrap_or_default()))
        .bind_action("number", |ctx| {
            let text = ctx.text();
            match text.parse::<i64>() {
                Ok(n) => Ok(Value::Int(n)),
                Err(_) => text
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| ctx.expected("a number")),
            }
        })
        .bind_action("member", |ctx| {
            Ok(Value::array([
                ctx.label("k").cloned().unwrap_or_default(),
                ctx.label("v").cloned().unwrap_or_default(),
            ]))
        })
        .bind_action("array", |ctx| Ok(Value::array(items(ctx))))
        .bind_action("object", |ctx| {
            let entries = items(ctx).into_iter().filter_map(|pair| match pair {
                Value::Array(kv) => {
                    let key = kv.get(0).and_then(Value::as_str)?.to_string();
                    Some((key, kv.get(1).cloned().unwrap_or_default()))
                }
                _ => None,
            });
            Ok(Value::object(entries))
        })
}

fn parser(options: CompileOptions) -> Parser {
    compile_parser(grammar(), options.with_bindings(bindings())).unwrap()
}

#[test]
fn parses_nested_documents() {
    let p = parser(CompileOptions::default());
    let value = p
        .parse("{\"a\": [1, 2.5, true], \"b\": {\"c\": null}, \"d\": \"x y\"}")
        .unwrap();
    let expected = Value::object([
        (
            "a",
            Value::array([Value::Int(1), Value::Float(2.5), Value::Bool(true)]),
        ),
        ("b", Value::object([("c", Value::Null)])),
        ("d", Value::from("x y")),
    ]);
    assert_eq!(value, expected);
}

#[test]
fn empty_containers() {
    let p = parser(CompileOptions::default());
    assert_eq!(p.parse("[]").unwrap(), Value::empty_array());
    assert_eq!(p.parse(" { } ").unwrap(), Value::object(Vec::<(String, Value)>::new()));
}

#[test]
fn case_insensitive_keywords() {
    let p = parser(CompileOptions::default());
    assert_eq!(p.parse("[TRUE, False]").unwrap(), Value::array([true, false]));
}

#[test]
fn error_points_into_later_line() {
    let p = parser(CompileOptions::default());
    let err = p.parse("[1,\n 2,\n ]").unwrap_err();
    let syntax = err.as_syntax().unwrap();
    assert_eq!(syntax.location.start.line, 3);
    assert_eq!(syntax.location.start.column, 2);
    assert_eq!(syntax.found.as_deref(), Some("]"));
    assert!(syntax.message.contains("number"));
    assert!(syntax.message.contains("string"));
}

#[test]
fn unterminated_string_is_reported_at_its_start() {
    // The named rule hides the missing closing quote.
    let p = parser(CompileOptions::default());
    let err = p.parse("[\"abc").unwrap_err();
    let syntax = err.as_syntax().unwrap();
    assert_eq!(syntax.location.start.offset, 1);
    assert_eq!(syntax.found.as_deref(), Some("\""));
    assert!(syntax.message.contains("string"));
    assert!(syntax.message.contains("\"]\""));
}

#[test]
fn every_configuration_agrees() {
    let inputs = [
        "{\"k\": [1, {\"n\": -3}]}",
        "[1, 2, 3",
        "[nul]",
        "  \"s\"  ",
        "{\"a\" 1}",
    ];
    let reference = parser(CompileOptions::default());
    let configs = [
        CompileOptions::new().with_cache(true),
        CompileOptions::new().with_optimize(Optimize::Size),
        CompileOptions::new().with_optimize(Optimize::Size).with_cache(true),
    ];
    for options in configs {
        let p = parser(options);
        for input in inputs {
            assert_eq!(p.parse(input).ok(), reference.parse(input).ok(), "{input}");
        }
    }
}
