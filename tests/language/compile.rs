//! Compiler pipeline integration tests
//!
//! Tests semantic checks, proxy removal, start rules, listings, and plugins.

use pegmatite_foundation::{ClassPart, ErrorKind};
use pegmatite_language::{
    CompileOptions, CompileOutput, Compiler, Expression as E, Grammar, OutputFormat,
    ParseOptions, PassConfig, Plugin, Rule, Stage, compile, compile_parser,
};

fn rules(rules: Vec<Rule>) -> Grammar {
    Grammar::new(rules)
}

fn error_kind(grammar: Grammar) -> (ErrorKind, Option<String>) {
    match compile(grammar, CompileOptions::default()) {
        Err(err) => (err.kind, err.context.and_then(|c| c.pass)),
        Ok(_) => panic!("grammar compiled"),
    }
}

// =============================================================================
// Semantic Checks
// =============================================================================

#[test]
fn duplicate_rule() {
    let (kind, pass) = error_kind(rules(vec![
        Rule::new("a", E::literal("x")),
        Rule::new("a", E::literal("y")),
    ]));
    assert!(matches!(kind, ErrorKind::DuplicateRule(ref r) if r == "a"));
    assert_eq!(pass.as_deref(), Some("report_duplicate_rules"));
}

#[test]
fn missing_rule() {
    let (kind, pass) = error_kind(rules(vec![Rule::new("a", E::rule_ref("b"))]));
    assert!(matches!(kind, ErrorKind::MissingRule(ref r) if r == "b"));
    assert_eq!(pass.as_deref(), Some("report_missing_rules"));
}

#[test]
fn duplicate_label_in_nested_scope() {
    let body = E::sequence(vec![
        E::labeled("x", E::literal("a")),
        E::group(E::sequence(vec![E::labeled("x", E::literal("b"))])),
    ]);
    let (kind, _) = error_kind(rules(vec![Rule::new("a", body)]));
    assert!(matches!(kind, ErrorKind::DuplicateLabel { ref label } if label == "x"));
}

#[test]
fn same_label_in_sibling_alternatives_is_fine() {
    let body = E::choice(vec![
        E::labeled("x", E::literal("a")),
        E::labeled("x", E::literal("b")),
    ]);
    assert!(compile_parser(rules(vec![Rule::new("a", body)]), CompileOptions::default()).is_ok());
}

#[test]
fn direct_left_recursion() {
    let (kind, pass) = error_kind(rules(vec![Rule::new(
        "a",
        E::sequence(vec![E::rule_ref("a"), E::literal("x")]),
    )]));
    assert!(matches!(kind, ErrorKind::LeftRecursion { .. }));
    assert_eq!(pass.as_deref(), Some("report_left_recursion"));
}

#[test]
fn left_recursion_through_nullable_prefix() {
    let (kind, _) = error_kind(rules(vec![
        Rule::new(
            "a",
            E::sequence(vec![E::optional(E::literal("-")), E::rule_ref("b")]),
        ),
        Rule::new("b", E::choice(vec![E::rule_ref("a"), E::literal("1")])),
    ]));
    match kind {
        ErrorKind::LeftRecursion { path, .. } => {
            assert_eq!(path.first(), path.last());
            assert!(path.len() >= 3);
        }
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn recursion_after_consumption_is_fine() {
    let g = rules(vec![Rule::new(
        "a",
        E::choice(vec![
            E::sequence(vec![E::literal("("), E::rule_ref("a"), E::literal(")")]),
            E::literal("x"),
        ]),
    )]);
    let parser = compile_parser(g, CompileOptions::default()).unwrap();
    assert!(parser.parse("((x))").is_ok());
}

#[test]
fn infinite_repetition() {
    let (kind, pass) = error_kind(rules(vec![Rule::new(
        "a",
        E::zero_or_more(E::optional(E::literal("x"))),
    )]));
    assert!(matches!(kind, ErrorKind::InfiniteRepetition { ref rule } if rule == "a"));
    assert_eq!(pass.as_deref(), Some("report_infinite_repetition"));
}

#[test]
fn deeply_shared_rules_compile_quickly() {
    // Every rule reaches the next one twice, so checks that re-walk shared
    // rules would take 2^40 steps.
    let depth = 40;
    let mut chain = vec![Rule::new("start", E::zero_or_more(E::rule_ref("r0")))];
    chain.extend((0..depth).map(|i| {
        let next = format!("r{}", i + 1);
        Rule::new(
            format!("r{i}"),
            E::choice(vec![E::rule_ref(next.as_str()), E::rule_ref(next.as_str())]),
        )
    }));
    chain.push(Rule::new(format!("r{depth}"), E::literal("x")));

    let parser = compile_parser(rules(chain), CompileOptions::new().with_cache(true)).unwrap();
    assert!(parser.parse("xxx").is_ok());
}

#[test]
fn invalid_character_range() {
    let (kind, _) = error_kind(rules(vec![Rule::new(
        "a",
        E::class(vec![ClassPart::Range('z', 'a')], false, false),
    )]));
    assert!(matches!(kind, ErrorKind::InvalidCharacterRange { start: 'z', end: 'a' }));
}

#[test]
fn unknown_allowed_start_rule() {
    let err = compile(
        rules(vec![Rule::new("a", E::literal("x"))]),
        CompileOptions::new().with_allowed_start_rules(["nope"]),
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownStartRule(ref r) if r == "nope"));
}

#[test]
fn unbound_action_code() {
    let err = compile(
        rules(vec![Rule::new("a", E::action(E::literal("x"), "f()"))]),
        CompileOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnboundCode(ref c) if c == "f()"));
    assert!(err.is_compile_error());
}

// =============================================================================
// Proxy Rules and Start Rules
// =============================================================================

fn proxied() -> Grammar {
    rules(vec![
        Rule::new("start", E::sequence(vec![E::rule_ref("word"), E::literal("!")])),
        Rule::new("word", E::rule_ref("letters")),
        Rule::new(
            "letters",
            E::text(E::one_or_more(E::class(
                vec![ClassPart::Range('a', 'z')],
                false,
                false,
            ))),
        ),
    ])
}

#[test]
fn proxy_rules_are_removed_but_still_callable() {
    let parser = compile_parser(
        proxied(),
        CompileOptions::new().with_allowed_start_rules(["*"]),
    )
    .unwrap();
    assert!(parser.program().rule_id("word").is_some());
    assert_eq!(parser.program().rules.len(), 2);
    assert!(parser
        .parse_with("abc", ParseOptions::new().start_rule("word"))
        .is_ok());
}

#[test]
fn start_rule_must_be_allowed() {
    let parser = compile_parser(proxied(), CompileOptions::default()).unwrap();
    assert!(parser.parse("abc!").is_ok());
    let err = parser
        .parse_with("abc", ParseOptions::new().start_rule("letters"))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::StartRuleNotAllowed(ref r) if r == "letters"));
}

#[test]
fn explicit_start_rule_list() {
    let parser = compile_parser(
        proxied(),
        CompileOptions::new().with_allowed_start_rules(["letters", "start"]),
    )
    .unwrap();
    assert!(parser.parse("ab!").is_ok());
    assert!(parser
        .parse_with("ab", ParseOptions::new().start_rule("letters"))
        .is_ok());
}

// =============================================================================
// Output
// =============================================================================

#[test]
fn source_output_is_a_listing() {
    let out = compile(
        proxied(),
        CompileOptions::new().with_output(OutputFormat::Source),
    )
    .unwrap();
    let listing = out.into_source().unwrap();
    assert!(listing.starts_with("; start rule: start"));
    assert!(listing.contains("; alias word -> letters"));
    assert!(listing.contains("rule 1 letters"));
    assert!(listing.contains("constants"));
}

#[test]
fn parser_listing_matches_source_output() {
    let parser = compile_parser(proxied(), CompileOptions::default()).unwrap();
    let source = compile(proxied(), CompileOptions::new().with_output(OutputFormat::Source))
        .unwrap()
        .into_source()
        .unwrap();
    assert_eq!(parser.listing(), source);
}

#[test]
fn constants_are_not_deduplicated() {
    let g = rules(vec![Rule::new(
        "a",
        E::choice(vec![E::literal("xy"), E::literal("xy")]),
    )]);
    let parser = compile_parser(g, CompileOptions::default()).unwrap();
    let strings = parser
        .listing()
        .lines()
        .filter(|l| l.contains("\"xy\""))
        .count();
    assert!(strings >= 2);
}

// =============================================================================
// Plugins
// =============================================================================

struct ForceCache;

impl Plugin for ForceCache {
    fn configure(&self, _passes: &mut PassConfig, options: &mut CompileOptions) {
        options.cache = true;
    }
}

#[test]
fn plugin_can_change_options() {
    let out = Compiler::default()
        .with_plugin(ForceCache)
        .compile(proxied())
        .unwrap();
    let CompileOutput::Parser(parser) = out else {
        panic!("expected a parser");
    };
    assert!(parser.program().cache);
}

struct AddRule;

impl Plugin for AddRule {
    fn before_stage(
        &self,
        stage: Stage,
        grammar: &mut Grammar,
    ) -> pegmatite_foundation::Result<()> {
        if stage == Stage::Check {
            grammar.rules.push(Rule::new("extra", E::literal("?")));
        }
        Ok(())
    }
}

#[test]
fn plugin_can_add_rules_before_checks() {
    let parser = Compiler::new(CompileOptions::new().with_allowed_start_rules(["*"]))
        .with_plugin(AddRule)
        .compile(proxied())
        .unwrap()
        .into_parser()
        .unwrap();
    assert!(parser
        .parse_with("?", ParseOptions::new().start_rule("extra"))
        .is_ok());
}

#[test]
fn pass_lists_are_editable() {
    let mut compiler = Compiler::default();
    compiler
        .passes_mut()
        .check
        .retain(|p| p.name != "report_missing_rules");
    assert!(!compiler.passes().names(Stage::Check).contains(&"report_missing_rules"));
}
