//! Recording tracer integration tests

use pegmatite_debug::{HumanFormatter, RecordingTracer, TraceFormatter, TracerConfig};
use pegmatite_foundation::{ClassPart, Value};
use pegmatite_language::{
    CompileOptions, Expression as E, Grammar, ParseOptions, Parser, Rule, TraceEventKind,
    compile_parser,
};
use proptest::prelude::*;

/// `list = item ("," item)*`, `item = [0-9]+ / "x"`.
fn traced(cache: bool) -> Parser {
    let grammar = Grammar::new(vec![
        Rule::new(
            "list",
            E::sequence(vec![
                E::rule_ref("item"),
                E::zero_or_more(E::sequence(vec![E::literal(","), E::rule_ref("item")])),
            ]),
        ),
        Rule::new(
            "item",
            E::choice(vec![
                E::text(E::one_or_more(E::class(
                    vec![ClassPart::Range('0', '9')],
                    false,
                    false,
                ))),
                E::literal("x"),
            ]),
        ),
    ]);
    compile_parser(
        grammar,
        CompileOptions::new().with_trace(true).with_cache(cache),
    )
    .unwrap()
}

fn run(parser: &Parser, tracer: &mut RecordingTracer, input: &str) -> bool {
    tracer.start_parse();
    parser
        .parse_with(input, ParseOptions::new().tracer(tracer))
        .is_ok()
}

#[test]
fn records_every_rule_invocation() {
    let parser = traced(false);
    let mut tracer = RecordingTracer::default();
    assert!(run(&parser, &mut tracer, "1,x"));

    let events: Vec<_> = tracer
        .buffer()
        .iter()
        .map(|r| (r.kind, r.rule.as_str(), r.depth))
        .collect();
    use TraceEventKind::{Enter, Match};
    assert_eq!(
        events,
        [
            (Enter, "list", 0),
            (Enter, "item", 1),
            (Match, "item", 1),
            (Enter, "item", 1),
            (Match, "item", 1),
            (Match, "list", 0),
        ]
    );
}

#[test]
fn match_records_carry_results_and_spans() {
    let parser = traced(false);
    let mut tracer = RecordingTracer::default();
    assert!(run(&parser, &mut tracer, "12"));

    let matched = tracer.buffer().by_event_type("rule.match");
    let item = matched.iter().find(|r| r.rule == "item").unwrap();
    assert_eq!(item.result, Some(Value::from("12")));
    assert_eq!(item.location.start.offset, 0);
    assert_eq!(item.location.end.offset, 2);

    let entered = tracer.buffer().by_event_type("rule.enter");
    assert!(entered.iter().all(|r| r.location.start == r.location.end && r.result.is_none()));
}

#[test]
fn failed_parse_records_failures() {
    let parser = traced(false);
    let mut tracer = RecordingTracer::default();
    assert!(!run(&parser, &mut tracer, "?"));
    let failed = tracer.buffer().by_event_type("rule.fail");
    let rules: Vec<_> = failed.iter().map(|r| r.rule.as_str()).collect();
    assert_eq!(rules, ["item", "list"]);
}

#[test]
fn cache_hits_are_still_reported() {
    let uncached = traced(false);
    let cached = traced(true);
    let mut a = RecordingTracer::default();
    let mut b = RecordingTracer::default();
    run(&uncached, &mut a, "1,2,3");
    run(&cached, &mut b, "1,2,3");
    let kinds = |t: &RecordingTracer| t.buffer().iter().map(|r| r.kind).collect::<Vec<_>>();
    assert_eq!(kinds(&a), kinds(&b));
}

#[test]
fn human_output_matches_layout() {
    let parser = traced(false);
    let mut tracer = RecordingTracer::default();
    run(&parser, &mut tracer, "7");
    let records = tracer.buffer().recent(usize::MAX);
    let text = HumanFormatter::new().format_many(&records);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], "1:1-1:1 rule.enter  list");
    assert_eq!(lines[1], "1:1-1:1 rule.enter    item");
    assert_eq!(lines[2], "1:1-1:2 rule.match    item");
    assert_eq!(lines[3], "1:1-1:2 rule.match  list");
}

#[test]
fn filtered_tracer_keeps_only_requested_events() {
    let parser = traced(false);
    let mut tracer = RecordingTracer::new(TracerConfig::new().filter_events(["rule.fail"]));
    run(&parser, &mut tracer, "1,");
    assert!(tracer.buffer().iter().all(|r| r.kind == TraceEventKind::Fail));
    assert!(!tracer.buffer().is_empty());
}

#[test]
fn parses_are_told_apart() {
    let parser = traced(false);
    let mut tracer = RecordingTracer::default();
    run(&parser, &mut tracer, "1");
    run(&parser, &mut tracer, "1,2");
    assert_eq!(tracer.buffer().records_for_parse(1).len(), 4);
    assert_eq!(tracer.buffer().records_for_parse(2).len(), 6);
    assert_eq!(tracer.stats().parse_count, 2);
}

#[test]
fn json_lines_round_trip_through_serde_json() {
    let parser = traced(false);
    let mut tracer = RecordingTracer::new(TracerConfig::new().json());
    run(&parser, &mut tracer, "5");
    let mut out = Vec::new();
    tracer.write_json_lines(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    assert_eq!(first["type"], "rule.enter");
    assert_eq!(first["rule"], "list");
    assert_eq!(first["location"]["start"]["line"], 1);
}

proptest! {
    #[test]
    fn depth_returns_to_zero(input in "[0-9x,?]{0,10}") {
        let parser = traced(false);
        let mut tracer = RecordingTracer::default();
        run(&parser, &mut tracer, &input);
        prop_assert_eq!(tracer.depth(), 0);
        let stats = tracer.stats();
        prop_assert_eq!(
            stats.event_counts.get("rule.enter").copied().unwrap_or(0),
            stats.event_counts.get("rule.match").copied().unwrap_or(0)
                + stats.event_counts.get("rule.fail").copied().unwrap_or(0)
        );
    }
}
