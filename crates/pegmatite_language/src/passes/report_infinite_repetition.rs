//! Rejects repetitions whose body can succeed without consuming input.

use pegmatite_foundation::{Error, ErrorContext, ErrorKind, Location, Result};

use crate::ast::{ExprKind, Expression, Grammar};
use crate::options::CompileOptions;
use crate::passes::consumption::always_consumes_on_success;
use crate::visitor::{ExprVisitor, walk_expression};

struct RepetitionFinder<'g> {
    grammar: &'g Grammar,
    found: Option<Option<Location>>,
}

impl ExprVisitor for RepetitionFinder<'_> {
    fn enter_expression(&mut self, expr: &Expression) {
        if self.found.is_some() {
            return;
        }
        if let ExprKind::ZeroOrMore(body) | ExprKind::OneOrMore(body) = &expr.kind {
            if !always_consumes_on_success(self.grammar, body) {
                self.found = Some(expr.location);
            }
        }
    }
}

/// Fails on the first `*` or `+` whose expression may match empty input.
///
/// # Errors
/// Returns [`ErrorKind::InfiniteRepetition`] naming the containing rule.
pub fn report_infinite_repetition(grammar: &mut Grammar, _options: &CompileOptions) -> Result<()> {
    let grammar: &Grammar = grammar;
    let mut finder = RepetitionFinder {
        grammar,
        found: None,
    };
    for rule in &grammar.rules {
        walk_expression(&mut finder, &rule.expression);
        if let Some(location) = finder.found.take() {
            let mut context = ErrorContext::new().with_rule(&rule.name);
            if let Some(location) = location {
                context = context.with_location(location);
            }
            return Err(Error::new(ErrorKind::InfiniteRepetition {
                rule: rule.name.clone(),
            })
            .with_context(context));
        }
    }
    Ok(())
}
