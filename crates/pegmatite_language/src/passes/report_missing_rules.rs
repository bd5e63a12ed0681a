//! Rejects references to rules that do not exist.

use std::collections::HashSet;

use pegmatite_foundation::{Error, ErrorContext, Location, Result};

use crate::ast::{ExprKind, Expression, Grammar};
use crate::options::CompileOptions;
use crate::visitor::{ExprVisitor, walk_expression};

/// Finds the first reference to an undefined rule.
struct MissingRuleFinder<'g> {
    defined: HashSet<&'g str>,
    missing: Option<(String, Option<Location>)>,
}

impl ExprVisitor for MissingRuleFinder<'_> {
    fn enter_expression(&mut self, expr: &Expression) {
        if self.missing.is_some() {
            return;
        }
        if let ExprKind::RuleRef(name) = &expr.kind {
            if !self.defined.contains(name.as_str()) {
                self.missing = Some((name.clone(), expr.location));
            }
        }
    }
}

/// Fails on the first reference, depth first in declaration order, to a rule
/// the grammar does not define.
///
/// # Errors
/// Returns [`pegmatite_foundation::ErrorKind::MissingRule`] naming the
/// undefined rule.
pub fn report_missing_rules(grammar: &mut Grammar, _options: &CompileOptions) -> Result<()> {
    let mut finder = MissingRuleFinder {
        defined: grammar.rules.iter().map(|r| r.name.as_str()).collect(),
        missing: None,
    };
    for rule in &grammar.rules {
        walk_expression(&mut finder, &rule.expression);
        if let Some((name, location)) = finder.missing.take() {
            let mut context = ErrorContext::new().with_rule(&rule.name);
            if let Some(location) = location {
                context = context.with_location(location);
            }
            return Err(Error::missing_rule(name).with_context(context));
        }
    }
    Ok(())
}
