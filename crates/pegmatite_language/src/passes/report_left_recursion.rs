//! Rejects rules that can reach themselves without consuming input.

use std::collections::HashSet;

use pegmatite_foundation::{Error, ErrorContext, Result};

use crate::ast::{ExprKind, Expression, Grammar};
use crate::options::CompileOptions;
use crate::passes::consumption::always_consumes_on_success;

struct LeftRecursionCheck<'g> {
    grammar: &'g Grammar,
    expanding: Vec<&'g str>,
    /// Rules fully expanded without finding a cycle.
    clean: HashSet<&'g str>,
}

impl<'g> LeftRecursionCheck<'g> {
    fn check(&mut self, expr: &'g Expression) -> Result<()> {
        match &expr.kind {
            ExprKind::RuleRef(name) => {
                if let Some(start) = self.expanding.iter().position(|n| *n == name.as_str()) {
                    let mut path: Vec<String> =
                        self.expanding[start..].iter().map(|n| (*n).to_string()).collect();
                    path.push(name.clone());
                    let mut context = ErrorContext::new().with_rule(name);
                    if let Some(location) = expr.location {
                        context = context.with_location(location);
                    }
                    return Err(Error::left_recursion(name, path).with_context(context));
                }
                let Some(rule) = self.grammar.rule(name) else {
                    return Ok(());
                };
                self.expand(&rule.name, &rule.expression)
            }
            ExprKind::Sequence(elements) => {
                for element in elements {
                    self.check(element)?;
                    if always_consumes_on_success(self.grammar, element) {
                        break;
                    }
                }
                Ok(())
            }
            ExprKind::Choice(alternatives) => {
                alternatives.iter().try_for_each(|alternative| self.check(alternative))
            }
            ExprKind::SemanticAnd(_)
            | ExprKind::SemanticNot(_)
            | ExprKind::Literal { .. }
            | ExprKind::Class { .. }
            | ExprKind::Any => Ok(()),
            _ => expr.children().iter().try_for_each(|child| self.check(child)),
        }
    }

    fn expand(&mut self, name: &'g str, expression: &'g Expression) -> Result<()> {
        if self.clean.contains(name) {
            return Ok(());
        }
        self.expanding.push(name);
        self.check(expression)?;
        self.expanding.pop();
        self.clean.insert(name);
        Ok(())
    }
}

/// Fails if any rule is reachable from itself along a path that consumes no
/// input.
///
/// # Errors
/// Returns [`pegmatite_foundation::ErrorKind::LeftRecursion`] naming the rule
/// and the cycle.
pub fn report_left_recursion(grammar: &mut Grammar, _options: &CompileOptions) -> Result<()> {
    let grammar: &Grammar = grammar;
    let mut check = LeftRecursionCheck {
        grammar,
        expanding: Vec::new(),
        clean: HashSet::new(),
    };
    for rule in &grammar.rules {
        check.expand(&rule.name, &rule.expression)?;
    }
    Ok(())
}
