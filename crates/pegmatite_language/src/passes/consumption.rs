//! Consumption analysis: can an expression succeed without consuming input?

use std::collections::HashMap;

use crate::ast::{ExprKind, Expression, Grammar};

/// Returns true if every successful match of `expr` consumes at least one
/// character.
///
/// Rules already under analysis count as consuming, which keeps the analysis
/// finite on recursive grammars; left recursion is reported separately.
#[must_use]
pub fn always_consumes_on_success(grammar: &Grammar, expr: &Expression) -> bool {
    Analysis::new(grammar).consumes(expr)
}

/// One analysis run.
///
/// A rule's answer is cached once it no longer depends on a rule further up
/// the stack. `low` is the shallowest stack index a cycle reached while the
/// current rule was being analysed.
struct Analysis<'g> {
    grammar: &'g Grammar,
    stack: Vec<&'g str>,
    cache: HashMap<&'g str, bool>,
    low: usize,
}

impl<'g> Analysis<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            stack: Vec::new(),
            cache: HashMap::new(),
            low: usize::MAX,
        }
    }

    fn consumes(&mut self, expr: &'g Expression) -> bool {
        match &expr.kind {
            ExprKind::Choice(alternatives) => alternatives.iter().all(|a| self.consumes(a)),
            ExprKind::Sequence(elements) => elements.iter().any(|e| self.consumes(e)),
            ExprKind::Labeled { expression, .. } | ExprKind::Action { expression, .. } => {
                self.consumes(expression)
            }
            ExprKind::Text(e) | ExprKind::Group(e) | ExprKind::OneOrMore(e) => self.consumes(e),
            ExprKind::SimpleAnd(_)
            | ExprKind::SimpleNot(_)
            | ExprKind::Optional(_)
            | ExprKind::ZeroOrMore(_)
            | ExprKind::SemanticAnd(_)
            | ExprKind::SemanticNot(_) => false,
            ExprKind::RuleRef(name) => self.rule(name),
            ExprKind::Literal { value, .. } => !value.is_empty(),
            ExprKind::Class { .. } | ExprKind::Any => true,
        }
    }

    fn rule(&mut self, name: &str) -> bool {
        let Some(rule) = self.grammar.rule(name) else {
            return true;
        };
        let name = rule.name.as_str();
        if let Some(&cached) = self.cache.get(name) {
            return cached;
        }
        if let Some(index) = self.stack.iter().position(|active| *active == name) {
            self.low = self.low.min(index);
            return true;
        }

        let depth = self.stack.len();
        self.stack.push(name);
        let outer_low = std::mem::replace(&mut self.low, usize::MAX);
        let result = self.consumes(&rule.expression);
        self.stack.pop();

        if self.low >= depth {
            self.cache.insert(name, result);
            self.low = outer_low;
        } else {
            self.low = outer_low.min(self.low);
        }
        result
    }
}
