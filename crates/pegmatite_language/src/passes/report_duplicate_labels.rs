//! Rejects labels that shadow a label already visible at that point.
//!
//! Label scopes mirror slot allocation: choice alternatives, action bodies,
//! labeled expressions, lookaheads, optionals, repetitions, groups and text
//! each open a scope, and a label is bound in the scope around it.

use pegmatite_foundation::{Error, ErrorContext, ErrorKind, Result};

use crate::ast::{ExprKind, Expression, Grammar};
use crate::options::CompileOptions;

struct LabelScopes<'g> {
    stack: Vec<Vec<&'g str>>,
}

impl<'g> LabelScopes<'g> {
    fn is_visible(&self, label: &str) -> bool {
        self.stack.iter().flatten().any(|l| *l == label)
    }

    fn bind(&mut self, label: &'g str) {
        if let Some(scope) = self.stack.last_mut() {
            scope.push(label);
        }
    }

    fn scoped(&mut self, expr: &'g Expression) -> std::result::Result<(), &'g Expression> {
        self.stack.push(Vec::new());
        let result = self.check(expr);
        self.stack.pop();
        result
    }

    /// Returns the offending labeled node on failure.
    fn check(&mut self, expr: &'g Expression) -> std::result::Result<(), &'g Expression> {
        match &expr.kind {
            ExprKind::Sequence(elements) => elements.iter().try_for_each(|e| self.check(e)),
            ExprKind::Choice(alternatives) => alternatives.iter().try_for_each(|a| self.scoped(a)),
            ExprKind::Labeled { label, expression } => {
                if self.is_visible(label) {
                    return Err(expr);
                }
                self.scoped(expression)?;
                self.bind(label);
                Ok(())
            }
            ExprKind::Action { expression, .. }
            | ExprKind::Text(expression)
            | ExprKind::SimpleAnd(expression)
            | ExprKind::SimpleNot(expression)
            | ExprKind::Optional(expression)
            | ExprKind::ZeroOrMore(expression)
            | ExprKind::OneOrMore(expression)
            | ExprKind::Group(expression) => self.scoped(expression),
            ExprKind::SemanticAnd(_)
            | ExprKind::SemanticNot(_)
            | ExprKind::RuleRef(_)
            | ExprKind::Literal { .. }
            | ExprKind::Class { .. }
            | ExprKind::Any => Ok(()),
        }
    }
}

/// Fails on the first label that is already visible where it is declared.
///
/// # Errors
/// Returns [`ErrorKind::DuplicateLabel`] naming the label.
pub fn report_duplicate_labels(grammar: &mut Grammar, _options: &CompileOptions) -> Result<()> {
    for rule in &grammar.rules {
        let mut scopes = LabelScopes {
            stack: vec![Vec::new()],
        };
        if let Err(node) = scopes.check(&rule.expression) {
            let ExprKind::Labeled { label, .. } = &node.kind else {
                return Err(Error::internal("duplicate label check returned a non-label node"));
            };
            let mut context = ErrorContext::new().with_rule(&rule.name);
            if let Some(location) = node.location {
                context = context.with_location(location);
            }
            return Err(Error::new(ErrorKind::DuplicateLabel {
                label: label.clone(),
            })
            .with_context(context));
        }
    }
    Ok(())
}
