//! Expression visitors for traversing and rewriting grammar ASTs.
//!
//! This module provides two traits:
//! - [`ExprVisitor`] - For read-only traversal
//! - [`ExprVisitorMut`] - For in-place rewriting
//!
//! # Example
//!
//! ```
//! use pegmatite_language::ast::Expression;
//! use pegmatite_language::visitor::{ExprVisitor, walk_expression};
//!
//! struct RefCounter(usize);
//!
//! impl ExprVisitor for RefCounter {
//!     fn visit_rule_ref(&mut self, _name: &str) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let expr = Expression::choice(vec![
//!     Expression::rule_ref("a"),
//!     Expression::sequence(vec![Expression::rule_ref("b"), Expression::any()]),
//! ]);
//! let mut counter = RefCounter(0);
//! walk_expression(&mut counter, &expr);
//! assert_eq!(counter.0, 2);
//! ```

use crate::ast::{ExprKind, Expression, Grammar};

// =============================================================================
// Read-Only Visitor
// =============================================================================

/// Trait for read-only expression visitors.
///
/// The default implementations do nothing. Use [`walk_expression`] or
/// [`walk_grammar`] to drive the traversal.
#[allow(unused_variables)]
pub trait ExprVisitor {
    /// Called when entering a rule body.
    fn enter_rule(&mut self, name: &str) {}

    /// Called when entering any node, before its children.
    fn enter_expression(&mut self, expr: &Expression) {}

    /// Called when leaving any node, after its children.
    fn leave_expression(&mut self, expr: &Expression) {}

    /// Visit a rule reference.
    fn visit_rule_ref(&mut self, name: &str) {}
}

/// Walks an expression depth-first.
pub fn walk_expression<V: ExprVisitor + ?Sized>(visitor: &mut V, expr: &Expression) {
    visitor.enter_expression(expr);
    if let ExprKind::RuleRef(name) = &expr.kind {
        visitor.visit_rule_ref(name);
    }
    for child in expr.children() {
        walk_expression(visitor, child);
    }
    visitor.leave_expression(expr);
}

/// Walks every rule of a grammar in declaration order.
pub fn walk_grammar<V: ExprVisitor + ?Sized>(visitor: &mut V, grammar: &Grammar) {
    for rule in &grammar.rules {
        visitor.enter_rule(&rule.name);
        walk_expression(visitor, &rule.expression);
    }
}

// =============================================================================
// Mutable Visitor
// =============================================================================

/// Trait for visitors that rewrite expressions in place.
#[allow(unused_variables)]
pub trait ExprVisitorMut {
    /// Called on every node before its children.
    fn visit_expression_mut(&mut self, expr: &mut Expression) {}

    /// Visit a rule reference's name.
    fn visit_rule_ref_mut(&mut self, name: &mut String) {}
}

/// Walks an expression depth-first, allowing rewrites.
pub fn walk_expression_mut<V: ExprVisitorMut + ?Sized>(visitor: &mut V, expr: &mut Expression) {
    visitor.visit_expression_mut(expr);
    if let ExprKind::RuleRef(name) = &mut expr.kind {
        visitor.visit_rule_ref_mut(name);
    }
    for child in expr.children_mut() {
        walk_expression_mut(visitor, child);
    }
}

/// Walks every rule body of a grammar, allowing rewrites.
pub fn walk_grammar_mut<V: ExprVisitorMut + ?Sized>(visitor: &mut V, grammar: &mut Grammar) {
    for rule in &mut grammar.rules {
        walk_expression_mut(visitor, &mut rule.expression);
    }
}

// =============================================================================
// Common Visitors
// =============================================================================

/// Collects the names of referenced rules, in encounter order.
#[derive(Debug, Default)]
pub struct RuleRefCollector {
    /// Referenced rule names (may repeat).
    pub names: Vec<String>,
}

impl ExprVisitor for RuleRefCollector {
    fn visit_rule_ref(&mut self, name: &str) {
        self.names.push(name.to_string());
    }
}

/// Renames references from one rule to another.
#[derive(Debug)]
pub struct RuleRefRenamer<'a> {
    /// Name to replace.
    pub from: &'a str,
    /// Replacement name.
    pub to: &'a str,
}

impl ExprVisitorMut for RuleRefRenamer<'_> {
    fn visit_rule_ref_mut(&mut self, name: &mut String) {
        if name == self.from {
            *name = self.to.to_string();
        }
    }
}
