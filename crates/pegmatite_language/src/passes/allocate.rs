//! Slot allocation.
//!
//! Every expression gets a result slot, backtrack points get a position slot,
//! and actions and predicates get the list of labels visible at their site.
//! Slots come from a per-rule first-fit pool with reference counts; label
//! bindings hold a reference for the lifetime of their scope, so a labeled
//! value stays live until every action that can see it has run.

use pegmatite_foundation::{Error, ErrorContext, Result};
use tracing::trace;

use crate::ast::{ExprKind, Expression, Grammar, Slot};
use crate::options::CompileOptions;

/// First-fit reference-counted slot pool.
#[derive(Debug, Default, Clone)]
pub struct SlotPool {
    refs: Vec<usize>,
}

impl SlotPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every slot.
    pub fn reset(&mut self) {
        self.refs.clear();
    }

    /// Returns the lowest free slot with one reference, growing the pool if
    /// every slot is live.
    pub fn alloc(&mut self) -> Slot {
        if let Some(slot) = self.refs.iter().position(|&n| n == 0) {
            self.refs[slot] = 1;
            slot
        } else {
            self.refs.push(1);
            self.refs.len() - 1
        }
    }

    /// Adds a reference to a live slot.
    ///
    /// # Errors
    /// Fails if the slot is not live.
    pub fn retain(&mut self, slot: Slot) -> Result<()> {
        match self.refs.get_mut(slot) {
            Some(n) if *n > 0 => {
                *n += 1;
                Ok(())
            }
            _ => Err(Error::internal(format!("retain of free slot {slot}"))),
        }
    }

    /// Drops a reference; at zero the slot becomes free.
    ///
    /// # Errors
    /// Fails if the slot is not live.
    pub fn release(&mut self, slot: Slot) -> Result<()> {
        match self.refs.get_mut(slot) {
            Some(n) if *n > 0 => {
                *n -= 1;
                Ok(())
            }
            _ => Err(Error::internal(format!("release of free slot {slot}"))),
        }
    }

    /// Returns true if the slot has references.
    #[must_use]
    pub fn is_live(&self, slot: Slot) -> bool {
        self.refs.get(slot).is_some_and(|&n| n > 0)
    }

    /// Highest slot ever handed out plus one.
    #[must_use]
    pub fn size(&self) -> usize {
        self.refs.len()
    }
}

/// Stack of lexical label scopes.
#[derive(Debug, Default)]
pub struct Scopes {
    stack: Vec<Vec<(String, Slot)>>,
}

impl Scopes {
    /// Opens a scope.
    pub fn push(&mut self) {
        self.stack.push(Vec::new());
    }

    /// Closes the innermost scope and returns its bindings.
    pub fn pop(&mut self) -> Vec<(String, Slot)> {
        self.stack.pop().unwrap_or_default()
    }

    /// Binds a label in the innermost scope.
    pub fn bind(&mut self, label: &str, slot: Slot) {
        if let Some(scope) = self.stack.last_mut() {
            scope.push((label.to_string(), slot));
        }
    }

    /// Labels visible from the innermost scope, outermost first.
    #[must_use]
    pub fn visible(&self) -> Vec<(String, Slot)> {
        self.stack.iter().flatten().cloned().collect()
    }
}

/// Per-rule allocation state.
#[derive(Debug, Default)]
struct Allocator {
    pool: SlotPool,
    scopes: Scopes,
}

impl Allocator {
    fn push_scope(&mut self) {
        self.scopes.push();
    }

    fn pop_scope(&mut self) -> Result<()> {
        for (_, slot) in self.scopes.pop() {
            self.pool.release(slot)?;
        }
        Ok(())
    }

    fn scoped(&mut self, expr: &mut Expression, result: Slot) -> Result<()> {
        self.push_scope();
        self.expression(expr, result)?;
        self.pop_scope()
    }

    fn rule(&mut self, expr: &mut Expression) -> Result<(Slot, usize)> {
        self.pool.reset();
        self.scopes = Scopes::default();
        self.push_scope();
        let result = self.pool.alloc();
        self.expression(expr, result)?;
        self.pop_scope()?;
        self.pool.release(result)?;
        Ok((result, self.pool.size()))
    }

    /// Allocates `expr`, whose result goes to `result` (owned by the caller).
    fn expression(&mut self, expr: &mut Expression, result: Slot) -> Result<()> {
        expr.slots.result = Some(result);
        match &mut expr.kind {
            ExprKind::Choice(alternatives) => {
                for alternative in alternatives {
                    self.scoped(alternative, result)?;
                }
            }
            ExprKind::Sequence(elements) => {
                let position = self.pool.alloc();
                expr.slots.position = Some(position);
                let mut held = Vec::with_capacity(elements.len());
                for element in elements {
                    let slot = self.pool.alloc();
                    held.push(slot);
                    self.expression(element, slot)?;
                }
                for slot in held {
                    self.pool.release(slot)?;
                }
                self.pool.release(position)?;
            }
            ExprKind::Labeled { label, expression } => {
                self.scoped(expression, result)?;
                self.scopes.bind(label, result);
                self.pool.retain(result)?;
            }
            ExprKind::Action { expression, .. } => {
                let position = self.pool.alloc();
                expr.slots.position = Some(position);
                self.push_scope();
                self.expression(expression, result)?;
                expr.slots.params = Some(self.scopes.visible());
                self.pop_scope()?;
                self.pool.release(position)?;
            }
            ExprKind::Text(expression)
            | ExprKind::SimpleAnd(expression)
            | ExprKind::SimpleNot(expression) => {
                let position = self.pool.alloc();
                expr.slots.position = Some(position);
                self.scoped(expression, result)?;
                self.pool.release(position)?;
            }
            ExprKind::Optional(expression) | ExprKind::Group(expression) => {
                self.scoped(expression, result)?;
            }
            ExprKind::ZeroOrMore(expression) | ExprKind::OneOrMore(expression) => {
                let scratch = self.pool.alloc();
                self.scoped(expression, scratch)?;
                self.pool.release(scratch)?;
            }
            ExprKind::SemanticAnd(_) | ExprKind::SemanticNot(_) => {
                expr.slots.params = Some(self.scopes.visible());
            }
            ExprKind::RuleRef(_)
            | ExprKind::Literal { .. }
            | ExprKind::Class { .. }
            | ExprKind::Any => {}
        }
        Ok(())
    }
}

/// Assigns slots to every node and records each rule's frame size.
///
/// # Errors
/// Fails only on a broken allocator invariant.
pub fn allocate_slots(grammar: &mut Grammar, _options: &CompileOptions) -> Result<()> {
    let mut allocator = Allocator::default();
    for rule in &mut grammar.rules {
        let (_, slot_count) = allocator
            .rule(&mut rule.expression)
            .map_err(|e| e.with_context(ErrorContext::new().with_rule(&rule.name)))?;
        rule.slot_count = Some(slot_count);
        trace!(rule = %rule.name, slots = slot_count, "allocated slots");
    }
    Ok(())
}
