//! Host bindings for grammar code blocks.
//!
//! Grammars carry action, predicate, and initializer code as source text. The
//! host binds each code text to a Rust closure; code is looked up by its text
//! with surrounding whitespace trimmed, so `{ return n; }` and `{return n;}`
//! are different blocks but ` return n; ` and `return n;` are the same.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use pegmatite_foundation::Value;

use crate::vm::{ActionContext, ActionResult};

/// A bound action.
pub type ActionFn = Arc<dyn Fn(&mut ActionContext<'_>) -> ActionResult<Value> + Send + Sync>;

/// A bound semantic predicate.
pub type PredicateFn = Arc<dyn Fn(&mut ActionContext<'_>) -> ActionResult<bool> + Send + Sync>;

/// A bound initializer: maps the parse's pass-through options to the initial
/// per-parse state.
pub type InitializerFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Table of code bindings.
#[derive(Clone, Default)]
pub struct Bindings {
    actions: BTreeMap<String, ActionFn>,
    predicates: BTreeMap<String, PredicateFn>,
    initializer: Option<InitializerFn>,
}

impl Bindings {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds action code.
    #[must_use]
    pub fn bind_action<F>(mut self, code: &str, f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>) -> ActionResult<Value> + Send + Sync + 'static,
    {
        self.actions.insert(code.trim().to_string(), Arc::new(f));
        self
    }

    /// Binds semantic predicate code.
    #[must_use]
    pub fn bind_predicate<F>(mut self, code: &str, f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>) -> ActionResult<bool> + Send + Sync + 'static,
    {
        self.predicates.insert(code.trim().to_string(), Arc::new(f));
        self
    }

    /// Binds the grammar initializer.
    #[must_use]
    pub fn bind_initializer<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.initializer = Some(Arc::new(f));
        self
    }

    /// Looks up action code.
    #[must_use]
    pub fn action(&self, code: &str) -> Option<&ActionFn> {
        self.actions.get(code.trim())
    }

    /// Looks up predicate code.
    #[must_use]
    pub fn predicate(&self, code: &str) -> Option<&PredicateFn> {
        self.predicates.get(code.trim())
    }

    /// Returns the initializer, if bound.
    #[must_use]
    pub fn initializer(&self) -> Option<&InitializerFn> {
        self.initializer.as_ref()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.predicates.is_empty() && self.initializer.is_none()
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("predicates", &self.predicates.keys().collect::<Vec<_>>())
            .field("initializer", &self.initializer.is_some())
            .finish()
    }
}
