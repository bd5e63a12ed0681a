//! The compiled artifact: per-rule bytecode plus a shared constant pool.
//!
//! A [`Program`] is immutable once generated and holds only `Send + Sync`
//! data, so one program can serve any number of parses, in sequence or in
//! parallel.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use pegmatite_foundation::Expectation;

use crate::bindings::{ActionFn, InitializerFn, PredicateFn};
use crate::charclass::CharClass;
use crate::opcode::Bytecode;

/// A compiled rule.
#[derive(Clone, Debug)]
pub struct CompiledRule {
    /// Rule name.
    pub name: String,
    /// Rule bytecode.
    pub code: Bytecode,
    /// Frame size.
    pub slot_count: usize,
    /// Slot holding the rule's result when the code finishes.
    pub result_slot: usize,
}

/// A constant pool entry.
///
/// Entries are appended in encounter order and never deduplicated.
#[derive(Clone)]
pub enum Constant {
    /// Literal text.
    String(Arc<str>),
    /// A compiled character class.
    Class(CharClass),
    /// A failure descriptor.
    Expectation(Expectation),
    /// Action code and its binding.
    Action {
        /// Code text as written in the grammar.
        code: String,
        /// Labels passed to the closure, in order.
        labels: Vec<String>,
        /// The bound closure.
        func: ActionFn,
    },
    /// Predicate code and its binding.
    Predicate {
        /// Code text as written in the grammar.
        code: String,
        /// Labels passed to the closure, in order.
        labels: Vec<String>,
        /// The bound closure.
        func: PredicateFn,
    },
}

impl Constant {
    /// Returns the kind name used in listings.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Class(_) => "class",
            Self::Expectation(_) => "expect",
            Self::Action { .. } => "action",
            Self::Predicate { .. } => "predicate",
        }
    }
}

impl fmt::Debug for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Class(c) => f.debug_tuple("Class").field(c).finish(),
            Self::Expectation(e) => f.debug_tuple("Expectation").field(e).finish(),
            Self::Action { code, labels, .. } => f
                .debug_struct("Action")
                .field("code", code)
                .field("labels", labels)
                .finish_non_exhaustive(),
            Self::Predicate { code, labels, .. } => f
                .debug_struct("Predicate")
                .field("code", code)
                .field("labels", labels)
                .finish_non_exhaustive(),
        }
    }
}

/// A compiled grammar.
#[derive(Clone, Default)]
pub struct Program {
    /// Rules in declaration order.
    pub rules: Vec<CompiledRule>,
    /// Shared constant pool.
    pub constants: Vec<Constant>,
    /// Rule name to index.
    pub rule_index: HashMap<String, usize>,
    /// Default start rule.
    pub start_rule: String,
    /// Rules a parse may start from.
    pub allowed_start_rules: Vec<String>,
    /// Removed proxy names and the rules they resolve to.
    pub aliases: BTreeMap<String, String>,
    /// Whether rule results are memoized.
    pub cache: bool,
    /// Whether rule events are traced.
    pub trace: bool,
    /// Initializer code, if the grammar has one.
    pub initializer: Option<InitializerFn>,
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("rules", &self.rules)
            .field("constants", &self.constants)
            .field("start_rule", &self.start_rule)
            .field("allowed_start_rules", &self.allowed_start_rules)
            .field("aliases", &self.aliases)
            .field("cache", &self.cache)
            .field("trace", &self.trace)
            .field("initializer", &self.initializer.is_some())
            .finish_non_exhaustive()
    }
}

impl Program {
    /// Looks up a rule index by name, following aliases.
    #[must_use]
    pub fn rule_id(&self, name: &str) -> Option<usize> {
        let name = self.aliases.get(name).map_or(name, String::as_str);
        self.rule_index.get(name).copied()
    }

    /// Returns true if a parse may start from `name`.
    #[must_use]
    pub fn is_allowed_start_rule(&self, name: &str) -> bool {
        let name = self.aliases.get(name).map_or(name, String::as_str);
        self.allowed_start_rules.iter().any(|r| r == name)
    }

    /// Returns the constant at `idx`.
    #[must_use]
    pub fn constant(&self, idx: u16) -> Option<&Constant> {
        self.constants.get(usize::from(idx))
    }

    /// Total instruction count across rules.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.rules.iter().map(|r| r.code.len()).sum()
    }
}
