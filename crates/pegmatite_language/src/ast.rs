//! Grammar AST.
//!
//! The front end that parses grammar source text produces this tree; every
//! compiler pass reads or rewrites it. Allocation results are written back onto
//! the nodes ([`Slots`], [`Rule::slot_count`]) and the generate stage leaves
//! the compiled [`Program`] on the [`Grammar`].

use std::collections::BTreeMap;

use pegmatite_foundation::{ClassPart, Expectation, Location};

use crate::program::Program;

/// Index of a storage slot in a rule invocation's frame.
pub type Slot = usize;

/// A whole grammar.
#[derive(Clone, Debug)]
pub struct Grammar {
    /// Initializer code run once per parse to produce the per-parse state.
    pub initializer: Option<String>,
    /// Rules in declaration order.
    pub rules: Vec<Rule>,
    /// Name of the default start rule.
    pub start_rule: String,
    /// Removed proxy rules, mapped to the rule they stood for.
    pub aliases: BTreeMap<String, String>,
    /// The compiled program, set by the generate stage.
    pub program: Option<Program>,
}

impl Grammar {
    /// Creates a grammar whose start rule is the first rule.
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        let start_rule = rules.first().map(|r| r.name.clone()).unwrap_or_default();
        Self {
            initializer: None,
            rules,
            start_rule,
            aliases: BTreeMap::new(),
            program: None,
        }
    }

    /// Sets the initializer code.
    #[must_use]
    pub fn with_initializer(mut self, code: impl Into<String>) -> Self {
        self.initializer = Some(code.into());
        self
    }

    /// Sets the start rule.
    #[must_use]
    pub fn with_start_rule(mut self, name: impl Into<String>) -> Self {
        self.start_rule = name.into();
        self
    }

    /// Finds a rule by name.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Returns the index of a rule by name.
    #[must_use]
    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name == name)
    }

    /// Resolves a name through the alias table left by proxy removal.
    #[must_use]
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }
}

/// A named grammar rule.
#[derive(Clone, Debug)]
pub struct Rule {
    /// Rule name.
    pub name: String,
    /// Human-friendly name used in error messages instead of the rule's
    /// low-level expectations.
    pub display_name: Option<String>,
    /// The rule body.
    pub expression: Expression,
    /// Where the rule is defined in the grammar source.
    pub location: Option<Location>,
    /// Frame size, set by slot allocation.
    pub slot_count: Option<usize>,
    /// Expectation recorded when a named rule fails, set by `report_failures`.
    pub failure: Option<Expectation>,
}

impl Rule {
    /// Creates a rule.
    pub fn new(name: impl Into<String>, expression: Expression) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            expression,
            location: None,
            slot_count: None,
            failure: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Returns true if the body is exactly a reference to another rule.
    #[must_use]
    pub fn is_proxy(&self) -> bool {
        self.display_name.is_none() && matches!(self.expression.kind, ExprKind::RuleRef(_))
    }
}

/// Slots assigned to an expression by the allocation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Slots {
    /// Where the node's match result is stored.
    pub result: Option<Slot>,
    /// Where the node saves the position it may need to restore or report.
    pub position: Option<Slot>,
    /// Labels visible at an action or predicate, in declaration order.
    pub params: Option<Vec<(String, Slot)>>,
}

/// An expression node.
#[derive(Clone, Debug)]
pub struct Expression {
    /// What the node does.
    pub kind: ExprKind,
    /// Where the node appears in the grammar source.
    pub location: Option<Location>,
    /// Allocation results.
    pub slots: Slots,
}

/// Expression variants.
#[derive(Clone, Debug)]
pub enum ExprKind {
    /// Ordered choice `a / b`.
    Choice(Vec<Expression>),
    /// Sequence `a b c`.
    Sequence(Vec<Expression>),
    /// `label:expression`.
    Labeled {
        /// The label.
        label: String,
        /// The labeled expression.
        expression: Box<Expression>,
    },
    /// `expression { code }`.
    Action {
        /// The matched expression.
        expression: Box<Expression>,
        /// Code whose result replaces the match value.
        code: String,
    },
    /// `$expression`: the matched text.
    Text(Box<Expression>),
    /// `&expression`.
    SimpleAnd(Box<Expression>),
    /// `!expression`.
    SimpleNot(Box<Expression>),
    /// `expression?`.
    Optional(Box<Expression>),
    /// `expression*`.
    ZeroOrMore(Box<Expression>),
    /// `expression+`.
    OneOrMore(Box<Expression>),
    /// `( expression )`.
    Group(Box<Expression>),
    /// `&{ code }`.
    SemanticAnd(String),
    /// `!{ code }`.
    SemanticNot(String),
    /// A reference to a rule.
    RuleRef(String),
    /// `"literal"` or `"literal"i`.
    Literal {
        /// The literal text.
        value: String,
        /// Case-insensitive match.
        ignore_case: bool,
    },
    /// `[a-z]`, `[^0-9]`, `[a-z]i`.
    Class {
        /// Characters and ranges.
        parts: Vec<ClassPart>,
        /// Inverted class.
        inverted: bool,
        /// Case-insensitive match.
        ignore_case: bool,
    },
    /// `.`
    Any,
}

impl Expression {
    /// Creates an expression with no location and no slots.
    #[must_use]
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            location: None,
            slots: Slots::default(),
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// `a / b / ...`
    #[must_use]
    pub fn choice(alternatives: Vec<Expression>) -> Self {
        Self::new(ExprKind::Choice(alternatives))
    }

    /// `a b ...`
    #[must_use]
    pub fn sequence(elements: Vec<Expression>) -> Self {
        Self::new(ExprKind::Sequence(elements))
    }

    /// `label:expression`
    pub fn labeled(label: impl Into<String>, expression: Expression) -> Self {
        Self::new(ExprKind::Labeled {
            label: label.into(),
            expression: Box::new(expression),
        })
    }

    /// `expression { code }`
    pub fn action(expression: Expression, code: impl Into<String>) -> Self {
        Self::new(ExprKind::Action {
            expression: Box::new(expression),
            code: code.into(),
        })
    }

    /// `$expression`
    #[must_use]
    pub fn text(expression: Expression) -> Self {
        Self::new(ExprKind::Text(Box::new(expression)))
    }

    /// `&expression`
    #[must_use]
    pub fn simple_and(expression: Expression) -> Self {
        Self::new(ExprKind::SimpleAnd(Box::new(expression)))
    }

    /// `!expression`
    #[must_use]
    pub fn simple_not(expression: Expression) -> Self {
        Self::new(ExprKind::SimpleNot(Box::new(expression)))
    }

    /// `expression?`
    #[must_use]
    pub fn optional(expression: Expression) -> Self {
        Self::new(ExprKind::Optional(Box::new(expression)))
    }

    /// `expression*`
    #[must_use]
    pub fn zero_or_more(expression: Expression) -> Self {
        Self::new(ExprKind::ZeroOrMore(Box::new(expression)))
    }

    /// `expression+`
    #[must_use]
    pub fn one_or_more(expression: Expression) -> Self {
        Self::new(ExprKind::OneOrMore(Box::new(expression)))
    }

    /// `( expression )`
    #[must_use]
    pub fn group(expression: Expression) -> Self {
        Self::new(ExprKind::Group(Box::new(expression)))
    }

    /// `&{ code }`
    pub fn semantic_and(code: impl Into<String>) -> Self {
        Self::new(ExprKind::SemanticAnd(code.into()))
    }

    /// `!{ code }`
    pub fn semantic_not(code: impl Into<String>) -> Self {
        Self::new(ExprKind::SemanticNot(code.into()))
    }

    /// A reference to rule `name`.
    pub fn rule_ref(name: impl Into<String>) -> Self {
        Self::new(ExprKind::RuleRef(name.into()))
    }

    /// `"value"`
    pub fn literal(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Literal {
            value: value.into(),
            ignore_case: false,
        })
    }

    /// `"value"i`
    pub fn literal_ic(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Literal {
            value: value.into(),
            ignore_case: true,
        })
    }

    /// `[...]`
    #[must_use]
    pub fn class(parts: Vec<ClassPart>, inverted: bool, ignore_case: bool) -> Self {
        Self::new(ExprKind::Class {
            parts,
            inverted,
            ignore_case,
        })
    }

    /// `.`
    #[must_use]
    pub fn any() -> Self {
        Self::new(ExprKind::Any)
    }

    /// Returns the direct children of this node.
    #[must_use]
    pub fn children(&self) -> &[Expression] {
        match &self.kind {
            ExprKind::Choice(items) | ExprKind::Sequence(items) => items,
            ExprKind::Labeled { expression, .. } | ExprKind::Action { expression, .. } => {
                std::slice::from_ref(expression.as_ref())
            }
            ExprKind::Text(e)
            | ExprKind::SimpleAnd(e)
            | ExprKind::SimpleNot(e)
            | ExprKind::Optional(e)
            | ExprKind::ZeroOrMore(e)
            | ExprKind::OneOrMore(e)
            | ExprKind::Group(e) => std::slice::from_ref(e.as_ref()),
            ExprKind::SemanticAnd(_)
            | ExprKind::SemanticNot(_)
            | ExprKind::RuleRef(_)
            | ExprKind::Literal { .. }
            | ExprKind::Class { .. }
            | ExprKind::Any => &[],
        }
    }

    /// Returns the direct children of this node, mutably.
    pub fn children_mut(&mut self) -> &mut [Expression] {
        match &mut self.kind {
            ExprKind::Choice(items) | ExprKind::Sequence(items) => items,
            ExprKind::Labeled { expression, .. } | ExprKind::Action { expression, .. } => {
                std::slice::from_mut(expression.as_mut())
            }
            ExprKind::Text(e)
            | ExprKind::SimpleAnd(e)
            | ExprKind::SimpleNot(e)
            | ExprKind::Optional(e)
            | ExprKind::ZeroOrMore(e)
            | ExprKind::OneOrMore(e)
            | ExprKind::Group(e) => std::slice::from_mut(e.as_mut()),
            ExprKind::SemanticAnd(_)
            | ExprKind::SemanticNot(_)
            | ExprKind::RuleRef(_)
            | ExprKind::Literal { .. }
            | ExprKind::Class { .. }
            | ExprKind::Any => &mut [],
        }
    }

    /// Returns the single child of a prefixed/suffixed/labeled/action node.
    #[must_use]
    pub fn child(&self) -> Option<&Expression> {
        match &self.kind {
            ExprKind::Choice(_) | ExprKind::Sequence(_) => None,
            _ => self.children().first(),
        }
    }

    /// Returns a short name for the node type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self.kind {
            ExprKind::Choice(_) => "choice",
            ExprKind::Sequence(_) => "sequence",
            ExprKind::Labeled { .. } => "labeled",
            ExprKind::Action { .. } => "action",
            ExprKind::Text(_) => "text",
            ExprKind::SimpleAnd(_) => "simple_and",
            ExprKind::SimpleNot(_) => "simple_not",
            ExprKind::Optional(_) => "optional",
            ExprKind::ZeroOrMore(_) => "zero_or_more",
            ExprKind::OneOrMore(_) => "one_or_more",
            ExprKind::Group(_) => "group",
            ExprKind::SemanticAnd(_) => "semantic_and",
            ExprKind::SemanticNot(_) => "semantic_not",
            ExprKind::RuleRef(_) => "rule_ref",
            ExprKind::Literal { .. } => "literal",
            ExprKind::Class { .. } => "class",
            ExprKind::Any => "any",
        }
    }
}
