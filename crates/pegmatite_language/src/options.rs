//! Compile-time and parse-time options.

use std::fmt;

use pegmatite_foundation::Value;

use crate::bindings::Bindings;
use crate::vm::Tracer;

/// Code generation strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Optimize {
    /// Specialized instructions for short literals and bitmap class tests.
    #[default]
    Speed,
    /// Generic instructions only.
    Size,
}

/// What compilation produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// An in-memory [`Parser`](crate::Parser).
    #[default]
    Parser,
    /// A readable listing of the compiled program.
    Source,
}

/// Options controlling grammar compilation.
#[derive(Clone, Debug, Default)]
pub struct CompileOptions {
    /// Memoize rule results by (rule, position).
    pub cache: bool,
    /// Code generation strategy.
    pub optimize: Optimize,
    /// Emit rule enter/match/fail events to a tracer.
    pub trace: bool,
    /// Rules a parse may start from. Empty means only the grammar's start
    /// rule; `"*"` allows every rule.
    pub allowed_start_rules: Vec<String>,
    /// Output selection.
    pub output: OutputFormat,
    /// Host closures for action, predicate, and initializer code.
    pub bindings: Bindings,
}

impl CompileOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables memoization.
    #[must_use]
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the code generation strategy.
    #[must_use]
    pub fn with_optimize(mut self, optimize: Optimize) -> Self {
        self.optimize = optimize;
        self
    }

    /// Enables or disables rule tracing.
    #[must_use]
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Sets the allowed start rules.
    #[must_use]
    pub fn with_allowed_start_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_start_rules = rules.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    /// Sets the code bindings.
    #[must_use]
    pub fn with_bindings(mut self, bindings: Bindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Returns true if every rule may start a parse.
    #[must_use]
    pub fn allows_all_start_rules(&self) -> bool {
        self.allowed_start_rules.iter().any(|r| r == "*")
    }
}

/// Options for a single parse.
#[derive(Default)]
pub struct ParseOptions<'t> {
    /// Rule to start from instead of the default start rule.
    pub start_rule: Option<String>,
    /// Receives rule events when the grammar was compiled with tracing.
    pub tracer: Option<&'t mut dyn Tracer>,
    /// Pass-through value visible to action, predicate, and initializer code.
    pub options: Value,
}

impl<'t> ParseOptions<'t> {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the start rule.
    #[must_use]
    pub fn start_rule(mut self, name: impl Into<String>) -> Self {
        self.start_rule = Some(name.into());
        self
    }

    /// Sets the tracer.
    #[must_use]
    pub fn tracer(mut self, tracer: &'t mut dyn Tracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Sets the pass-through options value.
    #[must_use]
    pub fn options(mut self, options: impl Into<Value>) -> Self {
        self.options = options.into();
        self
    }
}

impl fmt::Debug for ParseOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("start_rule", &self.start_rule)
            .field("tracer", &self.tracer.is_some())
            .field("options", &self.options)
            .finish()
    }
}
