//! The compiled parser.

use std::sync::Arc;

use pegmatite_foundation::{Error, ErrorKind, Result, Value};
use tracing::debug;

use crate::listing;
use crate::options::ParseOptions;
use crate::program::Program;
use crate::vm;

/// A compiled grammar, ready to parse.
///
/// Cloning is cheap and clones share the program. Each parse runs in its own
/// session, so one parser can serve many threads.
#[derive(Clone, Debug)]
pub struct Parser {
    program: Arc<Program>,
}

impl Parser {
    /// Wraps a program.
    #[must_use]
    pub fn new(program: Program) -> Self {
        Self {
            program: Arc::new(program),
        }
    }

    /// The compiled program.
    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Renders the program as a readable listing.
    #[must_use]
    pub fn listing(&self) -> String {
        listing::render(&self.program)
    }

    /// Parses `input` from the default start rule.
    ///
    /// # Errors
    /// Returns a syntax error if the input does not match.
    pub fn parse(&self, input: &str) -> Result<Value> {
        self.parse_with(input, ParseOptions::default())
    }

    /// Parses `input` with per-parse options.
    ///
    /// # Errors
    /// Returns [`ErrorKind::StartRuleNotAllowed`] for a start rule outside the
    /// allowed set, and a syntax error if the input does not match.
    pub fn parse_with(&self, input: &str, options: ParseOptions<'_>) -> Result<Value> {
        let start_rule = options
            .start_rule
            .clone()
            .unwrap_or_else(|| self.program.start_rule.clone());
        let start = self
            .program
            .rule_id(&start_rule)
            .filter(|_| self.program.is_allowed_start_rule(&start_rule))
            .ok_or_else(|| Error::new(ErrorKind::StartRuleNotAllowed(start_rule.clone())))?;

        let result = vm::execute(&self.program, input, start, options);
        debug!(
            input_len = input.len(),
            start_rule = %start_rule,
            ok = result.is_ok(),
            "parsed input"
        );
        result
    }
}
