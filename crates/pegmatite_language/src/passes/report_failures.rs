//! Annotates named rules with the expectation they report on failure.

use pegmatite_foundation::{Expectation, Result};

use crate::ast::Grammar;
use crate::options::CompileOptions;

/// Sets [`crate::ast::Rule::failure`] on every rule with a display name.
///
/// # Errors
/// Never fails; the signature matches the other passes.
pub fn report_failures(grammar: &mut Grammar, _options: &CompileOptions) -> Result<()> {
    for rule in &mut grammar.rules {
        rule.failure = rule.display_name.as_ref().map(Expectation::other);
    }
    Ok(())
}
