//! Checks that the start rule and every allowed start rule exist.

use pegmatite_foundation::{Error, ErrorKind, Result};

use crate::ast::Grammar;
use crate::options::CompileOptions;

/// Fails if the grammar's start rule or an `allowed_start_rules` entry names
/// no rule. `"*"` is accepted as "every rule".
///
/// # Errors
/// Returns [`ErrorKind::UnknownStartRule`].
pub fn report_invalid_start_rules(grammar: &mut Grammar, options: &CompileOptions) -> Result<()> {
    let names = std::iter::once(&grammar.start_rule)
        .chain(options.allowed_start_rules.iter().filter(|r| r.as_str() != "*"));
    for name in names {
        if grammar.rule(name).is_none() {
            return Err(Error::new(ErrorKind::UnknownStartRule(name.clone())));
        }
    }
    Ok(())
}
