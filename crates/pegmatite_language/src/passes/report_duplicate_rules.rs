//! Rejects grammars that define a rule name twice.

use std::collections::HashMap;

use pegmatite_foundation::{Error, ErrorContext, ErrorKind, Result};

use crate::ast::Grammar;
use crate::options::CompileOptions;

/// Fails on the first rule whose name is already defined.
///
/// # Errors
/// Returns [`ErrorKind::DuplicateRule`] naming the repeated rule.
pub fn report_duplicate_rules(grammar: &mut Grammar, _options: &CompileOptions) -> Result<()> {
    let mut seen = HashMap::new();
    for rule in &grammar.rules {
        if let Some(first) = seen.insert(rule.name.as_str(), rule.location) {
            let mut context = ErrorContext::new().with_rule(&rule.name);
            if let Some(location) = rule.location.or(first) {
                context = context.with_location(location);
            }
            return Err(Error::new(ErrorKind::DuplicateRule(rule.name.clone())).with_context(context));
        }
    }
    Ok(())
}
