//! Removes proxy rules (rules whose body is exactly a reference to another
//! rule) and redirects everything that named them.

use pegmatite_foundation::Result;
use tracing::trace;

use crate::ast::{ExprKind, Grammar};
use crate::options::CompileOptions;
use crate::visitor::{RuleRefRenamer, walk_grammar_mut};

/// Rewrites references to each proxy to name its target, then drops the proxy.
///
/// Proxies are processed in declaration order in a single pass. Each removal
/// rewrites every remaining reference, including those in proxies not yet
/// processed, so chains collapse to their final target. Removed names stay
/// resolvable through [`Grammar::aliases`]. Rules with a display name are
/// never proxies.
///
/// # Errors
/// Never fails; the signature matches the other passes.
pub fn remove_proxy_rules(grammar: &mut Grammar, _options: &CompileOptions) -> Result<()> {
    let mut i = 0;
    while i < grammar.rules.len() {
        let rule = &grammar.rules[i];
        let target = match &rule.expression.kind {
            ExprKind::RuleRef(target) if rule.is_proxy() && *target != rule.name => target.clone(),
            _ => {
                i += 1;
                continue;
            }
        };
        let proxy = grammar.rules.remove(i).name;
        trace!(proxy = %proxy, target = %target, "removing proxy rule");

        walk_grammar_mut(
            &mut RuleRefRenamer {
                from: &proxy,
                to: &target,
            },
            grammar,
        );
        if grammar.start_rule == proxy {
            grammar.start_rule.clone_from(&target);
        }
        for resolved in grammar.aliases.values_mut() {
            if *resolved == proxy {
                resolved.clone_from(&target);
            }
        }
        grammar.aliases.insert(proxy, target);
    }
    Ok(())
}
