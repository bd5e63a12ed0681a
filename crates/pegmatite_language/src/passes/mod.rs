//! Compiler passes.
//!
//! Every pass has the same shape, `fn(&mut Grammar, &CompileOptions) ->
//! Result<()>`, so the pipeline can hold them in plain lists that plugins
//! may reorder or extend.
//!
//! - check: reject grammars that cannot compile or would not terminate
//! - transform: rewrite the AST (proxy removal, failure annotations)
//! - generate: allocate frame slots, then emit bytecode

pub mod allocate;
mod consumption;
mod generate;
mod remove_proxy_rules;
mod report_duplicate_labels;
mod report_duplicate_rules;
mod report_failures;
mod report_infinite_repetition;
mod report_invalid_start_rules;
mod report_left_recursion;
mod report_missing_rules;

pub use allocate::{Scopes, SlotPool, allocate_slots};
pub use consumption::always_consumes_on_success;
pub use generate::generate_bytecode;
pub use remove_proxy_rules::remove_proxy_rules;
pub use report_duplicate_labels::report_duplicate_labels;
pub use report_duplicate_rules::report_duplicate_rules;
pub use report_failures::report_failures;
pub use report_infinite_repetition::report_infinite_repetition;
pub use report_invalid_start_rules::report_invalid_start_rules;
pub use report_left_recursion::report_left_recursion;
pub use report_missing_rules::report_missing_rules;
