//! Cross-layer integration tests for Pegmatite
//!
//! Tests whole grammars through the umbrella crate.

mod json;
mod properties;
