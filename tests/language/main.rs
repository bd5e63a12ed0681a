//! Integration tests for Layer 1: Language
//!
//! Tests for the compiler pipeline, the matcher, and host code bindings.

mod compile;
mod matching;
