//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Location, Expectation, and Error.

mod locations;
mod messages;
mod values;
