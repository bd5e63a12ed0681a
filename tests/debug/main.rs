//! Integration tests for Layer 2: Debug
//!
//! Tests recording tracers against real traced parses.

mod recording;
