//! Pegmatite - PEG compiler and packrat bytecode matcher
//!
//! This crate re-exports all layers of the Pegmatite system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: pegmatite_debug      - Recording tracers, trace buffer, formatters
//! Layer 1: pegmatite_language   - AST, passes, codegen, bytecode VM, Parser
//! Layer 0: pegmatite_foundation - Core types (Value, Location, Expectation, Error)
//! ```

pub use pegmatite_debug as debug;
pub use pegmatite_foundation as foundation;
pub use pegmatite_language as language;

pub use pegmatite_foundation::{Error, Expectation, Location, Position, Result, SyntaxError, Value};
pub use pegmatite_language::{
    Bindings, CompileOptions, Compiler, Expression, Grammar, ParseOptions, Parser, Rule, compile,
    compile_parser,
};
