//! Grammar compiler and bytecode matcher for Pegmatite.
//!
//! This crate provides:
//! - [`ast`] - The grammar AST the compiler consumes
//! - [`passes`] - Semantic checks, AST transforms, slot allocation, codegen
//! - [`Compiler`] - The pass pipeline, with plugin hooks around each stage
//! - [`Parser`] - A compiled grammar backed by the frame-based [`vm`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod bindings;
pub mod charclass;
pub mod compiler;
pub mod listing;
pub mod opcode;
pub mod options;
pub mod parser;
pub mod passes;
pub mod program;
pub mod visitor;
pub mod vm;


pub use ast::{ExprKind, Expression, Grammar, Rule};
pub use bindings::Bindings;
pub use compiler::{
    CompileOutput, Compiler, NamedPass, PassConfig, PassFn, Plugin, Stage, compile,
    compile_parser,
};
pub use options::{CompileOptions, Optimize, OutputFormat, ParseOptions};
pub use parser::Parser;
pub use program::Program;
pub use vm::{ActionContext, ActionResult, Escape, LogTracer, TraceEvent, TraceEventKind, Tracer};
