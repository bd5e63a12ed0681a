//! The compilation pipeline.
//!
//! A grammar goes through three stages of passes: `check` rejects grammars
//! that cannot compile, `transform` rewrites the AST, and `generate` allocates
//! frame slots and emits the [`Program`]. The pass lists are plain data in a
//! [`PassConfig`] so plugins can reorder, remove, or add passes, and can
//! inspect or replace the AST around each stage.
//!
//! Compilation is fail-fast: the first pass that returns an error stops the
//! pipeline, and the error is tagged with that pass's name.

use std::fmt;

use pegmatite_foundation::{Error, Result};
use tracing::{debug, trace};

use crate::ast::Grammar;
use crate::listing;
use crate::options::{CompileOptions, OutputFormat};
use crate::parser::Parser;
use crate::passes;
use crate::program::Program;

/// Signature shared by every pass.
pub type PassFn = fn(&mut Grammar, &CompileOptions) -> Result<()>;

/// A pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Semantic checks.
    Check,
    /// AST rewrites.
    Transform,
    /// Slot allocation and bytecode generation.
    Generate,
}

impl Stage {
    /// All stages, in execution order.
    pub const ALL: [Self; 3] = [Self::Check, Self::Transform, Self::Generate];

    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Transform => "transform",
            Self::Generate => "generate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pass and the name its errors are tagged with.
#[derive(Clone, Copy, Debug)]
pub struct NamedPass {
    /// Pass name.
    pub name: &'static str,
    /// The pass.
    pub run: PassFn,
}

impl NamedPass {
    /// Creates a named pass.
    #[must_use]
    pub const fn new(name: &'static str, run: PassFn) -> Self {
        Self { name, run }
    }
}

/// Ordered pass lists for each stage.
#[derive(Clone, Debug)]
pub struct PassConfig {
    /// Check stage.
    pub check: Vec<NamedPass>,
    /// Transform stage.
    pub transform: Vec<NamedPass>,
    /// Generate stage.
    pub generate: Vec<NamedPass>,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            check: vec![
                NamedPass::new("report_duplicate_rules", passes::report_duplicate_rules),
                NamedPass::new("report_missing_rules", passes::report_missing_rules),
                NamedPass::new("report_duplicate_labels", passes::report_duplicate_labels),
                NamedPass::new("report_left_recursion", passes::report_left_recursion),
                NamedPass::new("report_infinite_repetition", passes::report_infinite_repetition),
                NamedPass::new("report_invalid_start_rules", passes::report_invalid_start_rules),
            ],
            transform: vec![
                NamedPass::new("remove_proxy_rules", passes::remove_proxy_rules),
                NamedPass::new("report_failures", passes::report_failures),
            ],
            generate: vec![
                NamedPass::new("allocate_slots", passes::allocate_slots),
                NamedPass::new("generate_bytecode", passes::generate_bytecode),
            ],
        }
    }
}

impl PassConfig {
    /// Passes of one stage.
    #[must_use]
    pub fn stage(&self, stage: Stage) -> &[NamedPass] {
        match stage {
            Stage::Check => &self.check,
            Stage::Transform => &self.transform,
            Stage::Generate => &self.generate,
        }
    }

    /// Mutable passes of one stage.
    pub fn stage_mut(&mut self, stage: Stage) -> &mut Vec<NamedPass> {
        match stage {
            Stage::Check => &mut self.check,
            Stage::Transform => &mut self.transform,
            Stage::Generate => &mut self.generate,
        }
    }

    /// Pass names of one stage, in order.
    #[must_use]
    pub fn names(&self, stage: Stage) -> Vec<&'static str> {
        self.stage(stage).iter().map(|p| p.name).collect()
    }
}

/// Extension point around the pipeline.
///
/// Every hook defaults to doing nothing.
pub trait Plugin {
    /// Adjusts the pass lists and options before compilation starts.
    fn configure(&self, _passes: &mut PassConfig, _options: &mut CompileOptions) {}

    /// Runs before a stage; may inspect or replace the AST.
    ///
    /// # Errors
    /// An error aborts compilation.
    fn before_stage(&self, _stage: Stage, _grammar: &mut Grammar) -> Result<()> {
        Ok(())
    }

    /// Runs after a stage; may inspect or replace the AST.
    ///
    /// # Errors
    /// An error aborts compilation.
    fn after_stage(&self, _stage: Stage, _grammar: &mut Grammar) -> Result<()> {
        Ok(())
    }
}

/// What compilation produces.
#[derive(Debug)]
pub enum CompileOutput {
    /// A parser ready to use.
    Parser(Parser),
    /// A readable listing of the program.
    Source(String),
}

impl CompileOutput {
    /// Returns the parser, if that was the requested output.
    #[must_use]
    pub fn into_parser(self) -> Option<Parser> {
        match self {
            Self::Parser(parser) => Some(parser),
            Self::Source(_) => None,
        }
    }

    /// Returns the listing, if that was the requested output.
    #[must_use]
    pub fn into_source(self) -> Option<String> {
        match self {
            Self::Source(source) => Some(source),
            Self::Parser(_) => None,
        }
    }
}

/// Runs the pass pipeline.
pub struct Compiler {
    passes: PassConfig,
    plugins: Vec<Box<dyn Plugin>>,
    options: CompileOptions,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("passes", &self.passes)
            .field("plugins", &self.plugins.len())
            .field("options", &self.options)
            .finish()
    }
}

impl Compiler {
    /// Creates a compiler with the standard passes.
    #[must_use]
    pub fn new(options: CompileOptions) -> Self {
        Self {
            passes: PassConfig::default(),
            plugins: Vec::new(),
            options,
        }
    }

    /// Adds a plugin. Plugins run in the order they were added.
    #[must_use]
    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// The pass lists.
    #[must_use]
    pub fn passes(&self) -> &PassConfig {
        &self.passes
    }

    /// Mutable pass lists.
    pub fn passes_mut(&mut self) -> &mut PassConfig {
        &mut self.passes
    }

    /// The compile options.
    #[must_use]
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compiles a grammar.
    ///
    /// # Errors
    /// Returns the first error raised by a pass or plugin.
    pub fn compile(&self, grammar: Grammar) -> Result<CompileOutput> {
        let mut passes = self.passes.clone();
        let mut options = self.options.clone();
        for plugin in &self.plugins {
            plugin.configure(&mut passes, &mut options);
        }

        let program = self.run_stages(grammar, &passes, &options)?;
        match options.output {
            OutputFormat::Parser => Ok(CompileOutput::Parser(Parser::new(program))),
            OutputFormat::Source => Ok(CompileOutput::Source(listing::render(&program))),
        }
    }

    fn run_stages(
        &self,
        mut grammar: Grammar,
        passes: &PassConfig,
        options: &CompileOptions,
    ) -> Result<Program> {
        debug!(
            rules = grammar.rules.len(),
            start_rule = %grammar.start_rule,
            "compiling grammar"
        );

        for stage in Stage::ALL {
            for plugin in &self.plugins {
                plugin.before_stage(stage, &mut grammar)?;
            }
            let stage_passes = passes.stage(stage);
            debug!(stage = stage.name(), passes = stage_passes.len(), "running stage");
            for pass in stage_passes {
                trace!(stage = stage.name(), pass = pass.name, "running pass");
                (pass.run)(&mut grammar, options).map_err(|e| e.in_pass(pass.name))?;
            }
            for plugin in &self.plugins {
                plugin.after_stage(stage, &mut grammar)?;
            }
        }

        grammar
            .program
            .take()
            .ok_or_else(|| Error::internal("generate stage produced no program"))
    }
}

/// Compiles a grammar with the standard passes.
///
/// # Errors
/// Returns the first compile error.
pub fn compile(grammar: Grammar, options: CompileOptions) -> Result<CompileOutput> {
    Compiler::new(options).compile(grammar)
}

/// Compiles a grammar to a [`Parser`], whatever output the options request.
///
/// # Errors
/// Returns the first compile error.
pub fn compile_parser(grammar: Grammar, options: CompileOptions) -> Result<Parser> {
    let options = options.with_output(OutputFormat::Parser);
    match compile(grammar, options)? {
        CompileOutput::Parser(parser) => Ok(parser),
        CompileOutput::Source(_) => Err(Error::internal("expected parser output")),
    }
}
