//! Ordered pass pipeline.
//!
//! A [`Compiler`] holds, for each [`CompilerPhase`], the passes registered
//! for it. Compiling runs the phases in their declared order and the passes
//! of each phase in registration order, threading the program through.

use alloc::{boxed::Box, string::String, vec::Vec};

use crate::{
    error::CompileResult,
    passes::{DeadFunctionRemover, DeclarationConsolidation, FunctionMinifier, VariableMinifier},
    program::ShaderProgram,
};
use glmin_syntax::ShaderStage;

/// Named group of passes. Phases run in the order of [`CompilerPhase::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompilerPhase {
    Optimization,
    Minification,
}

impl CompilerPhase {
    pub const ALL: [CompilerPhase; 2] = [CompilerPhase::Optimization, CompilerPhase::Minification];

    pub fn as_str(self) -> &'static str {
        match self {
            CompilerPhase::Optimization => "optimization",
            CompilerPhase::Minification => "minification",
        }
    }
}

/// A whole-program transformation.
///
/// Running a pass twice must give the same program as running it once.
pub trait Pass {
    fn name(&self) -> &'static str;

    fn run(&self, program: ShaderProgram) -> CompileResult<ShaderProgram>;
}

/// Phase-ordered list of passes.
#[derive(Default)]
pub struct Compiler {
    phases: Vec<(CompilerPhase, Vec<Box<dyn Pass>>)>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default minification pipeline.
    ///
    /// Dead functions are removed before anything is renamed so they never
    /// claim a short name, and declarations are merged before variables are
    /// renamed.
    pub fn minifier() -> Self {
        let mut compiler = Compiler::new();
        compiler
            .register_step(CompilerPhase::Minification, DeadFunctionRemover)
            .register_step(CompilerPhase::Minification, DeclarationConsolidation)
            .register_step(CompilerPhase::Minification, VariableMinifier)
            .register_step(CompilerPhase::Minification, FunctionMinifier);
        compiler
    }

    /// Append `pass` to the passes of `phase`.
    pub fn register_step(&mut self, phase: CompilerPhase, pass: impl Pass + 'static) -> &mut Self {
        match self.phases.iter_mut().find(|(p, _)| *p == phase) {
            Some((_, passes)) => passes.push(Box::new(pass)),
            None => self.phases.push((phase, alloc::vec![Box::new(pass) as Box<dyn Pass>])),
        }
        self
    }

    /// Names of the passes registered for `phase`, in order.
    pub fn passes(&self, phase: CompilerPhase) -> Vec<&'static str> {
        self.phases
            .iter()
            .filter(|(p, _)| *p == phase)
            .flat_map(|(_, passes)| passes.iter().map(|pass| pass.name()))
            .collect()
    }

    pub fn compile_program(&self, mut program: ShaderProgram) -> CompileResult<ShaderProgram> {
        for phase in CompilerPhase::ALL {
            for (_, passes) in self.phases.iter().filter(|(p, _)| *p == phase) {
                for pass in passes {
                    log::debug!("running {} pass {}", phase.as_str(), pass.name());
                    program = pass.run(program)?;
                }
            }
        }
        Ok(program)
    }
}

/// Minified source of both stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifiedProgram {
    pub vertex: String,
    pub fragment: String,
}

/// Parse both stages, run [`Compiler::minifier`] and emit the result.
pub fn minify(vertex_source: &str, fragment_source: &str) -> CompileResult<MinifiedProgram> {
    let program = ShaderProgram::parse(vertex_source, fragment_source)?;
    let program = Compiler::minifier().compile_program(program)?;
    Ok(MinifiedProgram {
        vertex: program.emit(ShaderStage::Vertex)?,
        fragment: program.emit(ShaderStage::Fragment)?,
    })
}
