//! Minifying compiler for linked GLSL ES shader programs.
//!
//! A [`ShaderProgram`] pairs a vertex and a fragment shader. A [`Compiler`]
//! runs an ordered list of [`Pass`]es over it, grouped by
//! [`CompilerPhase`]. [`Compiler::minifier`] is the default pipeline:
//!
//! 1. [`DeadFunctionRemover`]
//! 2. [`DeclarationConsolidation`]
//! 3. [`VariableMinifier`]
//! 4. [`FunctionMinifier`]
//!
//! ```
//! let out = glmin_compiler::minify(
//!     "uniform float scale;void main(){gl_Position=vec4(scale);}",
//!     "precision mediump float;uniform float scale;void main(){gl_FragColor=vec4(scale);}",
//! )
//! .unwrap();
//! assert_eq!(out.vertex, "uniform float a;void main(){gl_Position=vec4(a);}");
//! ```

#![no_std]

extern crate alloc;

pub mod analysis;
mod error;
mod names;
pub mod passes;
mod pipeline;
mod program;

pub use error::{CompileError, CompileResult};
pub use names::NameGenerator;
pub use passes::{
    DeadFunctionRemover, DeclarationConsolidation, FunctionMinifier, RenameEntry, RenamePlan,
    VariableMinifier,
};
pub use pipeline::{minify, Compiler, CompilerPhase, MinifiedProgram, Pass};
pub use program::ShaderProgram;
