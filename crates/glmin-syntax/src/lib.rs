//! GLSL ES shader syntax.
//!
//! This crate parses OpenGL ES Shading Language 1.00 source into a typed
//! tree, walks and rewrites that tree, and prints it back in a canonical
//! minimal form. Printing and parsing are inverses:
//! `parse(emit(t), rule) == t` for every tree the parser produces under
//! `rule`.

#![no_std]

extern crate alloc;

pub mod ast;
mod generator;
pub mod keywords;
mod parser;
pub mod visit;

pub use ast::{Ast, ShaderStage, TranslationUnit};
pub use generator::{emit, emit_expr, emit_statement, emit_translation_unit, Generator};
pub use parser::{
    parse, parse_expression, parse_statement, parse_translation_unit, StartRule, SyntaxError,
};
pub use visit::{ScopeKind, VisitorMut};
