//! The minification passes.
//!
//! [`Compiler::minifier`](crate::Compiler::minifier) runs them in the order
//! they are listed here.

mod consolidation;
mod dead_functions;
mod function_minifier;
mod variable_minifier;

pub use consolidation::DeclarationConsolidation;
pub use dead_functions::DeadFunctionRemover;
pub use function_minifier::FunctionMinifier;
pub use variable_minifier::{RenameEntry, RenamePlan, VariableMinifier};
