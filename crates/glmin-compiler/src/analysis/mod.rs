//! Whole-program facts shared by the passes.

mod bindings;
mod call_graph;
mod directives;

pub use bindings::{rename_stage, Binding, BindingId, BindingTable, ScopeClass, StageBindings};
pub use call_graph::{CallGraph, FunctionKey};
pub use directives::directive_words;
