//! The linked vertex and fragment shader pair carried through the pipeline.

use alloc::{format, string::String};

use glmin_syntax::{emit_translation_unit, parse_translation_unit, ShaderStage, TranslationUnit};

use crate::error::{CompileError, CompileResult};

/// A vertex shader and a fragment shader compiled together.
///
/// Passes reason about both trees at once: names on the link boundary must
/// stay identical across them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderProgram {
    pub vertex_ast: Option<TranslationUnit>,
    pub fragment_ast: Option<TranslationUnit>,
}

impl ShaderProgram {
    pub fn new(vertex_ast: TranslationUnit, fragment_ast: TranslationUnit) -> Self {
        Self {
            vertex_ast: Some(vertex_ast),
            fragment_ast: Some(fragment_ast),
        }
    }

    /// Parse both stages.
    pub fn parse(vertex_source: &str, fragment_source: &str) -> CompileResult<Self> {
        let vertex_ast = parse_translation_unit(vertex_source, ShaderStage::Vertex)?;
        let fragment_ast = parse_translation_unit(fragment_source, ShaderStage::Fragment)?;
        Ok(Self::new(vertex_ast, fragment_ast))
    }

    pub fn stage(&self, stage: ShaderStage) -> CompileResult<&TranslationUnit> {
        let ast = match stage {
            ShaderStage::Vertex => &self.vertex_ast,
            ShaderStage::Fragment => &self.fragment_ast,
        };
        ast.as_ref().ok_or_else(|| missing_stage(stage))
    }

    pub fn stage_mut(&mut self, stage: ShaderStage) -> CompileResult<&mut TranslationUnit> {
        let ast = match stage {
            ShaderStage::Vertex => &mut self.vertex_ast,
            ShaderStage::Fragment => &mut self.fragment_ast,
        };
        ast.as_mut().ok_or_else(|| missing_stage(stage))
    }

    /// Canonical source of one stage.
    pub fn emit(&self, stage: ShaderStage) -> CompileResult<String> {
        Ok(emit_translation_unit(self.stage(stage)?))
    }
}

fn missing_stage(stage: ShaderStage) -> CompileError {
    CompileError::structural(format!("shader program has no {} shader", stage))
}
