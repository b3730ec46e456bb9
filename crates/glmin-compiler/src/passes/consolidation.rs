//! Merging of adjacent declarations that share a type.

use alloc::vec::Vec;

use glmin_syntax::{
    ast::{Declaration, ExternalDeclaration, Statement, TypeSpecifier},
    ShaderStage,
};

use crate::{error::CompileResult, pipeline::Pass, program::ShaderProgram};

/// Merges runs of adjacent declarations that share a type.
///
/// `float a;float b=1.;` becomes `float a,b=1.;`. Only declarations that
/// directly follow each other in the same list are merged, at top level,
/// inside conditional branches and inside any block. Struct declarations
/// are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarationConsolidation;

impl Pass for DeclarationConsolidation {
    fn name(&self) -> &'static str {
        "DeclarationConsolidation"
    }

    fn run(&self, mut program: ShaderProgram) -> CompileResult<ShaderProgram> {
        for stage in ShaderStage::ALL {
            let unit = program.stage_mut(stage)?;
            let merged = consolidate_items(&mut unit.items);
            log::debug!("{} shader: merged {} declarations", stage, merged);
        }
        Ok(program)
    }
}

fn consolidate_items(items: &mut Vec<ExternalDeclaration>) -> usize {
    let mut merged = 0;
    for item in items.iter_mut() {
        match item {
            ExternalDeclaration::Conditional(cond) => {
                for branch in cond.branches_mut() {
                    merged += consolidate_items(branch);
                }
            }
            ExternalDeclaration::FunctionDefinition(def) => {
                merged += consolidate_block(&mut def.body);
            }
            _ => {}
        }
    }
    merged + merge_adjacent(items, external_declaration)
}

fn consolidate_block(stmts: &mut Vec<Statement>) -> usize {
    let nested: usize = stmts.iter_mut().map(consolidate_nested).sum();
    nested + merge_adjacent(stmts, statement_declaration)
}

fn consolidate_nested(stmt: &mut Statement) -> usize {
    match stmt {
        Statement::Compound(body) => consolidate_block(body),
        Statement::If { then, otherwise, .. } => {
            consolidate_nested(then)
                + otherwise.as_mut().map_or(0, |otherwise| consolidate_nested(otherwise))
        }
        Statement::While { body, .. }
        | Statement::DoWhile { body, .. }
        | Statement::For { body, .. } => consolidate_nested(body),
        Statement::Declaration(_)
        | Statement::Expression(_)
        | Statement::Continue
        | Statement::Break
        | Statement::Return(_)
        | Statement::Discard => 0,
    }
}

fn external_declaration(item: &mut ExternalDeclaration) -> Option<&mut Declaration> {
    match item {
        ExternalDeclaration::Declaration(decl) => Some(decl),
        _ => None,
    }
}

fn statement_declaration(stmt: &mut Statement) -> Option<&mut Declaration> {
    match stmt {
        Statement::Declaration(decl) => Some(decl),
        _ => None,
    }
}

/// Fold every declaration into the one before it when both declare
/// variables of the same type. Returns the number of folded declarations.
fn merge_adjacent<T>(
    items: &mut Vec<T>,
    declaration: fn(&mut T) -> Option<&mut Declaration>,
) -> usize {
    let mut merged = 0;
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for mut item in items.drain(..) {
        let prev = out.last_mut().and_then(declaration);
        if let (Some(prev), Some(next)) = (prev, declaration(&mut item)) {
            if can_merge(prev, next) {
                prev.declarators.append(&mut next.declarators);
                merged += 1;
                continue;
            }
        }
        out.push(item);
    }
    *items = out;
    merged
}

fn can_merge(prev: &Declaration, next: &Declaration) -> bool {
    matches!(prev.ty.specifier, TypeSpecifier::Named(_))
        && prev.ty == next.ty
        && !prev.declarators.is_empty()
        && !next.declarators.is_empty()
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};

    use super::*;

    fn consolidate(vertex: &str) -> String {
        let program = ShaderProgram::parse(vertex, "void main(){}").unwrap();
        let program = DeclarationConsolidation.run(program).unwrap();
        program.stage(ShaderStage::Vertex).unwrap().to_string()
    }

    #[test]
    fn test_merges_same_type_preserving_order() {
        assert_eq!(
            consolidate("uniform float a;uniform float b[2],c;uniform float d;"),
            "uniform float a,b[2],c,d;"
        );
        assert_eq!(
            consolidate("void main(){float a=1.;float b=a;float c;a=b;}"),
            "void main(){float a=1.,b=a,c;a=b;}"
        );
    }

    #[test]
    fn test_never_merges_different_types() {
        assert_eq!(
            consolidate("uniform float a;varying float b;float c;highp float d;"),
            "uniform float a;varying float b;float c;highp float d;"
        );
    }

    #[test]
    fn test_never_merges_across_statements() {
        assert_eq!(
            consolidate("void main(){float a;a=1.;float b;}"),
            "void main(){float a;a=1.;float b;}"
        );
    }

    #[test]
    fn test_merges_in_nested_blocks_and_branches() {
        assert_eq!(
            consolidate("void main(){if(true){int i;int j;}else{int k;int l;}}"),
            "void main(){if(true){int i,j;}else{int k,l;}}"
        );
        assert_eq!(
            consolidate("#ifdef A\nfloat a;float b;\n#endif\nvoid main(){}"),
            "#ifdef A\nfloat a,b;\n#endif\nvoid main(){}"
        );
    }

    #[test]
    fn test_leaves_structs_alone() {
        assert_eq!(
            consolidate("struct S{float x;}s;S u;S v;void main(){}"),
            "struct S{float x;}s;S u,v;void main(){}"
        );
    }
}
