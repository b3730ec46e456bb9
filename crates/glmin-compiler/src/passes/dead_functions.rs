//! Removal of functions unreachable from `main`.

use alloc::{collections::BTreeSet, format, vec::Vec};

use glmin_syntax::{ast::ExternalDeclaration, keywords, ShaderStage};

use crate::{
    analysis::{directive_words, CallGraph, FunctionKey},
    error::{CompileError, CompileResult},
    pipeline::Pass,
    program::ShaderProgram,
};

/// Removes functions that `main` can never call.
///
/// Reachability is computed once per stage, before anything is removed, so
/// a function called only from dead functions goes too. Prototypes follow
/// their function. Every conditional branch counts as live, and a function
/// named in directive text is kept since a macro may call it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadFunctionRemover;

impl Pass for DeadFunctionRemover {
    fn name(&self) -> &'static str {
        "DeadFunctionRemover"
    }

    fn run(&self, mut program: ShaderProgram) -> CompileResult<ShaderProgram> {
        for stage in ShaderStage::ALL {
            let unit = program.stage_mut(stage)?;
            let mut graph = CallGraph::build(unit);
            if !graph.has_main() {
                return Err(CompileError::structural(format!(
                    "{} shader has no main function",
                    stage
                )));
            }

            graph.pin_names(&directive_words(unit));
            let live = graph.reachable();
            let removed = retain_live(&mut unit.items, &live);
            for key in &removed {
                log::debug!("{} shader: removed dead function {}", stage, key);
            }
        }
        Ok(program)
    }
}

/// Drop unreachable functions and prototypes from `items` and any
/// conditional inside it, returning what was dropped.
fn retain_live(
    items: &mut Vec<ExternalDeclaration>,
    live: &BTreeSet<FunctionKey>,
) -> BTreeSet<FunctionKey> {
    let mut removed = BTreeSet::new();
    items.retain_mut(|item| {
        let proto = match item {
            ExternalDeclaration::FunctionDefinition(def) => &def.prototype,
            ExternalDeclaration::FunctionPrototype(proto) => &*proto,
            ExternalDeclaration::Conditional(cond) => {
                for branch in cond.branches_mut() {
                    removed.append(&mut retain_live(branch, live));
                }
                return true;
            }
            _ => return true,
        };

        let key = FunctionKey::of(proto);
        if live.contains(&key) || keywords::is_builtin_function(&key.name) {
            return true;
        }
        removed.insert(key);
        false
    });
    removed
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    fn run(vertex: &str) -> CompileResult<ShaderProgram> {
        let program = ShaderProgram::parse(vertex, "void main(){}").unwrap();
        DeadFunctionRemover.run(program)
    }

    fn vertex(program: &ShaderProgram) -> alloc::string::String {
        program.stage(ShaderStage::Vertex).unwrap().to_string()
    }

    #[test]
    fn test_removes_transitively_dead() {
        let program = run(
            "float leaf(){return 1.;}float dead();float dead(){return leaf();}\
             float used(){return 2.;}void main(){used();}",
        )
        .unwrap();
        assert_eq!(vertex(&program), "float used(){return 2.;}void main(){used();}");
    }

    #[test]
    fn test_removes_unused_overload() {
        let program =
            run("float f(float x){return x;}float f(){return 1.;}void main(){f(1.);}").unwrap();
        assert_eq!(vertex(&program), "float f(float x){return x;}void main(){f(1.);}");
    }

    #[test]
    fn test_keeps_called_prototype() {
        let program = run("float f();void main(){f();}float f(){return 1.;}").unwrap();
        assert_eq!(vertex(&program), "float f();void main(){f();}float f(){return 1.;}");
    }

    #[test]
    fn test_looks_inside_conditionals() {
        let program = run(
            "#ifdef A\nfloat a(){return 1.;}\nfloat b(){return 2.;}\n#endif\nvoid main(){a();}",
        )
        .unwrap();
        assert_eq!(
            vertex(&program),
            "#ifdef A\nfloat a(){return 1.;}\n#endif\nvoid main(){a();}"
        );
    }

    #[test]
    fn test_keeps_functions_called_from_macros() {
        let program = run(
            "#define CALL helper()\nfloat leaf(){return 1.;}float helper(){return leaf();}\
             float dead(){return 2.;}void main(){gl_Position=vec4(CALL);}",
        )
        .unwrap();
        assert_eq!(
            vertex(&program),
            "#define CALL helper()\nfloat leaf(){return 1.;}float helper(){return leaf();}\
             void main(){gl_Position=vec4(CALL);}"
        );
    }

    #[test]
    fn test_missing_main_is_structural_error() {
        let err = run("float f(){return 1.;}").unwrap_err();
        assert!(matches!(err, CompileError::StructuralInvariant(_)));
    }

    #[test]
    fn test_idempotent() {
        let once = run("void g(){}void h(){g();}void main(){}").unwrap();
        let twice = DeadFunctionRemover.run(once.clone()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(vertex(&once), "void main(){}");
    }
}
