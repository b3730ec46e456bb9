//! Short names for user-defined functions.

use alloc::{
    collections::{BTreeMap, BTreeSet},
    string::String,
    vec::Vec,
};

use glmin_syntax::{
    ast::{DeclScope, FullySpecifiedType},
    keywords,
    visit::VisitorMut,
    ShaderStage, TranslationUnit,
};

use crate::{
    analysis::directive_words, error::CompileResult, names::NameGenerator, pipeline::Pass,
    program::ShaderProgram,
};

/// Gives user-defined functions the shortest names free in their stage.
///
/// All overloads of a function keep sharing one name. `main`, functions
/// named like built-ins and functions named in a preprocessor directive keep
/// their names. Each stage is renamed on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionMinifier;

impl Pass for FunctionMinifier {
    fn name(&self) -> &'static str {
        "FunctionMinifier"
    }

    fn run(&self, mut program: ShaderProgram) -> CompileResult<ShaderProgram> {
        for stage in ShaderStage::ALL {
            let unit = program.stage_mut(stage)?;
            let renames = plan_stage(unit);
            for (old, new) in &renames {
                log::trace!("{} shader: function {} -> {}", stage, old, new);
            }
            Renamer { renames: &renames }.visit_translation_unit(unit);
        }
        Ok(program)
    }
}

fn plan_stage(unit: &mut TranslationUnit) -> BTreeMap<String, String> {
    let mut survey = Survey::default();
    survey.visit_translation_unit(unit);
    let pinned = directive_words(unit);

    for callee in core::mem::take(&mut survey.callees) {
        match survey.weights.get_mut(&callee) {
            Some(weight) => *weight += 1,
            None => {
                survey.reserved.insert(callee);
            }
        }
    }

    let mut functions = Vec::new();
    for (first_seen, name) in survey.order.iter().enumerate() {
        if name == "main" || keywords::is_builtin_function(name) || pinned.contains(name) {
            survey.reserved.insert(name.clone());
        } else {
            let weight = survey.weights.get(name).copied().unwrap_or(0);
            functions.push((weight, first_seen, name));
        }
    }
    functions.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut taken = survey.reserved;
    taken.extend(pinned);
    let mut renames = BTreeMap::new();
    for (_, _, name) in functions {
        let new_name = NameGenerator::first_free(|candidate| taken.contains(candidate));
        taken.insert(new_name.clone());
        renames.insert(name.clone(), new_name);
    }
    renames
}

/// Function names and every other identifier of a stage.
#[derive(Default)]
struct Survey {
    /// User function names in order of first declaration.
    order: Vec<String>,
    /// Declarations plus calls of each user function.
    weights: BTreeMap<String, usize>,
    callees: Vec<String>,
    /// Identifiers a function must not be renamed to.
    reserved: BTreeSet<String>,
}

impl VisitorMut for Survey {
    fn visit_function_name(&mut self, name: &mut String, _arity: usize) {
        if !self.weights.contains_key(name.as_str()) {
            self.order.push(name.clone());
        }
        *self.weights.entry(name.clone()).or_default() += 1;
    }

    fn visit_callee(&mut self, name: &mut String, _arity: usize) {
        self.callees.push(name.clone());
    }

    fn visit_declared_name(&mut self, _ty: &FullySpecifiedType, name: &mut String, _: DeclScope) {
        self.reserved.insert(name.clone());
    }

    fn visit_parameter_name(&mut self, name: &mut String) {
        self.reserved.insert(name.clone());
    }

    fn visit_variable_name(&mut self, name: &mut String) {
        self.reserved.insert(name.clone());
    }

    fn visit_type_name(&mut self, name: &mut String) {
        self.reserved.insert(name.clone());
    }
}

struct Renamer<'a> {
    renames: &'a BTreeMap<String, String>,
}

impl Renamer<'_> {
    fn rename(&self, name: &mut String) {
        if let Some(new_name) = self.renames.get(name.as_str()) {
            name.clone_from(new_name);
        }
    }
}

impl VisitorMut for Renamer<'_> {
    fn visit_function_name(&mut self, name: &mut String, _arity: usize) {
        self.rename(name);
    }

    fn visit_callee(&mut self, name: &mut String, _arity: usize) {
        self.rename(name);
    }
}
