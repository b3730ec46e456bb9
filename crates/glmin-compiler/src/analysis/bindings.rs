//! Variable bindings of a whole program.
//!
//! [`BindingTable::build`] walks each stage once and resolves every variable
//! name site (declarations, parameters and uses) to the binding it refers
//! to, honoring GLSL scoping. Renaming is then a matter of choosing a new
//! name per binding and replaying the same walk with [`rename_stage`].

use alloc::{
    collections::{BTreeMap, BTreeSet},
    format,
    string::String,
    vec,
    vec::Vec,
};

use glmin_syntax::{
    ast::{DeclScope, Declaration, Declarator, FullySpecifiedType, Statement},
    emit_statement,
    visit::{walk_declarator, ScopeKind, VisitorMut},
    ShaderStage, TranslationUnit,
};

use super::directives::directive_words;
use crate::{
    error::{CompileError, CompileResult},
    program::ShaderProgram,
};

pub type BindingId = usize;

/// Where a binding lives, for deciding which bindings may share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScopeClass {
    Global,
    /// Parameters and locals of the `function`-th definition of a stage.
    Local { function: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub stage: ShaderStage,
    pub class: ScopeClass,
    /// Declared `attribute`, `varying` or `uniform`.
    pub linked: bool,
    /// Canonical text of a global's declaration. `None` for locals, and for
    /// globals redeclared with a different declaration.
    pub signature: Option<String>,
    /// Number of name sites referring to this binding.
    pub sites: usize,
}

#[derive(Debug, Clone, Default)]
pub struct StageBindings {
    /// Binding of each variable name site, in walk order.
    pub sites: Vec<Option<BindingId>>,
    /// Names used in the stage that no binding accounts for: functions,
    /// types, built-ins and macros.
    pub free_names: BTreeSet<String>,
    /// Words appearing in preprocessor directives and conditions.
    pub directive_words: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    pub bindings: Vec<Binding>,
    stages: BTreeMap<ShaderStage, StageBindings>,
}

impl BindingTable {
    /// Collect the bindings of both stages.
    ///
    /// The walk goes through [`VisitorMut`], so each stage is collected from
    /// a copy and `program` is left untouched.
    pub fn build(program: &ShaderProgram) -> CompileResult<Self> {
        let mut table = BindingTable::default();
        for stage in ShaderStage::ALL {
            let mut unit = program.stage(stage)?.clone();
            let mut collector = Collector::new(stage, &mut table.bindings);
            collector.visit_translation_unit(&mut unit);
            let mut stage_bindings = collector.finish();
            stage_bindings.directive_words = directive_words(&unit);
            table.stages.insert(stage, stage_bindings);
        }
        Ok(table)
    }

    pub fn stage(&self, stage: ShaderStage) -> CompileResult<&StageBindings> {
        self.stages.get(&stage).ok_or_else(|| {
            CompileError::structural(format!("no bindings collected for the {} shader", stage))
        })
    }

    /// Ids of the bindings of `stage`, in declaration order.
    pub fn ids(&self, stage: ShaderStage) -> impl Iterator<Item = BindingId> + '_ {
        self.bindings
            .iter()
            .enumerate()
            .filter(move |(_, binding)| binding.stage == stage)
            .map(|(id, _)| id)
    }
}

/// Rewrite the variable names of one stage.
///
/// `table` must have been built from this unit, unchanged since. `new_names`
/// holds the new name of each binding, or `None` to keep it.
pub fn rename_stage(
    unit: &mut TranslationUnit,
    table: &StageBindings,
    new_names: &[Option<String>],
) -> CompileResult<()> {
    let mut renamer = Renamer {
        sites: &table.sites,
        new_names,
        cursor: 0,
    };
    renamer.visit_translation_unit(unit);
    if renamer.cursor != table.sites.len() {
        return Err(CompileError::structural(format!(
            "renamer visited {} name sites, expected {}",
            renamer.cursor,
            table.sites.len()
        )));
    }
    Ok(())
}

struct Collector<'a> {
    stage: ShaderStage,
    bindings: &'a mut Vec<Binding>,
    /// Innermost last; the first entry holds the globals.
    scopes: Vec<(Option<ScopeKind>, BTreeMap<String, BindingId>)>,
    functions: usize,
    function: Option<usize>,
    signature: Option<String>,
    out: StageBindings,
}

impl<'a> Collector<'a> {
    fn new(stage: ShaderStage, bindings: &'a mut Vec<Binding>) -> Self {
        Self {
            stage,
            bindings,
            scopes: vec![(None, BTreeMap::new())],
            functions: 0,
            function: None,
            signature: None,
            out: StageBindings::default(),
        }
    }

    fn finish(self) -> StageBindings {
        self.out
    }

    fn resolve(&self, name: &str) -> Option<BindingId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|(_, names)| names.get(name).copied())
    }

    fn site(&mut self, id: Option<BindingId>) {
        if let Some(id) = id {
            self.bindings[id].sites += 1;
        }
        self.out.sites.push(id);
    }

    /// Bind `name` in the innermost scope, reusing an earlier binding of
    /// the same name there.
    fn declare(&mut self, name: &str, linked: bool, signature: Option<String>) -> BindingId {
        let class = match self.function {
            Some(function) if self.scopes.len() > 1 => ScopeClass::Local { function },
            _ => ScopeClass::Global,
        };

        let existing = self
            .scopes
            .last()
            .and_then(|(_, names)| names.get(name).copied());
        if let Some(id) = existing {
            let binding = &mut self.bindings[id];
            binding.linked |= linked;
            if binding.signature != signature {
                binding.signature = None;
            }
            return id;
        }

        let id = self.bindings.len();
        self.bindings.push(Binding {
            name: name.into(),
            stage: self.stage,
            class,
            linked,
            signature,
            sites: 0,
        });
        if let Some((_, names)) = self.scopes.last_mut() {
            names.insert(name.into(), id);
        }
        log::trace!("{} binding {} {:?}", self.stage, name, class);
        id
    }
}

impl VisitorMut for Collector<'_> {
    fn visit_declarator(
        &mut self,
        ty: &FullySpecifiedType,
        declarator: &mut Declarator,
        scope: DeclScope,
    ) {
        if scope == DeclScope::Global {
            let single = Declaration {
                ty: ty.clone(),
                declarators: vec![declarator.clone()],
            };
            self.signature = Some(emit_statement(&Statement::Declaration(single)));
        }
        walk_declarator(self, ty, declarator, scope);
    }

    fn visit_declared_name(&mut self, ty: &FullySpecifiedType, name: &mut String, _: DeclScope) {
        let linked = ty.qualifier.is_some_and(|q| q.is_linked());
        let signature = self.signature.take();
        let id = self.declare(name, linked, signature);
        self.site(Some(id));
    }

    fn visit_parameter_name(&mut self, name: &mut String) {
        match self.scopes.last() {
            Some((Some(ScopeKind::Function), _)) => {
                let id = self.declare(name, false, None);
                self.site(Some(id));
            }
            _ => self.site(None),
        }
    }

    fn visit_variable_name(&mut self, name: &mut String) {
        let id = self.resolve(name);
        if id.is_none() {
            self.out.free_names.insert(name.clone());
        }
        self.site(id);
    }

    fn visit_type_name(&mut self, name: &mut String) {
        self.out.free_names.insert(name.clone());
    }

    fn visit_function_name(&mut self, name: &mut String, _arity: usize) {
        self.out.free_names.insert(name.clone());
    }

    fn visit_callee(&mut self, name: &mut String, _arity: usize) {
        self.out.free_names.insert(name.clone());
    }

    fn enter_scope(&mut self, kind: ScopeKind) {
        if kind == ScopeKind::Function {
            self.function = Some(self.functions);
            self.functions += 1;
        }
        self.scopes.push((Some(kind), BTreeMap::new()));
    }

    fn exit_scope(&mut self) {
        if let Some((Some(ScopeKind::Function), _)) = self.scopes.pop() {
            self.function = None;
        }
    }
}

struct Renamer<'a> {
    sites: &'a [Option<BindingId>],
    new_names: &'a [Option<String>],
    cursor: usize,
}

impl Renamer<'_> {
    fn site(&mut self, name: &mut String) {
        let id = self.sites.get(self.cursor).copied().flatten();
        self.cursor += 1;
        if let Some(Some(new_name)) = id.and_then(|id| self.new_names.get(id)) {
            name.clone_from(new_name);
        }
    }
}

impl VisitorMut for Renamer<'_> {
    fn visit_declared_name(&mut self, _ty: &FullySpecifiedType, name: &mut String, _: DeclScope) {
        self.site(name);
    }

    fn visit_parameter_name(&mut self, name: &mut String) {
        self.site(name);
    }

    fn visit_variable_name(&mut self, name: &mut String) {
        self.site(name);
    }
}
