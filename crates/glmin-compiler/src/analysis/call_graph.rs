//! Calls between user-defined functions of one stage.

use alloc::{
    collections::{BTreeMap, BTreeSet},
    string::String,
    vec::Vec,
};
use core::fmt;

use glmin_syntax::{
    ast::{FunctionDefinition, FunctionPrototype, TranslationUnit},
    visit::{walk_function_definition, VisitorMut},
};

/// A function overload, identified by name and parameter count.
///
/// Overloads that differ only in parameter types are not told apart.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionKey {
    pub name: String,
    pub arity: usize,
}

impl FunctionKey {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    pub fn of(proto: &FunctionPrototype) -> Self {
        Self::new(proto.name.clone(), proto.params.len())
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    /// Functions with a body, in any conditional branch.
    pub defined: BTreeSet<FunctionKey>,
    /// Callees of each defined function.
    pub calls: BTreeMap<FunctionKey, BTreeSet<FunctionKey>>,
    /// Calls made outside any function body.
    pub global_calls: BTreeSet<FunctionKey>,
    /// Functions kept alive by name, such as those called from macro text.
    pub pinned: BTreeSet<FunctionKey>,
}

impl CallGraph {
    /// Collect the graph of `unit`.
    ///
    /// Nothing is rewritten, but the walk goes through [`VisitorMut`], the
    /// only visitor the syntax crate offers, so the tree is borrowed mutably.
    pub fn build(unit: &mut TranslationUnit) -> Self {
        let mut builder = Builder {
            graph: CallGraph::default(),
            current: None,
        };
        builder.visit_translation_unit(unit);
        builder.graph
    }

    pub fn has_main(&self) -> bool {
        self.defined.iter().any(|key| key.name == "main")
    }

    /// Treat every defined overload named in `names` as a root.
    pub fn pin_names(&mut self, names: &BTreeSet<String>) {
        let pinned = self
            .defined
            .iter()
            .filter(|key| names.contains(&key.name))
            .cloned();
        self.pinned.extend(pinned);
    }

    /// Functions reachable from `main`, from a call outside any function or
    /// from a pinned function.
    pub fn reachable(&self) -> BTreeSet<FunctionKey> {
        let mut reached = BTreeSet::new();
        let mut pending: Vec<FunctionKey> = self
            .defined
            .iter()
            .filter(|key| key.name == "main")
            .cloned()
            .chain(self.global_calls.iter().cloned())
            .chain(self.pinned.iter().cloned())
            .collect();

        while let Some(key) = pending.pop() {
            if !reached.insert(key.clone()) {
                continue;
            }
            if let Some(callees) = self.calls.get(&key) {
                pending.extend(callees.iter().filter(|c| !reached.contains(*c)).cloned());
            }
        }
        reached
    }
}

struct Builder {
    graph: CallGraph,
    current: Option<FunctionKey>,
}

impl VisitorMut for Builder {
    fn visit_function_definition(&mut self, def: &mut FunctionDefinition) {
        let key = FunctionKey::of(&def.prototype);
        self.graph.defined.insert(key.clone());
        self.graph.calls.entry(key.clone()).or_default();
        self.current = Some(key);
        walk_function_definition(self, def);
        self.current = None;
    }

    fn visit_callee(&mut self, name: &mut String, arity: usize) {
        let callee = FunctionKey::new(name.clone(), arity);
        match &self.current {
            Some(caller) => {
                self.graph
                    .calls
                    .entry(caller.clone())
                    .or_default()
                    .insert(callee);
            }
            None => {
                self.graph.global_calls.insert(callee);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use glmin_syntax::{parse_translation_unit, ShaderStage};

    fn graph(source: &str) -> CallGraph {
        let mut unit = parse_translation_unit(source, ShaderStage::Vertex).unwrap();
        CallGraph::build(&mut unit)
    }

    #[test]
    fn test_transitive_reachability() {
        let graph = graph(
            "float c(){return 1.;}float b(){return c();}float dead(){return b();}void main(){b();}",
        );
        let reached = graph.reachable();
        assert!(reached.contains(&FunctionKey::new("main", 0)));
        assert!(reached.contains(&FunctionKey::new("b", 0)));
        assert!(reached.contains(&FunctionKey::new("c", 0)));
        assert!(!reached.contains(&FunctionKey::new("dead", 0)));
    }

    #[test]
    fn test_overloads_by_arity() {
        let graph = graph("float f(float x){return x;}float f(){return 1.;}void main(){f(2.);}");
        let reached = graph.reachable();
        assert!(reached.contains(&FunctionKey::new("f", 1)));
        assert!(!reached.contains(&FunctionKey::new("f", 0)));
    }

    #[test]
    fn test_recursion_terminates() {
        let graph = graph("void a(){b();}void b(){a();}void main(){a();}");
        assert_eq!(graph.reachable().len(), 3);
    }

    #[test]
    fn test_pinned_names_are_roots() {
        let mut graph = graph(
            "float leaf(){return 1.;}float helper(){return leaf();}\
             float helper(float x){return x;}void main(){}",
        );
        graph.pin_names(&BTreeSet::from(["helper".to_string(), "missing".to_string()]));
        let reached = graph.reachable();
        assert!(reached.contains(&FunctionKey::new("helper", 0)));
        assert!(reached.contains(&FunctionKey::new("helper", 1)));
        assert!(reached.contains(&FunctionKey::new("leaf", 0)));
        assert!(!reached.contains(&FunctionKey::new("missing", 0)));
    }

    #[test]
    fn test_main_inside_conditional() {
        let graph = graph("#ifdef A\nvoid main(){}\n#endif\n");
        assert!(graph.has_main());
    }
}
