//! Short names for variables, shared across the link boundary where needed.

use alloc::{
    collections::{BTreeMap, BTreeSet},
    string::String,
    vec,
    vec::Vec,
};

use glmin_syntax::ShaderStage;

use crate::{
    analysis::{rename_stage, BindingId, BindingTable, ScopeClass},
    error::CompileResult,
    names::NameGenerator,
    pipeline::Pass,
    program::ShaderProgram,
};

/// Gives every variable and parameter the shortest free name.
///
/// Globals on the link boundary (`attribute`, `varying`, `uniform`) and
/// globals declared identically in both stages get one name shared by both
/// stages. Other globals are named per stage, and locals per function, so
/// unrelated functions reuse the same short names. Names mentioned by a
/// preprocessor directive are kept, and are never handed out.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableMinifier;

impl VariableMinifier {
    /// The renames [`Pass::run`] would perform, without performing them.
    pub fn plan(program: &ShaderProgram) -> CompileResult<RenamePlan> {
        let table = BindingTable::build(program)?;
        let new_names = allocate(&table)?;

        let entries = table
            .bindings
            .iter()
            .zip(&new_names)
            .filter_map(|(binding, new)| {
                Some(RenameEntry {
                    stage: binding.stage,
                    class: binding.class,
                    old: binding.name.clone(),
                    new: new.clone()?,
                })
            })
            .collect();
        Ok(RenamePlan { entries })
    }
}

impl Pass for VariableMinifier {
    fn name(&self) -> &'static str {
        "VariableMinifier"
    }

    fn run(&self, mut program: ShaderProgram) -> CompileResult<ShaderProgram> {
        let table = BindingTable::build(&program)?;
        let new_names = allocate(&table)?;
        for stage in ShaderStage::ALL {
            let stage_table = table.stage(stage)?;
            rename_stage(program.stage_mut(stage)?, stage_table, &new_names)?;
        }
        Ok(program)
    }
}

/// One renamed variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    pub stage: ShaderStage,
    pub class: ScopeClass,
    pub old: String,
    pub new: String,
}

/// Old to new variable names of a program, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenamePlan {
    pub entries: Vec<RenameEntry>,
}

impl RenamePlan {
    /// New name of the global `old` of `stage`, if it is renamed.
    ///
    /// Hosts use this to look up renamed uniforms and attributes.
    pub fn global(&self, stage: ShaderStage, old: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.stage == stage && e.class == ScopeClass::Global && e.old == old)
            .map(|e| e.new.as_str())
    }

    pub fn stage(&self, stage: ShaderStage) -> impl Iterator<Item = &RenameEntry> {
        self.entries.iter().filter(move |e| e.stage == stage)
    }
}

/// Which names a group of bindings must not collide with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    /// Visible in both stages.
    Shared,
    Global(ShaderStage),
    Local(ShaderStage, usize),
}

/// Bindings that receive one name together.
#[derive(Debug)]
struct Group {
    slot: Slot,
    members: Vec<BindingId>,
    weight: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SharedKey {
    Linked(String),
    Signature(String),
}

/// Names already handed out, per slot.
#[derive(Debug, Default)]
struct Taken {
    shared: BTreeSet<String>,
    globals: BTreeMap<ShaderStage, BTreeSet<String>>,
    locals: BTreeMap<(ShaderStage, usize), BTreeSet<String>>,
    reserved: BTreeMap<ShaderStage, BTreeSet<String>>,
}

impl Taken {
    fn in_stage(&self, stage: ShaderStage, name: &str) -> bool {
        let contains = |map: &BTreeMap<ShaderStage, BTreeSet<String>>| {
            map.get(&stage).is_some_and(|names| names.contains(name))
        };
        self.shared.contains(name) || contains(&self.globals) || contains(&self.reserved)
    }

    fn in_any_local(&self, stage: ShaderStage, name: &str) -> bool {
        self.locals
            .iter()
            .any(|((s, _), names)| *s == stage && names.contains(name))
    }

    fn blocks(&self, slot: Slot, name: &str) -> bool {
        match slot {
            Slot::Shared => ShaderStage::ALL
                .iter()
                .any(|&stage| self.in_stage(stage, name) || self.in_any_local(stage, name)),
            Slot::Global(stage) => self.in_stage(stage, name) || self.in_any_local(stage, name),
            Slot::Local(stage, function) => {
                self.in_stage(stage, name)
                    || self
                        .locals
                        .get(&(stage, function))
                        .is_some_and(|names| names.contains(name))
            }
        }
    }

    fn take(&mut self, slot: Slot, name: &str) {
        let set = match slot {
            Slot::Shared => &mut self.shared,
            Slot::Global(stage) => self.globals.entry(stage).or_default(),
            Slot::Local(stage, function) => self.locals.entry((stage, function)).or_default(),
        };
        set.insert(name.into());
    }
}

/// Choose the new name of every binding; `None` keeps the old one.
fn allocate(table: &BindingTable) -> CompileResult<Vec<Option<String>>> {
    let mut taken = Taken::default();
    for stage in ShaderStage::ALL {
        let stage_table = table.stage(stage)?;
        let reserved = taken.reserved.entry(stage).or_default();
        reserved.extend(stage_table.free_names.iter().cloned());
        reserved.extend(stage_table.directive_words.iter().cloned());
    }

    let mut groups = group_bindings(table);
    groups.retain(|group| {
        let pinned = group.members.iter().any(|&id| {
            let binding = &table.bindings[id];
            table
                .stage(binding.stage)
                .is_ok_and(|stage| stage.directive_words.contains(&binding.name))
        });
        if pinned {
            for &id in &group.members {
                let binding = &table.bindings[id];
                log::debug!("{} shader: keeping {}", binding.stage, binding.name);
                taken
                    .reserved
                    .entry(binding.stage)
                    .or_default()
                    .insert(binding.name.clone());
            }
        }
        !pinned
    });
    groups.sort_by(|a, b| {
        (a.slot, b.weight, a.members[0]).cmp(&(b.slot, a.weight, b.members[0]))
    });

    let mut new_names = vec![None; table.bindings.len()];
    for group in &groups {
        let name = NameGenerator::first_free(|name| taken.blocks(group.slot, name));
        taken.take(group.slot, &name);
        for &id in &group.members {
            let binding = &table.bindings[id];
            log::trace!(
                "{} shader: {:?} {} -> {}",
                binding.stage,
                binding.class,
                binding.name,
                name
            );
            new_names[id] = Some(name.clone());
        }
    }
    Ok(new_names)
}

/// Partition all bindings into groups renamed together.
fn group_bindings(table: &BindingTable) -> Vec<Group> {
    let mut shared: BTreeMap<SharedKey, Vec<BindingId>> = BTreeMap::new();
    let mut groups = Vec::new();
    let single = |slot, id: BindingId| Group {
        slot,
        members: vec![id],
        weight: table.bindings[id].sites,
    };

    for (id, binding) in table.bindings.iter().enumerate() {
        match binding.class {
            ScopeClass::Local { function } => {
                groups.push(single(Slot::Local(binding.stage, function), id));
            }
            ScopeClass::Global if binding.linked => {
                shared
                    .entry(SharedKey::Linked(binding.name.clone()))
                    .or_default()
                    .push(id);
            }
            ScopeClass::Global => match &binding.signature {
                Some(signature) => shared
                    .entry(SharedKey::Signature(signature.clone()))
                    .or_default()
                    .push(id),
                None => groups.push(single(Slot::Global(binding.stage), id)),
            },
        }
    }

    for (key, members) in shared {
        let in_both = ShaderStage::ALL
            .iter()
            .all(|&stage| members.iter().any(|&id| table.bindings[id].stage == stage));
        if matches!(key, SharedKey::Linked(_)) || in_both {
            groups.push(Group {
                slot: Slot::Shared,
                weight: members.iter().map(|&id| table.bindings[id].sites).sum(),
                members,
            });
        } else {
            for id in members {
                groups.push(single(Slot::Global(table.bindings[id].stage), id));
            }
        }
    }
    groups
}
