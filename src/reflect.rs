use std::collections::BTreeMap;
use std::path::Path;

use log::*;

use crate::error::{ReflectError, Result};
use crate::syntax::SyntaxTree;
use crate::util::read_source;

mod binding;
pub use binding::*;
use binding::grow_to_fit;

mod function;
pub use function::*;

mod parameter;
pub use parameter::*;

mod structure;
pub use structure::*;

const STRUCTURES_QUERY: &str = "(struct_declaration) @structure";
const FUNCTIONS_QUERY: &str = "(function_declaration) @function";
const ENTRY_POINTS_QUERY: &str =
    "(function_declaration (attribute . (identifier) @stage) name: (identifier) @name)";
const BINDINGS_QUERY: &str = "(global_variable_declaration) @binding";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryStage {
    Vertex,
    Fragment,
    Compute,
}

impl EntryStage {
    pub const ALL: [EntryStage; 3] = [Self::Vertex, Self::Fragment, Self::Compute];

    /// the decoration that marks a function as this stage's entry point
    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Compute => "compute",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.name() == name)
    }
}

impl std::fmt::Display for EntryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// entry point function names per stage, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entries {
    pub vertex: Vec<String>,
    pub fragment: Vec<String>,
    pub compute: Vec<String>,
}

impl Entries {
    pub fn stage(&self, stage: EntryStage) -> &[String] {
        match stage {
            EntryStage::Vertex => &self.vertex,
            EntryStage::Fragment => &self.fragment,
            EntryStage::Compute => &self.compute,
        }
    }

    fn stage_mut(&mut self, stage: EntryStage) -> &mut Vec<String> {
        match stage {
            EntryStage::Vertex => &mut self.vertex,
            EntryStage::Fragment => &mut self.fragment,
            EntryStage::Compute => &mut self.compute,
        }
    }
}

/// structures, functions, entry points and bind groups of one wgsl program
///
/// built in a single pass and read-only afterwards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reflect {
    structures: BTreeMap<String, Structure>,
    functions: BTreeMap<String, Function>,
    entries: Entries,
    bind_groups: Vec<Option<BindGroup>>,
}

impl Reflect {
    pub fn from_path(source_file: impl AsRef<Path>) -> Result<Self> {
        let source = read_source(source_file.as_ref())?;
        Self::from_source(source)
    }

    pub fn from_source(source: impl Into<String>) -> Result<Self> {
        let tree = SyntaxTree::parse(source)?;
        Self::from_tree(&tree)
    }

    pub fn from_tree(tree: &SyntaxTree) -> Result<Self> {
        let mut reflect = Self::default();

        // structures first, so functions can flatten parameters declared later in the file
        reflect.reflect_structures(tree)?;
        reflect.reflect_functions(tree)?;
        reflect.reflect_entry_points(tree)?;
        reflect.reflect_bind_groups(tree)?;

        Ok(reflect)
    }

    fn reflect_structures(&mut self, tree: &SyntaxTree) -> Result<()> {
        let matches = tree.query(tree.root(), STRUCTURES_QUERY)?;
        for node in matches.iter().filter_map(|m| m.get("structure")) {
            let structure = Structure::parse(tree, node)?;
            trace!("structure {} ({} members)", structure.name, structure.members.len());

            if let Some(previous) = self.structures.insert(structure.name.clone(), structure) {
                warn!("structure {} declared more than once; keeping the last", previous.name);
            }
        }

        debug!("reflected {} structures", self.structures.len());
        Ok(())
    }

    fn reflect_functions(&mut self, tree: &SyntaxTree) -> Result<()> {
        let matches = tree.query(tree.root(), FUNCTIONS_QUERY)?;
        for node in matches.iter().filter_map(|m| m.get("function")) {
            let function = Function::parse(tree, node, Some(&self.structures))?;
            trace!("function {} ({} inputs)", function.name, function.inputs.len());

            if let Some(previous) = self.functions.insert(function.name.clone(), function) {
                warn!("function {} declared more than once; keeping the last", previous.name);
            }
        }

        debug!("reflected {} functions", self.functions.len());
        Ok(())
    }

    fn reflect_entry_points(&mut self, tree: &SyntaxTree) -> Result<()> {
        let matches = tree.query(tree.root(), ENTRY_POINTS_QUERY)?;
        for captures in &matches {
            let (Some(stage), Some(name)) = (captures.get("stage"), captures.get("name")) else {
                continue;
            };
            let Some(stage) = EntryStage::from_name(tree.text(stage)) else {
                continue;
            };

            let name = tree.text(name);
            if !self.functions.contains_key(name) {
                return Err(ReflectError::MissingFunction(name.to_string()));
            }

            self.entries.stage_mut(stage).push(name.to_string());
        }

        debug!(
            "reflected entry points: {} vertex, {} fragment, {} compute",
            self.entries.vertex.len(),
            self.entries.fragment.len(),
            self.entries.compute.len()
        );
        Ok(())
    }

    fn reflect_bind_groups(&mut self, tree: &SyntaxTree) -> Result<()> {
        let matches = tree.query(tree.root(), BINDINGS_QUERY)?;
        for node in matches.iter().filter_map(|m| m.get("binding")) {
            let binding = Binding::parse(tree, node)?;
            trace!(
                "binding {} at group {} binding {}",
                binding.name, binding.group, binding.binding
            );

            let group_index = binding.group as usize;
            grow_to_fit(&mut self.bind_groups, group_index)?;
            let group = self.bind_groups[group_index].get_or_insert_with(BindGroup::default);

            if let Some(previous) = group.insert(binding)? {
                warn!(
                    "binding {} at group {} binding {} was overwritten",
                    previous.name, previous.group, previous.binding
                );
            }
        }

        debug!("reflected {} bind groups", self.bind_groups.len());
        Ok(())
    }

    pub fn structures(&self) -> &BTreeMap<String, Structure> {
        &self.structures
    }

    pub fn structure(&self, name: &str) -> Option<&Structure> {
        self.structures.get(name)
    }

    pub fn functions(&self) -> &BTreeMap<String, Function> {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn entries(&self) -> &Entries {
        &self.entries
    }

    pub fn vertex(&self, index: usize) -> Result<&Function> {
        self.entry(EntryStage::Vertex, index)
    }

    pub fn fragment(&self, index: usize) -> Result<&Function> {
        self.entry(EntryStage::Fragment, index)
    }

    pub fn compute(&self, index: usize) -> Result<&Function> {
        self.entry(EntryStage::Compute, index)
    }

    pub fn entry(&self, stage: EntryStage, index: usize) -> Result<&Function> {
        let names = self.entries.stage(stage);
        let name = names.get(index).ok_or(ReflectError::EntryOutOfRange {
            stage,
            index,
            len: names.len(),
        })?;

        self.functions
            .get(name)
            .ok_or_else(|| ReflectError::MissingFunction(name.clone()))
    }

    /// indexed by group number; `None` for group numbers nothing binds to
    pub fn bind_groups(&self) -> &[Option<BindGroup>] {
        &self.bind_groups
    }

    /// fails for indices past the highest declared group
    pub fn bind_group(&self, index: usize) -> Result<Option<&BindGroup>> {
        self.bind_groups
            .get(index)
            .map(Option::as_ref)
            .ok_or(ReflectError::GroupOutOfRange {
                index,
                len: self.bind_groups.len(),
            })
    }
}
