use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::reflect::{EntryStage, Reflect};

mod declarations;
pub use declarations::*;

/// the document handed to pipeline-layout generators and other downstream tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionJson {
    pub structures: BTreeMap<String, StructureJson>,
    pub functions: BTreeMap<String, FunctionJson>,
    pub entries: EntriesJson,
    /// indexed by group, then by binding; gaps are `null`
    pub bindgroups: Vec<Option<Vec<Option<BindingJson>>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntriesJson {
    pub vertex: Vec<String>,
    pub fragment: Vec<String>,
    pub compute: Vec<String>,
}

impl ReflectionJson {
    pub fn from_reflect(reflect: &Reflect) -> Self {
        let structures = reflect
            .structures()
            .iter()
            .map(|(name, structure)| (name.clone(), StructureJson::from_structure(structure)))
            .collect();

        let functions = reflect
            .functions()
            .iter()
            .map(|(name, function)| (name.clone(), FunctionJson::from_function(function)))
            .collect();

        let entry_names = |stage: EntryStage| reflect.entries().stage(stage).to_vec();
        let entries = EntriesJson {
            vertex: entry_names(EntryStage::Vertex),
            fragment: entry_names(EntryStage::Fragment),
            compute: entry_names(EntryStage::Compute),
        };

        let bindgroups = reflect
            .bind_groups()
            .iter()
            .map(|group| {
                group.as_ref().map(|group| {
                    group
                        .slots()
                        .iter()
                        .map(|slot| slot.as_ref().map(BindingJson::from_binding))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        Self {
            structures,
            functions,
            entries,
            bindgroups,
        }
    }
}
