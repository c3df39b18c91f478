use std::collections::BTreeMap;

use log::*;
use tree_sitter::Node;

use crate::error::Result;
use crate::syntax::*;

use super::EntryStage;
use super::parameter::{Parameter, expect_kind, missing_identifier};
use super::structure::StructLookup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    /// parameters with structure-typed ones replaced by the structure's members
    pub inputs: Vec<Parameter>,
    /// function decorations; flags like `@vertex` map to an empty string
    pub attributes: BTreeMap<String, String>,
}

impl Function {
    pub fn parse(
        tree: &SyntaxTree,
        node: Node<'_>,
        structs: Option<&dyn StructLookup>,
    ) -> Result<Self> {
        expect_kind(node, FUNCTION_DECLARATION)?;

        let name_node = node
            .child_by_field_name("name")
            .ok_or_else(|| missing_identifier(tree, node))?;
        let name = tree.text(name_node).to_string();

        let mut inputs = vec![];
        let mut attributes = BTreeMap::new();

        for child in named_children(node) {
            match child.kind() {
                // return type decorations sit under the return type node, not here
                ATTRIBUTE => {
                    let (attribute_name, value) = function_attribute(tree, child)?;
                    attributes.insert(attribute_name, value);
                }

                PARAMETER_LIST => {
                    for parameter_node in named_children(child) {
                        if parameter_node.kind() != PARAMETER {
                            continue;
                        }

                        let parameter = Parameter::parse(tree, parameter_node)?;
                        match structs.and_then(|structs| structs.lookup(&parameter.ty)) {
                            Some(structure) => {
                                trace!(
                                    "flattening {}: {} into {name}",
                                    parameter.name, structure.name
                                );
                                inputs.extend(structure.members.iter().cloned());
                            }
                            None => inputs.push(parameter),
                        }
                    }
                }

                _ => {}
            }
        }

        Ok(Self {
            name,
            inputs,
            attributes,
        })
    }

    /// `Some("")` for a flag decoration, `None` when the decoration is absent
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn stages(&self) -> impl Iterator<Item = EntryStage> + '_ {
        EntryStage::ALL
            .into_iter()
            .filter(|stage| self.attributes.contains_key(stage.name()))
    }
}

/// the decoration name plus its arguments joined without the parentheses,
/// so `@workgroup_size(8, 4, 1)` reads as `("workgroup_size", "8,4,1")`
fn function_attribute(tree: &SyntaxTree, node: Node<'_>) -> Result<(String, String)> {
    let identifier = named_children(node)
        .into_iter()
        .next()
        .ok_or_else(|| missing_identifier(tree, node))?;

    let mut value = String::new();
    let mut sibling = identifier.next_sibling();
    while let Some(argument) = sibling {
        let text = tree.text(argument);
        if text != "(" && text != ")" {
            value.push_str(text);
        }
        sibling = argument.next_sibling();
    }

    Ok((tree.text(identifier).to_string(), value))
}
