use tree_sitter::Node;

use crate::error::{ReflectError, Result};
use crate::syntax::*;

/// a decoration such as `@location(0)` or `@interpolate(flat)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// raw argument text, empty for flag-style decorations
    pub value: String,
}

impl Attribute {
    /// decodes the identifier and the first argument of an attribute node
    pub fn parse(tree: &SyntaxTree, node: Node<'_>) -> Result<Self> {
        let mut parts = named_children(node).into_iter();

        let name = parts
            .next()
            .map(|identifier| tree.text(identifier).to_string())
            .ok_or_else(|| missing_identifier(tree, node))?;
        let value = parts
            .next()
            .map(|argument| tree.text(argument).to_string())
            .unwrap_or_default();

        Ok(Self { name, value })
    }
}

/// a function parameter or a structure member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: String,
    /// in source order, repeated names are kept
    pub attributes: Vec<Attribute>,
}

impl Parameter {
    pub fn parse(tree: &SyntaxTree, node: Node<'_>) -> Result<Self> {
        let mut declaration: Option<(String, String)> = None;
        let mut attributes = vec![];

        for child in named_children(node) {
            match child.kind() {
                VARIABLE_IDENTIFIER_DECLARATION => {
                    let name = tree.field_text(child, "name");
                    let ty = tree.field_text(child, "type");
                    if let (Some(name), Some(ty)) = (name, ty) {
                        declaration = Some((name.to_string(), ty.to_string()));
                    }
                }
                ATTRIBUTE => attributes.push(Attribute::parse(tree, child)?),
                _ => {}
            }
        }

        let (name, ty) = declaration.ok_or_else(|| missing_identifier(tree, node))?;

        Ok(Self {
            name,
            ty,
            attributes,
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }
}

pub(super) fn missing_identifier(tree: &SyntaxTree, node: Node<'_>) -> ReflectError {
    ReflectError::MissingIdentifier {
        kind: node.kind().to_string(),
        text: tree.text(node).to_string(),
    }
}

/// fails unless `node` is of the `expected` kind
pub(super) fn expect_kind(node: Node<'_>, expected: &'static str) -> Result<()> {
    if node.kind() != expected {
        return Err(ReflectError::WrongDeclaration {
            expected,
            found: node.kind().to_string(),
        });
    }

    Ok(())
}
