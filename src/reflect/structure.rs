use std::collections::{BTreeMap, HashMap};

use tree_sitter::Node;

use crate::error::Result;
use crate::syntax::*;

use super::parameter::{Parameter, expect_kind, missing_identifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    pub name: String,
    /// in declaration order
    pub members: Vec<Parameter>,
}

impl Structure {
    pub fn parse(tree: &SyntaxTree, node: Node<'_>) -> Result<Self> {
        expect_kind(node, STRUCT_DECLARATION)?;

        let name = tree
            .field_text(node, "name")
            .ok_or_else(|| missing_identifier(tree, node))?
            .to_string();

        let members = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == STRUCT_MEMBER)
            .map(|member| Parameter::parse(tree, member))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { name, members })
    }

    pub fn member(&self, name: &str) -> Option<&Parameter> {
        self.members.iter().find(|member| member.name == name)
    }
}

/// resolves a type name to a known structure while parsing functions
///
/// a miss is not an error; the parameter is kept as written
pub trait StructLookup {
    fn lookup(&self, name: &str) -> Option<&Structure>;
}

impl StructLookup for BTreeMap<String, Structure> {
    fn lookup(&self, name: &str) -> Option<&Structure> {
        self.get(name)
    }
}

impl StructLookup for HashMap<String, Structure> {
    fn lookup(&self, name: &str) -> Option<&Structure> {
        self.get(name)
    }
}

impl StructLookup for Vec<Structure> {
    fn lookup(&self, name: &str) -> Option<&Structure> {
        self.iter().find(|structure| structure.name == name)
    }
}

impl<const N: usize> StructLookup for [Structure; N] {
    fn lookup(&self, name: &str) -> Option<&Structure> {
        self.iter().find(|structure| structure.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::ReflectError;

    #[test]
    fn members_in_declaration_order() {
        let source = r#"
            struct VertexInput {
                @location(0) position: vec3<f32>,
                @location(1) color: vec3<f32>,
            };
        "#;
        let tree = SyntaxTree::parse(source).unwrap();
        let structure = Structure::parse(&tree, named_children(tree.root())[0]).unwrap();

        assert_eq!(structure.name, "VertexInput");
        assert_eq!(structure.members.len(), 2);

        let position = &structure.members[0];
        assert_eq!(position.name, "position");
        assert_eq!(position.ty, "vec3<f32>");
        assert_eq!(position.attribute("location"), Some("0"));

        let color = structure.member("color").unwrap();
        assert_eq!(color.ty, "vec3<f32>");
        assert_eq!(color.attribute("location"), Some("1"));
    }

    #[test]
    fn rejects_other_declarations() {
        let tree = SyntaxTree::parse("fn add(a: i32, b: i32) -> i32 { return a + b; }").unwrap();

        let result = Structure::parse(&tree, tree.root());
        assert!(matches!(result, Err(ReflectError::WrongDeclaration { .. })));

        let result = Structure::parse(&tree, named_children(tree.root())[0]);
        assert!(matches!(
            result,
            Err(ReflectError::WrongDeclaration {
                expected: STRUCT_DECLARATION,
                ..
            })
        ));
    }

    #[test]
    fn array_lookup() {
        let structures = [
            Structure {
                name: "A".to_string(),
                members: vec![],
            },
            Structure {
                name: "B".to_string(),
                members: vec![],
            },
        ];

        assert_eq!(structures.lookup("B").map(|s| s.name.as_str()), Some("B"));
        assert!(structures.lookup("C").is_none());
    }

    #[test]
    fn map_lookups_agree() {
        let tree = SyntaxTree::parse("struct A { @location(0) a: f32, };").unwrap();
        let structure = Structure::parse(&tree, named_children(tree.root())[0]).unwrap();

        let hashed = HashMap::from([("A".to_string(), structure.clone())]);
        let ordered = BTreeMap::from([("A".to_string(), structure.clone())]);

        assert_eq!(hashed.lookup("A"), Some(&structure));
        assert_eq!(ordered.lookup("A"), hashed.lookup("A"));
        assert!(hashed.lookup("a").is_none());
    }
}
