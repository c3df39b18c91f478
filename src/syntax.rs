use std::fmt::Write;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, Tree};

use crate::error::{ReflectError, Result};

// node kinds of the wgsl grammar that reflection cares about
pub const STRUCT_DECLARATION: &str = "struct_declaration";
pub const STRUCT_MEMBER: &str = "struct_member";
pub const FUNCTION_DECLARATION: &str = "function_declaration";
pub const PARAMETER_LIST: &str = "parameter_list";
pub const PARAMETER: &str = "parameter";
pub const ATTRIBUTE: &str = "attribute";
pub const GLOBAL_VARIABLE_DECLARATION: &str = "global_variable_declaration";
pub const VARIABLE_DECLARATION: &str = "variable_declaration";
pub const VARIABLE_QUALIFIER: &str = "variable_qualifier";
pub const VARIABLE_IDENTIFIER_DECLARATION: &str = "variable_identifier_declaration";

pub fn language() -> Language {
    tree_sitter_wgsl_bevy::LANGUAGE.into()
}

/// wgsl source text together with its concrete syntax tree
pub struct SyntaxTree {
    source: String,
    tree: Tree,
}

impl SyntaxTree {
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();

        let mut parser = Parser::new();
        parser
            .set_language(&language())
            .map_err(|e| ReflectError::Syntax(e.to_string()))?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| ReflectError::Syntax("parser returned no tree".to_string()))?;

        Ok(Self { source, tree })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn text(&self, node: Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    /// text of the child stored under `field`, if the node has one
    pub fn field_text(&self, node: Node<'_>, field: &str) -> Option<&str> {
        node.child_by_field_name(field).map(|child| self.text(child))
    }

    /// runs a structural pattern against `node` and everything below it
    ///
    /// matches come back in document order
    pub fn query<'tree>(
        &'tree self,
        node: Node<'tree>,
        pattern: &str,
    ) -> Result<Vec<Captures<'tree>>> {
        let query = Query::new(&language(), pattern).map_err(|e| ReflectError::Query {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        let capture_names = query.capture_names();

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, node, self.source.as_bytes());

        let mut all_captures = vec![];
        while let Some(query_match) = matches.next() {
            let captures = query_match
                .captures
                .iter()
                .map(|capture| {
                    let name = capture_names[capture.index as usize].to_string();
                    (name, capture.node)
                })
                .collect();
            all_captures.push(Captures { captures });
        }

        Ok(all_captures)
    }

    /// indented s-expression of the named nodes below `node`
    /// an indent of 0 gives tree-sitter's single line form
    pub fn ast(&self, node: Node<'_>, indent: usize) -> String {
        if indent == 0 {
            return node.to_sexp();
        }

        let mut out = String::new();
        write_ast(&mut out, node, 0, indent);
        out
    }
}

fn write_ast(out: &mut String, node: Node<'_>, depth: usize, indent: usize) {
    let children = named_children(node);

    let _ = write!(out, "{:width$}({}", "", node.kind(), width = depth * indent);
    for child in children {
        out.push('\n');
        write_ast(out, child, depth + 1, indent);
    }
    out.push(')');
}

pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let children = node.named_children(&mut cursor).collect();
    children
}

/// the captured nodes of one query match
#[derive(Debug, Clone)]
pub struct Captures<'tree> {
    captures: Vec<(String, Node<'tree>)>,
}

impl<'tree> Captures<'tree> {
    /// first node captured under `name`; optional sub-patterns may leave it absent
    pub fn get(&self, name: &str) -> Option<Node<'tree>> {
        self.all(name).next()
    }

    /// every node captured under `name`, for quantified captures
    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Node<'tree>> + 'a {
        self.captures
            .iter()
            .filter(move |(capture_name, _)| capture_name == name)
            .map(|(_, node)| *node)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
