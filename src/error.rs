use std::path::PathBuf;

use thiserror::Error;

use crate::reflect::EntryStage;

pub type Result<T, E = ReflectError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ReflectError {
    /// the shader source could not be read
    #[error("failed to read shader source {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// the grammar could not be loaded or the parser gave up
    #[error("failed to parse shader source: {0}")]
    Syntax(String),

    #[error("invalid query pattern {pattern:?}: {message}")]
    Query { pattern: String, message: String },

    /// a declaration parser was handed a node of another kind
    #[error("expected a {expected} node, found {found}")]
    WrongDeclaration {
        expected: &'static str,
        found: String,
    },

    #[error("no identifier found in {kind}: {text:?}")]
    MissingIdentifier { kind: String, text: String },

    #[error("@{attribute} expects an integer argument, found {value:?}")]
    InvalidAttributeArgument { attribute: String, value: String },

    #[error("unsupported binding type declaration {0:?}")]
    UnsupportedType(String),

    #[error("unsupported address space {0:?}")]
    UnsupportedAddressSpace(String),

    /// one of binding, group, name or type was never declared
    #[error("incomplete binding declaration {0:?}")]
    IncompleteBinding(String),

    /// an entry point names a function that the function table doesn't hold
    #[error("function {0:?} is missing from the function table")]
    MissingFunction(String),

    #[error("{stage} entry point {index} out of range (count: {len})")]
    EntryOutOfRange {
        stage: EntryStage,
        index: usize,
        len: usize,
    },

    #[error("bind group {index} out of range (count: {len})")]
    GroupOutOfRange { index: usize, len: usize },

    #[error("binding {index} out of range (count: {len})")]
    BindingOutOfRange { index: usize, len: usize },

    /// a group or binding number too large to lay out as a table
    #[error("group or binding number {index} exceeds {limit}")]
    IndexTooLarge { index: usize, limit: usize },
}
