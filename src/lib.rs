pub mod error;
pub mod json;
pub mod reflect;
pub mod syntax;
pub mod tasks;
pub mod util;
pub mod watcher;

pub use error::*;
pub use json::ReflectionJson;
pub use reflect::*;
pub use syntax::SyntaxTree;
