//! yconf configuration parser.
//!
//! yconf reads an indentation-sensitive subset of YAML extended with
//! `include` directives and inline JSON collections, and answers typed
//! queries against the merged result.
//!
//! # Parsing Pipeline
//!
//! The parser operates in three phases:
//!
//! 1. **Scanner**: Splits source text into logical lines, measuring
//!    indentation and dropping blanks and comments.
//!
//! 2. **Line Lexer**: Classifies each line as an include, sequence item,
//!    inline collection, mapping entry, or scalar.
//!
//! 3. **Node Builder**: Recursively assembles blocks of lines into nodes,
//!    resolving includes and decoding inline collections as it goes.
//!
//! Each `---` block and each block of an included file becomes a
//! [`Document`]. [`merge`] folds the documents of one load into a [`Tree`],
//! later documents overriding earlier ones key by key.
//!
//! # Example
//!
//! ```
//! use libyconf::Tree;
//!
//! let tree: Tree = "server:\n  port: 8080\n  hosts: [a, b]".parse().unwrap();
//! assert_eq!(tree.get_int("server.port", 0), 8080);
//! assert_eq!(tree.get_string("server.hosts[1]", ""), "b");
//! assert_eq!(tree.get_int("missing.key", 42), 42);
//! ```

mod config;
mod encode;
mod error;
mod json;
mod lexer;
mod merge;
mod node;
mod parser;
mod scanner;
mod session;
mod tree;

use std::path::Path;

pub use config::{Config, SharedConfig};
pub use encode::{encode, export, to_value, Format};
pub use error::{ParseError, Result};
pub use merge::merge;
pub use node::{Document, Node};
pub use session::LoadSession;
pub use tree::{Tree, DEFAULT_SEPARATOR};

/// Parse a yconf source into its documents.
///
/// Includes resolve against the working directory.
pub fn parse(input: &str) -> Result<Vec<Document>> {
    parse_with_filename(input, None)
}

/// Parse a yconf source with a filename for error messages and includes.
pub fn parse_with_filename(input: &str, filename: Option<&Path>) -> Result<Vec<Document>> {
    let mut session = LoadSession::new();
    session.load_source(input, filename)?;
    Ok(session.into_documents())
}

/// Read and parse a yconf file into its documents.
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let mut session = LoadSession::new();
    session.load_file(path.as_ref())?;
    Ok(session.into_documents())
}
