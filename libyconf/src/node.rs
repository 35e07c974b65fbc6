//! yconf node representation.

use indexmap::IndexMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A parsed yconf node.
///
/// Leaves are always text; numbers and booleans are interpreted only when a
/// typed getter asks for them. Children are shared, so merged trees and
/// sub-trees point at the nodes the parser built instead of copying them.
#[derive(Clone, PartialEq, Eq)]
pub enum Node {
    /// A leaf value.
    Scalar(String),
    /// Ordered items.
    Sequence(Vec<Arc<Node>>),
    /// Keyed entries. Lookup ignores order; export keeps it.
    Mapping(IndexMap<String, Arc<Node>>),
}

impl Node {
    /// Build a scalar.
    pub fn scalar(text: impl Into<String>) -> Self {
        Node::Scalar(text.into())
    }

    /// Build a sequence from owned items.
    pub fn sequence(items: impl IntoIterator<Item = Node>) -> Self {
        Node::Sequence(items.into_iter().map(Arc::new).collect())
    }

    /// Build a mapping from owned entries.
    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, Node)>) -> Self {
        Node::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), Arc::new(v)))
                .collect(),
        )
    }

    /// An empty mapping, the value of a block with no lines.
    pub fn empty() -> Self {
        Node::Mapping(IndexMap::new())
    }

    /// Returns the text if this is a `Scalar`.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items if this is a `Sequence`.
    pub fn as_sequence(&self) -> Option<&[Arc<Node>]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a `Mapping`.
    pub fn as_mapping(&self) -> Option<&IndexMap<String, Arc<Node>>> {
        match self {
            Node::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the variant, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::empty()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Scalar(s) => write!(f, "{:?}", s),
            Node::Sequence(items) => f.debug_list().entries(items).finish(),
            Node::Mapping(map) => f.debug_map().entries(map).finish(),
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Scalar(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Scalar(s)
    }
}

/// One top-level node: a `---` block of a source, or of an included file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Arc<Node>,
    source: Option<PathBuf>,
}

impl Document {
    pub fn new(root: Node, source: Option<PathBuf>) -> Self {
        Self {
            root: Arc::new(root),
            source,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// File the document was read from; `None` for string input.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
