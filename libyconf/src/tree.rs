//! The merged, queryable configuration tree.
//!
//! Paths name nodes by key, joined with the tree's separator (`.` unless
//! changed with [`Tree::use_sep`]), with bracketed indices for sequences:
//! `servers[0].host`, `matrix[1][0]`. A path that runs into a missing key, an
//! out-of-range index, or a node of the wrong kind finds nothing, and every
//! typed getter then answers its default.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::encode::{encode, export, Format};
use crate::error::ParseError;
use crate::merge::merge;
use crate::node::Node;

/// Separator used by a tree until another is chosen.
pub const DEFAULT_SEPARATOR: &str = ".";

/// An immutable configuration tree paired with a path separator.
///
/// Cloning is cheap; clones and sub-trees share nodes.
#[derive(Clone, PartialEq)]
pub struct Tree {
    root: Arc<Node>,
    sep: String,
}

impl Tree {
    pub fn new(root: Node) -> Self {
        Self::shared(Arc::new(root), DEFAULT_SEPARATOR)
    }

    fn shared(root: Arc<Node>, sep: &str) -> Self {
        Self {
            root,
            sep: sep.to_string(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn separator(&self) -> &str {
        &self.sep
    }

    /// The same tree addressed with another separator, for keys that contain
    /// dots. An empty separator leaves only bracketed indices.
    pub fn use_sep(&self, sep: &str) -> Tree {
        Self::shared(Arc::clone(&self.root), sep)
    }

    /// Find the node at `path`. The empty path names the root.
    pub fn get(&self, path: &str) -> Option<&Node> {
        self.lookup(path).map(|node| &**node)
    }

    fn lookup(&self, path: &str) -> Option<&Arc<Node>> {
        if path.is_empty() {
            return Some(&self.root);
        }

        let (mut rest, mut indexed) = match path.strip_prefix('[') {
            Some(rest) => (rest, true),
            None => (path, false),
        };
        let mut node = &self.root;

        loop {
            let (token, next) = match self.split(rest) {
                Some((at, len, bracket)) => (&rest[..at], Some((&rest[at + len..], bracket))),
                None => (rest, None),
            };

            node = if indexed {
                let index = token.strip_suffix(']')?.parse::<usize>().ok()?;
                node.as_sequence()?.get(index)?
            } else {
                node.as_mapping()?.get(token)?
            };

            match next {
                Some((remaining, bracket)) if !remaining.is_empty() => {
                    rest = remaining;
                    indexed = bracket;
                }
                _ => return Some(node),
            }
        }
    }

    /// Position and length of the next separator or `[` in `path`, and
    /// whether it was a bracket.
    fn split(&self, path: &str) -> Option<(usize, usize, bool)> {
        let bracket = path.find('[');
        let sep = if self.sep.is_empty() {
            None
        } else {
            path.find(self.sep.as_str())
        };
        match (sep, bracket) {
            (Some(s), Some(b)) if b < s => Some((b, 1, true)),
            (Some(s), _) => Some((s, self.sep.len(), false)),
            (None, Some(b)) => Some((b, 1, true)),
            (None, None) => None,
        }
    }

    fn scalar(&self, path: &str) -> Option<&str> {
        if path.is_empty() {
            return None;
        }
        self.get(path).and_then(Node::as_scalar)
    }

    fn non_empty_get(&self, path: &str) -> Option<&Node> {
        if path.is_empty() {
            return None;
        }
        self.get(path)
    }

    // ========================================================================
    // Typed Getters
    // ========================================================================

    pub fn get_string(&self, path: &str, default: &str) -> String {
        self.scalar(path).unwrap_or(default).to_string()
    }

    pub fn get_int(&self, path: &str, default: i64) -> i64 {
        self.scalar(path)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }

    pub fn get_float(&self, path: &str, default: f64) -> f64 {
        self.scalar(path)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }

    /// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        self.scalar(path).and_then(parse_bool).unwrap_or(default)
    }

    /// Scalars of a sequence. Items that are not scalars read as `""`.
    pub fn get_string_list(&self, path: &str, default: &[&str]) -> Vec<String> {
        match self.non_empty_get(path).and_then(Node::as_sequence) {
            Some(items) => items
                .iter()
                .map(|n| n.as_scalar().unwrap_or_default().to_string())
                .collect(),
            None => default.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Integers of a sequence. Items that are not integers read as `0`.
    pub fn get_int_list(&self, path: &str, default: &[i64]) -> Vec<i64> {
        match self.non_empty_get(path).and_then(Node::as_sequence) {
            Some(items) => items.iter().map(|n| scalar_int(n)).collect(),
            None => default.to_vec(),
        }
    }

    /// Scalars of a mapping. Values that are not scalars read as `""`.
    pub fn get_string_map(&self, path: &str, default: &[(&str, &str)]) -> IndexMap<String, String> {
        match self.non_empty_get(path).and_then(Node::as_mapping) {
            Some(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), v.as_scalar().unwrap_or_default().to_string()))
                .collect(),
            None => default
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Integers of a mapping. Values that are not integers read as `0`.
    pub fn get_int_map(&self, path: &str, default: &[(&str, i64)]) -> IndexMap<String, i64> {
        match self.non_empty_get(path).and_then(Node::as_mapping) {
            Some(map) => map.iter().map(|(k, v)| (k.clone(), scalar_int(v))).collect(),
            None => default.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    /// The sub-tree at `path`, keeping this tree's separator. A missing path
    /// yields an empty tree; the empty path yields this tree.
    pub fn get_tree(&self, path: &str) -> Tree {
        let root = self
            .lookup(path)
            .cloned()
            .unwrap_or_else(|| Arc::new(Node::empty()));
        Self::shared(root, &self.sep)
    }

    /// One sub-tree per item of the sequence at `path`.
    pub fn get_tree_list(&self, path: &str) -> Vec<Tree> {
        let Some(Node::Sequence(items)) = self.non_empty_get(path) else {
            return Vec::new();
        };
        items
            .iter()
            .map(|item| Self::shared(Arc::clone(item), &self.sep))
            .collect()
    }

    /// One sub-tree per entry of the mapping at `path`.
    pub fn get_tree_map(&self, path: &str) -> IndexMap<String, Tree> {
        let Some(Node::Mapping(map)) = self.non_empty_get(path) else {
            return IndexMap::new();
        };
        map.iter()
            .map(|(k, v)| (k.clone(), Self::shared(Arc::clone(v), &self.sep)))
            .collect()
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Write the tree back in the configuration grammar.
    ///
    /// Reading the output back yields an equal tree, except that line breaks
    /// inside sequence items become spaces and text after ` #` inside a value
    /// is lost as a comment. Fails when a mapping key cannot be written so
    /// that it reads back as itself.
    pub fn export(&self) -> crate::error::Result<String> {
        export(&self.root)
    }

    /// Compact JSON of the node at `path`, or `null` if there is none.
    pub fn to_json(&self, path: &str) -> String {
        match self.get(path) {
            Some(node) => encode(node, Format::Json),
            None => "null".to_string(),
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new(Node::empty())
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("sep", &self.sep)
            .field("root", &self.root)
            .finish()
    }
}

impl FromStr for Tree {
    type Err = ParseError;

    /// Parse a source and merge its documents.
    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Ok(merge(&crate::parse(source)?))
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn scalar_int(node: &Node) -> i64 {
    node.as_scalar()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}
