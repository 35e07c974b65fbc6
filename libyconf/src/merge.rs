//! Document merging.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::node::{Document, Node};
use crate::tree::Tree;

/// Merge the documents of one load into a single tree.
///
/// Later documents overwrite top-level keys of earlier ones wholesale; nested
/// mappings are replaced, not merged. Documents whose root is not a mapping
/// contribute nothing. The merged tree shares its children with the
/// documents.
pub fn merge(documents: &[Document]) -> Tree {
    let mut merged: IndexMap<String, Arc<Node>> = IndexMap::new();
    for document in documents {
        if let Node::Mapping(map) = document.root() {
            for (key, value) in map {
                merged.insert(key.clone(), Arc::clone(value));
            }
        }
    }
    Tree::new(Node::Mapping(merged))
}
