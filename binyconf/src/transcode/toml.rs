//! TOML transcoding: write yconf nodes as TOML text.
//!
//! Mapping from yconf to TOML:
//!   - Scalar             -> TOML string
//!   - Sequence           -> TOML array (mappings inside become inline tables)
//!   - Mapping            -> TOML table
//!
//! TOML requires the top-level value to be a table, so only mappings can be
//! encoded at the root. Reading TOML is not supported.

use libyconf::Node;
use toml_edit::DocumentMut;

/// Encode a yconf node as a TOML string.
pub fn encode(node: &Node) -> Result<String, String> {
    match node_to_toml(node) {
        toml_edit::Item::Table(table) => {
            let mut doc = DocumentMut::new();
            for (key, value) in table.iter() {
                doc[key] = value.clone();
            }
            Ok(doc.to_string())
        }
        _ => Err(format!(
            "TOML requires the top-level value to be a table, not a {}",
            node.kind()
        )),
    }
}

fn node_to_toml(node: &Node) -> toml_edit::Item {
    match node {
        Node::Mapping(map) => {
            let mut table = toml_edit::Table::new();
            for (k, v) in map {
                table.insert(k, node_to_toml(v));
            }
            toml_edit::Item::Table(table)
        }
        _ => toml_edit::Item::Value(node_to_value(node)),
    }
}

/// Convert a node to an inline TOML value, for array elements.
fn node_to_value(node: &Node) -> toml_edit::Value {
    match node {
        Node::Scalar(s) => toml_edit::Value::String(toml_edit::Formatted::new(s.clone())),
        Node::Sequence(items) => {
            let mut array = toml_edit::Array::new();
            for item in items {
                array.push(node_to_value(item));
            }
            toml_edit::Value::Array(array)
        }
        Node::Mapping(map) => {
            let mut inline = toml_edit::InlineTable::new();
            for (k, v) in map {
                inline.insert(k.as_str(), node_to_value(v));
            }
            toml_edit::Value::InlineTable(inline)
        }
    }
}
