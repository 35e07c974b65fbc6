//! YAML transcoding: convert between yconf nodes and YAML text.
//!
//! Mapping from YAML to yconf:
//!   - YAML null          -> empty mapping (like `key:` with nothing below)
//!   - YAML bool          -> Scalar (`true` / `false`)
//!   - YAML number        -> Scalar (its decimal text)
//!   - YAML string        -> Scalar
//!   - YAML sequence      -> Sequence
//!   - YAML mapping       -> Mapping (scalar keys only)
//!   - YAML tagged value  -> the inner value; the tag is dropped
//!
//! Mapping from yconf to YAML:
//!   - Scalar             -> YAML string
//!   - Sequence           -> YAML sequence
//!   - Mapping            -> YAML mapping, in key order

use libyconf::Node;

/// Decode a YAML string into a yconf node.
pub fn decode(input: &str) -> Result<Node, String> {
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(input).map_err(|e| format!("YAML parse error: {}", e))?;
    yaml_to_node(&yaml_value)
}

/// Encode a yconf node as a YAML string.
pub fn encode(node: &Node) -> Result<String, String> {
    serde_yaml::to_string(&node_to_yaml(node)).map_err(|e| format!("YAML encode error: {}", e))
}

fn yaml_to_node(yaml: &serde_yaml::Value) -> Result<Node, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Node::empty()),
        serde_yaml::Value::Bool(b) => Ok(Node::scalar(b.to_string())),
        serde_yaml::Value::Number(n) => Ok(Node::scalar(n.to_string())),
        serde_yaml::Value::String(s) => Ok(Node::scalar(s.as_str())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Node>, String> = seq.iter().map(yaml_to_node).collect();
            Ok(Node::sequence(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Null => "null".to_string(),
                    _ => return Err(format!("Unsupported YAML mapping key type: {:?}", k)),
                };
                entries.push((key, yaml_to_node(v)?));
            }
            Ok(Node::mapping(entries))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_node(&tagged.value),
    }
}

fn node_to_yaml(node: &Node) -> serde_yaml::Value {
    match node {
        Node::Scalar(s) => serde_yaml::Value::String(s.clone()),
        Node::Sequence(items) => {
            serde_yaml::Value::Sequence(items.iter().map(|n| node_to_yaml(n)).collect())
        }
        Node::Mapping(map) => {
            let mut mapping = serde_yaml::Mapping::new();
            for (k, v) in map {
                mapping.insert(serde_yaml::Value::String(k.clone()), node_to_yaml(v));
            }
            serde_yaml::Value::Mapping(mapping)
        }
    }
}
