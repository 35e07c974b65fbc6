//! Inline collections: `key: [a, b]` and `key: {a: 1}`.
//!
//! Inline collections are JSON with bare words allowed. Every bare or
//! single-quoted token between the delimiters `[ ] { } : ,` is rewritten as a
//! JSON string, the result is decoded with `serde_json`, and the JSON value is
//! converted into nodes.
//!
//! The conversion is lossy on purpose: nodes only have text leaves, so JSON
//! numbers, booleans and null become scalars holding their JSON text.
//! Delimiters inside quoted tokens are not protected (`["a,b"]` splits).

use std::sync::Arc;

use serde_json::Value;

use crate::error::{ParseError, Result};
use crate::node::Node;

const DELIMITERS: &[char] = &['[', ']', '{', '}', ':', ','];

/// Decode a bracketed literal into a node.
pub fn decode(text: &str) -> Result<Node> {
    let normalized = normalize(text);
    let value: Value = serde_json::from_str(&normalized)
        .map_err(|e| ParseError::InlineJson(e.to_string(), String::new()))?;
    Ok(from_json(value))
}

/// Rewrite bare and single-quoted tokens as JSON strings.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut rest = text;

    while let Some(idx) = rest.find(DELIMITERS) {
        let token = rest[..idx].trim_matches(' ');
        if !token.is_empty() {
            out.push_str(&quote_token(token));
        }
        out.push_str(&rest[idx..idx + 1]);
        rest = &rest[idx + 1..];
    }

    out.push_str(rest.trim_matches(' '));
    out
}

fn quote_token(token: &str) -> String {
    let len = token.len();
    if len > 1 && token.starts_with('"') && token.ends_with('"') {
        return token.to_string();
    }
    let inner = if len > 1 && token.starts_with('\'') && token.ends_with('\'') {
        token[1..len - 1].replace("\\'", "'")
    } else {
        token.to_string()
    };
    format!("\"{}\"", inner.replace('"', "\\\""))
}

/// Convert a decoded JSON value into a node.
fn from_json(value: Value) -> Node {
    match value {
        Value::Object(map) => Node::Mapping(
            map.into_iter()
                .map(|(k, v)| (k, Arc::new(from_json(v))))
                .collect(),
        ),
        Value::Array(items) => {
            Node::Sequence(items.into_iter().map(|v| Arc::new(from_json(v))).collect())
        }
        Value::String(s) => Node::Scalar(s),
        other => Node::Scalar(other.to_string()),
    }
}
