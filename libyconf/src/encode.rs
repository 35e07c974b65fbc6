//! Encode nodes back to text.
//!
//! Two outputs are supported: the configuration grammar itself (export) and
//! JSON. JSON goes through `serde_json::Value`, which the CLI transcoders
//! share.

use serde_json::Value;

use crate::error::{ParseError, Result};
use crate::json;
use crate::lexer::{classify, LineKind};
use crate::node::Node;
use std::borrow::Cow;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON on one line
    Json,
    /// JSON, indented
    JsonPretty,
}

/// Write a node in the configuration grammar.
///
/// A mapping with a key that would not read back as itself is written as an
/// inline collection. When that would not read back either, export fails
/// with [`ParseError::UnexportableKey`].
pub fn export(node: &Node) -> Result<String> {
    let mut out = String::new();
    encode_conf(&mut out, node, 0)?;
    Ok(out)
}

/// Encode a node to a string in the specified format.
pub fn encode(node: &Node, format: Format) -> String {
    match format {
        Format::Json => to_value(node).to_string(),
        Format::JsonPretty => {
            // Serializing a `Value` cannot fail.
            serde_json::to_string_pretty(&to_value(node)).unwrap_or_default()
        }
    }
}

/// Convert a node to a JSON value. Scalars always become strings.
pub fn to_value(node: &Node) -> Value {
    match node {
        Node::Scalar(s) => Value::String(s.clone()),
        Node::Sequence(items) => Value::Array(items.iter().map(|n| to_value(n)).collect()),
        Node::Mapping(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_value(v)))
                .collect(),
        ),
    }
}

// =============================================================================
// Conf Encoder
// =============================================================================

fn encode_conf(out: &mut String, node: &Node, depth: usize) -> Result<()> {
    let pad = "  ".repeat(depth);

    if let Some(text) = inline_mapping(node)? {
        push_line(out, &pad, &text);
        return Ok(());
    }
    match node {
        Node::Mapping(map) if map.is_empty() => push_line(out, &pad, "{}"),
        Node::Sequence(items) if items.is_empty() => push_line(out, &pad, "[]"),
        Node::Mapping(map) => {
            for (key, value) in map {
                encode_conf_entry(out, &pad, key, value, depth)?;
            }
        }
        Node::Sequence(items) => {
            for item in items {
                encode_conf_item(out, &pad, item, depth)?;
            }
        }
        Node::Scalar(s) => push_line(out, &pad, &encode_conf_scalar(s)),
    }
    Ok(())
}

fn encode_conf_entry(
    out: &mut String,
    pad: &str,
    key: &str,
    value: &Node,
    depth: usize,
) -> Result<()> {
    if let Some(text) = inline_mapping(value)? {
        push_line(out, pad, &format!("{}: {}", key, text));
        return Ok(());
    }
    match value {
        Node::Scalar(s) if can_write_literal(s) => {
            push_line(out, pad, &format!("{}: |", key));
            let inner = format!("{}  ", pad);
            for line in s.split('\n') {
                push_line(out, &inner, line);
            }
        }
        Node::Scalar(s) => push_line(out, pad, &format!("{}: {}", key, encode_conf_scalar(s))),
        Node::Mapping(map) if map.is_empty() => push_line(out, pad, &format!("{}: {{}}", key)),
        Node::Sequence(items) if items.is_empty() => {
            push_line(out, pad, &format!("{}: []", key))
        }
        _ => {
            push_line(out, pad, &format!("{}:", key));
            encode_conf(out, value, depth + 1)?;
        }
    }
    Ok(())
}

fn encode_conf_item(out: &mut String, pad: &str, item: &Node, depth: usize) -> Result<()> {
    if let Some(text) = inline_mapping(item)? {
        push_line(out, pad, &format!("- {}", text));
        return Ok(());
    }
    match item {
        Node::Scalar(s) => push_line(out, pad, &format!("- {}", encode_conf_scalar(s))),
        Node::Mapping(map) if map.is_empty() => push_line(out, pad, "- {}"),
        Node::Sequence(items) if items.is_empty() => push_line(out, pad, "- []"),
        _ => {
            push_line(out, pad, "-");
            encode_conf(out, item, depth + 1)?;
        }
    }
    Ok(())
}

/// The inline form of a mapping whose keys cannot be written as `key: ...`
/// lines, or `None` when block form works.
fn inline_mapping(node: &Node) -> Result<Option<String>> {
    let Node::Mapping(map) = node else {
        return Ok(None);
    };
    let Some(key) = map.keys().find(|key| !is_plain_key(key)) else {
        return Ok(None);
    };

    let text = to_value(node).to_string();
    let reads_back = !text.contains(" #") && json::decode(&text).ok().as_ref() == Some(node);
    if reads_back {
        Ok(Some(text))
    } else {
        Err(ParseError::UnexportableKey(key.clone()))
    }
}

fn push_line(out: &mut String, pad: &str, text: &str) {
    out.push_str(pad);
    out.push_str(text);
    out.push('\n');
}

/// Write a scalar so it reads back as the same text.
///
/// Line breaks outside literal blocks cannot be expressed; they are written
/// as spaces.
fn encode_conf_scalar(s: &str) -> String {
    let s = s.replace('\n', " ");
    if is_plain(&s) {
        s
    } else {
        format!("\"{}\"", s.replace('"', "\"\""))
    }
}

/// A scalar that classifies as itself when read back unquoted.
fn is_plain(s: &str) -> bool {
    if s.is_empty()
        || s.trim_matches(' ') != s
        || s.starts_with('#')
        || s.contains(" #")
        || s == "|"
        || s == "---"
    {
        return false;
    }
    matches!(classify(s), Ok(LineKind::Scalar(Cow::Borrowed(text))) if text == s)
}

/// A key that reads back as itself from a `key: value` line.
fn is_plain_key(key: &str) -> bool {
    if key.is_empty()
        || key.trim_matches(' ') != key
        || key.starts_with('#')
        || key.contains(" #")
        || key.contains(['\n', '\r'])
    {
        return false;
    }
    let line = format!("{}: x", key);
    matches!(classify(&line), Ok(LineKind::Mapping { key: read, .. }) if read == key)
}

/// Multi-line text whose lines survive the literal block reader.
fn can_write_literal(s: &str) -> bool {
    s.contains('\n')
        && s
            .split('\n')
            .all(|line| !line.is_empty() && line.trim_matches(' ') == line && !line.contains('\r'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Node {
        Node::from(text)
    }

    #[test]
    fn test_export_mapping() {
        let node = Node::mapping([
            ("name", s("app")),
            (
                "db",
                Node::mapping([("host", s("local")), ("ports", Node::sequence([s("1"), s("2")]))]),
            ),
        ]);
        assert_eq!(
            export(&node).unwrap(),
            "name: app\ndb:\n  host: local\n  ports:\n    - 1\n    - 2\n"
        );
    }

    #[test]
    fn test_export_nested_items() {
        let node = Node::sequence([
            Node::mapping([("a", s("1")), ("b", s("2"))]),
            Node::sequence([s("x")]),
            Node::empty(),
            Node::sequence(Vec::new()),
        ]);
        assert_eq!(
            export(&node).unwrap(),
            "-\n  a: 1\n  b: 2\n-\n  - x\n- {}\n- []\n"
        );
    }

    #[test]
    fn test_export_empty_collections() {
        assert_eq!(export(&Node::empty()).unwrap(), "{}\n");
        let node = Node::mapping([("a", Node::empty()), ("b", Node::sequence(Vec::new()))]);
        assert_eq!(export(&node).unwrap(), "a: {}\nb: []\n");
    }

    #[test]
    fn test_export_literal() {
        let node = Node::mapping([("text", s("line one\nline two"))]);
        assert_eq!(
            export(&node).unwrap(),
            "text: |\n  line one\n  line two\n"
        );

        // A blank line would end the block early.
        let node = Node::mapping([("text", s("a\n\nb"))]);
        assert_eq!(export(&node).unwrap(), "text: a  b\n");
    }

    #[test]
    fn test_is_plain_key() {
        assert!(is_plain_key("name"));
        assert!(is_plain_key("two words"));
        assert!(is_plain_key("-"));
        assert!(!is_plain_key("- x"));
        assert!(!is_plain_key("#y"));
        assert!(!is_plain_key("a: b"));
        assert!(!is_plain_key("say \"hi\""));
        assert!(!is_plain_key("include x"));
        assert!(!is_plain_key("[x]"));
        assert!(!is_plain_key(""));
        assert!(!is_plain_key(" padded"));
    }

    #[test]
    fn test_export_unreadable_keys_inline() {
        let node = Node::mapping([(
            "m",
            Node::mapping([("- x", s("1")), ("#y", s("2"))]),
        )]);
        assert_eq!(export(&node).unwrap(), "m: {\"- x\":\"1\",\"#y\":\"2\"}\n");

        let node = Node::sequence([Node::mapping([("say \"hi\"", s("1"))])]);
        assert_eq!(export(&node).unwrap(), "- {\"say \\\"hi\\\"\":\"1\"}\n");

        let node = Node::mapping([("include x", s("1"))]);
        assert_eq!(export(&node).unwrap(), "{\"include x\":\"1\"}\n");
    }

    #[test]
    fn test_export_unexportable_key() {
        let node = Node::mapping([("ok", Node::mapping([("a, b: c", s("1"))]))]);
        let err = export(&node).unwrap_err();
        assert!(matches!(err, ParseError::UnexportableKey(ref key) if key == "a, b: c"));
        assert_eq!(err.to_string(), "Cannot export key <a, b: c>");
    }

    #[test]
    fn test_scalar_quoting() {
        assert_eq!(encode_conf_scalar("plain"), "plain");
        assert_eq!(encode_conf_scalar("http://x.y"), "http://x.y");
        assert_eq!(encode_conf_scalar(""), "\"\"");
        assert_eq!(encode_conf_scalar("a: b"), "\"a: b\"");
        assert_eq!(encode_conf_scalar("- x"), "\"- x\"");
        assert_eq!(encode_conf_scalar("[x]"), "\"[x]\"");
        assert_eq!(encode_conf_scalar("say \"hi\""), "say \"hi\"");
        assert_eq!(encode_conf_scalar("\"hi\""), "\"\"\"hi\"\"\"");
        assert_eq!(encode_conf_scalar("'x'"), "\"'x'\"");
        assert_eq!(encode_conf_scalar(" padded "), "\" padded \"");
        assert_eq!(encode_conf_scalar("include x"), "\"include x\"");
        assert_eq!(encode_conf_scalar("|"), "\"|\"");
        assert_eq!(encode_conf_scalar("---"), "\"---\"");
    }

    #[test]
    fn test_json() {
        let node = Node::mapping([
            ("b", Node::sequence([s("1"), s("true")])),
            ("a", Node::empty()),
        ]);
        assert_eq!(encode(&node, Format::Json), r#"{"b":["1","true"],"a":{}}"#);
        assert_eq!(
            encode(&Node::sequence([s("x")]), Format::JsonPretty),
            "[\n  \"x\"\n]"
        );
    }
}
