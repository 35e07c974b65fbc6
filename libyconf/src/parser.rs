//! Phase 3: Node Builder
//!
//! The builder recursively turns scanned lines into nodes. It handles:
//! - Blocks: runs of sibling lines sharing the indent of their first line
//! - Mapping entries and sequence items, with inline or nested values
//! - Inline collections, decoded through the JSON bridge
//! - Literal blocks introduced by `key: |`
//! - Includes, resolved through the load session
//! - Multi-document sources split by `---`

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{ParseContext, ParseError, Result};
use crate::json;
use crate::lexer::{classify, LineKind};
use crate::node::{Document, Node};
use crate::scanner::{Line, LineReader};
use crate::session::LoadSession;

/// Parse every document of `source` into `session`.
pub fn parse_documents(source: &str, ctx: &ParseContext, session: &mut LoadSession) -> Result<()> {
    let mut builder = Builder {
        reader: LineReader::new(source),
        ctx,
        session,
    };

    loop {
        let (node, more) = builder.parse_block(0, None)?;
        let file = builder.session.current_file().map(|p| p.to_path_buf());
        builder.session.push(Document::new(node, file));
        if !more {
            break;
        }
        debug!(file = ?builder.ctx.filename, "document separator");
    }

    // A dedent below the first line's indent leaves lines no block accepts.
    if let Some(line) = builder.reader.peek_line() {
        return Err(builder.error_at(ParseError::UnexpectedIndent(String::new()), &line));
    }
    Ok(())
}

struct Builder<'a, 'c, 's> {
    reader: LineReader<'a>,
    ctx: &'c ParseContext,
    session: &'s mut LoadSession,
}

impl<'a> Builder<'a, '_, '_> {
    /// Parse one block of lines indented at least `min_indent`.
    ///
    /// `initial` is a value already read inline on the parent line; deeper
    /// lines extend it. Returns the node and whether a `---` separator ended
    /// the block.
    fn parse_block(&mut self, min_indent: usize, initial: Option<Node>) -> Result<(Node, bool)> {
        let mut block = Block::from_initial(initial);
        let mut baseline: Option<usize> = None;
        let mut more = false;

        loop {
            // A separator ends the document whatever the block's baseline.
            if min_indent == 0 && self.at_separator() {
                self.reader.next_line(0);
                more = true;
                break;
            }
            let Some(line) = self.reader.next_line(baseline.unwrap_or(min_indent)) else {
                break;
            };

            let base = *baseline.get_or_insert(line.indent);
            if line.indent > base {
                return Err(self.error_at(ParseError::UnexpectedIndent(String::new()), &line));
            }

            self.parse_line(&mut block, &line)?;
        }

        Ok((block.into_node(), more))
    }

    /// Add one line to the block being built.
    fn parse_line(&mut self, block: &mut Block, line: &Line<'a>) -> Result<()> {
        let kind = classify(line.content).map_err(|e| self.error_at(e, line))?;

        let added = match kind {
            LineKind::Include(arg) => {
                return self
                    .session
                    .include(arg, self.ctx, line.line_num, line.col);
            }
            LineKind::Sequence(rest) => {
                let item = self.parse_value(rest, line, false)?;
                block.add_item(item)
            }
            LineKind::Mapping { key, rest } => {
                let value = self.parse_entry_value(rest, line, false)?;
                block.add_entry(key, value)
            }
            LineKind::InlineJson(text) => {
                let node = json::decode(text).map_err(|e| self.error_at(e, line))?;
                block.set_inline(node)
            }
            LineKind::Scalar(text) => block.add_scalar(&text),
        };

        added.map_err(|e| self.error_at(e, line))
    }

    /// Value of a mapping entry: a literal block or an ordinary value.
    fn parse_entry_value(&mut self, rest: &'a str, line: &Line<'a>, nested: bool) -> Result<Node> {
        if rest == "|" {
            return Ok(self.parse_literal(line));
        }
        self.parse_value(rest, line, nested)
    }

    /// Resolve the value after a `key:` or `-` marker on `line`.
    ///
    /// An empty remainder takes its value from the deeper lines. Otherwise the
    /// remainder is classified like a line of its own; what it yields may
    /// still be extended by deeper lines, except for inline collections and
    /// for scalars nested inside another inline marker (`- a: 1`).
    fn parse_value(&mut self, rest: &'a str, line: &Line<'a>, nested: bool) -> Result<Node> {
        if rest.is_empty() {
            return Ok(self.parse_block(line.indent + 1, None)?.0);
        }

        let inline = match classify(rest).map_err(|e| self.error_at(e, line))? {
            LineKind::InlineJson(text) => {
                return json::decode(text).map_err(|e| self.error_at(e, line));
            }
            // Includes are only honored at the start of a line.
            LineKind::Include(_) => Node::scalar(rest),
            LineKind::Scalar(text) => Node::Scalar(text.into_owned()),
            LineKind::Mapping { key, rest } => {
                let value = self.parse_entry_value(rest, line, true)?;
                Node::Mapping(IndexMap::from([(key.to_string(), Arc::new(value))]))
            }
            LineKind::Sequence(rest) => {
                let item = self.parse_value(rest, line, true)?;
                Node::Sequence(vec![Arc::new(item)])
            }
        };

        if nested && matches!(inline, Node::Scalar(_)) {
            return Ok(inline);
        }
        Ok(self.parse_block(line.indent + 1, Some(inline))?.0)
    }

    /// Collect the raw lines of a `|` block into one scalar.
    fn parse_literal(&mut self, line: &Line<'a>) -> Node {
        let mut lines = Vec::new();
        while let Some(text) = self.reader.next_literal(line.indent + 1) {
            lines.push(text);
        }
        Node::Scalar(lines.join("\n"))
    }

    fn at_separator(&mut self) -> bool {
        matches!(self.reader.peek_line(), Some(line) if line.indent == 0 && line.content == "---")
    }

    fn error_at(&self, err: ParseError, line: &Line<'_>) -> ParseError {
        err.with_location(self.ctx, line.line_num, line.col)
    }
}

// ============================================================================
// Block Accumulation
// ============================================================================

/// The node a block has built so far.
enum Block {
    /// Nothing read yet.
    Empty,
    /// A scalar read inline on the parent line. Deeper mapping or sequence
    /// lines replace it; deeper scalar lines continue it.
    Lookahead(String),
    Scalar(String),
    Sequence(Vec<Arc<Node>>),
    Mapping(IndexMap<String, Arc<Node>>),
    /// An inline collection standing alone as the block's value.
    Inline(Node),
}

impl Block {
    fn from_initial(initial: Option<Node>) -> Self {
        match initial {
            None => Block::Empty,
            Some(Node::Scalar(s)) => Block::Lookahead(s),
            Some(Node::Sequence(items)) => Block::Sequence(items),
            Some(Node::Mapping(map)) => Block::Mapping(map),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Block::Empty => "nothing",
            Block::Lookahead(_) | Block::Scalar(_) => "scalar",
            Block::Sequence(_) => "sequence",
            Block::Mapping(_) => "mapping",
            Block::Inline(_) => "inline collection",
        }
    }

    fn mixed(&self, found: &'static str) -> ParseError {
        ParseError::MixedKinds(found, self.kind(), String::new())
    }

    fn add_scalar(&mut self, text: &str) -> Result<()> {
        match self {
            Block::Empty => *self = Block::Scalar(text.to_string()),
            Block::Lookahead(s) => {
                let joined = format!("{} {}", s, text);
                *self = Block::Scalar(joined);
            }
            Block::Scalar(s) => {
                s.push(' ');
                s.push_str(text);
            }
            _ => return Err(self.mixed("scalar")),
        }
        Ok(())
    }

    fn add_item(&mut self, item: Node) -> Result<()> {
        match self {
            Block::Empty | Block::Lookahead(_) => *self = Block::Sequence(vec![Arc::new(item)]),
            Block::Sequence(items) => items.push(Arc::new(item)),
            _ => return Err(self.mixed("sequence")),
        }
        Ok(())
    }

    fn add_entry(&mut self, key: &str, value: Node) -> Result<()> {
        match self {
            Block::Empty | Block::Lookahead(_) => {
                *self = Block::Mapping(IndexMap::from([(key.to_string(), Arc::new(value))]));
            }
            Block::Mapping(map) => {
                map.insert(key.to_string(), Arc::new(value));
            }
            _ => return Err(self.mixed("mapping")),
        }
        Ok(())
    }

    fn set_inline(&mut self, node: Node) -> Result<()> {
        match self {
            Block::Empty | Block::Lookahead(_) => *self = Block::Inline(node),
            _ => return Err(self.mixed("inline collection")),
        }
        Ok(())
    }

    fn into_node(self) -> Node {
        match self {
            Block::Empty => Node::empty(),
            Block::Lookahead(s) | Block::Scalar(s) => Node::Scalar(s),
            Block::Sequence(items) => Node::Sequence(items),
            Block::Mapping(map) => Node::Mapping(map),
            Block::Inline(node) => node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(source: &str) -> Node {
        let mut session = LoadSession::new();
        parse_documents(source, &ParseContext::new(None), &mut session).unwrap();
        let docs = session.into_documents();
        assert_eq!(docs.len(), 1);
        docs[0].root().clone()
    }

    fn parse_err(source: &str) -> ParseError {
        let mut session = LoadSession::new();
        parse_documents(source, &ParseContext::new(None), &mut session).unwrap_err()
    }

    fn s(text: &str) -> Node {
        Node::from(text)
    }

    #[test]
    fn test_flat_mapping() {
        assert_eq!(
            parse_one("host: local\nport: 8000"),
            Node::mapping([("host", s("local")), ("port", s("8000"))])
        );
    }

    #[test]
    fn test_nested_mapping() {
        let node = parse_one("db:\n  host: local\n  pool:\n    size: 4\nname: app");
        let expected = Node::mapping([
            (
                "db",
                Node::mapping([
                    ("host", s("local")),
                    ("pool", Node::mapping([("size", s("4"))])),
                ]),
            ),
            ("name", s("app")),
        ]);
        assert_eq!(node, expected);
    }

    #[test]
    fn test_block_and_inline_sequences_agree() {
        let block = parse_one("key:\n  - 1\n  - 2\n  - 3");
        let inline = parse_one("key: [1, 2, 3]");
        let expected = Node::mapping([("key", Node::sequence([s("1"), s("2"), s("3")]))]);
        assert_eq!(block, expected);
        assert_eq!(inline, expected);
    }

    #[test]
    fn test_sequence_of_mappings() {
        let node = parse_one("servers:\n  - name: a\n    port: 1\n  - name: b\n    port: 2");
        let expected = Node::mapping([(
            "servers",
            Node::sequence([
                Node::mapping([("name", s("a")), ("port", s("1"))]),
                Node::mapping([("name", s("b")), ("port", s("2"))]),
            ]),
        )]);
        assert_eq!(node, expected);
    }

    #[test]
    fn test_sequence_at_key_indent() {
        // Dashes sit one column deeper than their own indent.
        let node = parse_one("list:\n- a\n- b");
        assert_eq!(
            node,
            Node::mapping([("list", Node::sequence([s("a"), s("b")]))])
        );
    }

    #[test]
    fn test_dash_with_nested_block() {
        let node = parse_one("-\n  a: 1\n-\n  - x");
        let expected = Node::sequence([
            Node::mapping([("a", s("1"))]),
            Node::sequence([s("x")]),
        ]);
        assert_eq!(node, expected);
    }

    #[test]
    fn test_nested_inline_markers() {
        let node = parse_one("- - a\n  - b\n- k: v: w");
        let expected = Node::sequence([
            Node::sequence([s("a"), s("b")]),
            Node::mapping([("k", Node::mapping([("v", s("w"))]))]),
        ]);
        assert_eq!(node, expected);
    }

    #[test]
    fn test_url_value() {
        assert_eq!(
            parse_one("url: http://example.com"),
            Node::mapping([("url", s("http://example.com"))])
        );
    }

    #[test]
    fn test_quoted_scalar() {
        assert_eq!(
            parse_one(r#"name: "He said ""hi""""#),
            Node::mapping([("name", s("He said \"hi\""))])
        );
        assert_eq!(
            parse_one("- 'it''s'"),
            Node::sequence([s("it's")])
        );
    }

    #[test]
    fn test_literal_block() {
        let node = parse_one("text: |\n  line one\n  line two\nnext: 1");
        assert_eq!(
            node,
            Node::mapping([("text", s("line one\nline two")), ("next", s("1"))])
        );
    }

    #[test]
    fn test_literal_block_ends_at_blank_line() {
        let node = parse_one("a:\n  text: |\n    x: 1 # raw\n\n  b: 2");
        let expected = Node::mapping([(
            "a",
            Node::mapping([("text", s("x: 1 # raw")), ("b", s("2"))]),
        )]);
        assert_eq!(node, expected);
    }

    #[test]
    fn test_scalar_continuation() {
        assert_eq!(
            parse_one("msg: a long\n  value here\n  continues"),
            Node::mapping([("msg", s("a long value here continues"))])
        );
        assert_eq!(parse_one("just\nwords"), s("just words"));
    }

    #[test]
    fn test_deeper_block_replaces_inline_scalar() {
        assert_eq!(
            parse_one("key: stray\n  a: 1"),
            Node::mapping([("key", Node::mapping([("a", s("1"))]))])
        );
    }

    #[test]
    fn test_empty_value_is_empty_mapping() {
        assert_eq!(
            parse_one("a:\nb: 1"),
            Node::mapping([("a", Node::empty()), ("b", s("1"))])
        );
        assert_eq!(parse_one(""), Node::empty());
        assert_eq!(parse_one("# only a comment"), Node::empty());
    }

    #[test]
    fn test_inline_json_block() {
        assert_eq!(
            parse_one("{a: 1}"),
            Node::mapping([("a", s("1"))])
        );
    }

    #[test]
    fn test_documents() {
        let mut session = LoadSession::new();
        parse_documents("a: 1\n---\na: 2\nb: 3\n---\n", &ParseContext::new(None), &mut session)
            .unwrap();
        let docs = session.into_documents();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[1].root(), &Node::mapping([("a", s("2")), ("b", s("3"))]));
        assert_eq!(docs[2].root(), &Node::empty());
    }

    #[test]
    fn test_separator_after_indented_document() {
        let parse_all = |source: &str| {
            let mut session = LoadSession::new();
            parse_documents(source, &ParseContext::new(None), &mut session).unwrap();
            session
                .into_documents()
                .into_iter()
                .map(|d| d.root().clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(
            parse_all("- a\n---\nkey: v\n"),
            [Node::sequence([s("a")]), Node::mapping([("key", s("v"))])]
        );
        assert_eq!(
            parse_all("  a: 1\n---\nb: 2\n"),
            [Node::mapping([("a", s("1"))]), Node::mapping([("b", s("2"))])]
        );
        assert_eq!(
            parse_all("list:\n  - x\n---\n- y\n---\n  c: 3\n"),
            [
                Node::mapping([("list", Node::sequence([s("x")]))]),
                Node::sequence([s("y")]),
                Node::mapping([("c", s("3"))]),
            ]
        );
    }

    #[test]
    fn test_indented_separator_is_content() {
        // Only a separator at column 0 splits documents.
        assert_eq!(
            parse_err("a:\n  b: 1\n  ---\n").to_string(),
            "Cannot mix scalar with mapping at 3:3"
        );
    }

    #[test]
    fn test_mixed_kinds() {
        assert_eq!(
            parse_err("a: 1\nword").to_string(),
            "Cannot mix scalar with mapping at 2:1"
        );
        assert_eq!(
            parse_err("- a\n b: 1").to_string(),
            "Cannot mix mapping with sequence at 2:2"
        );
        assert_eq!(
            parse_err("a: 1\n[x]").to_string(),
            "Cannot mix inline collection with mapping at 2:1"
        );
        assert_eq!(
            parse_err("word\nb: 1").to_string(),
            "Cannot mix mapping with scalar at 2:1"
        );
    }

    #[test]
    fn test_unexpected_indent() {
        assert_eq!(
            parse_err("a: [1]\n  b: 2").to_string(),
            "Unexpected indent at 2:3"
        );
        assert_eq!(
            parse_err("  a: 1\nb: 2").to_string(),
            "Unexpected indent at 2:1"
        );
    }

    #[test]
    fn test_unclosed_bracket() {
        assert_eq!(
            parse_err("list: [a, b").to_string(),
            "Unclosed \"[\" at 1:1"
        );
    }
}
