//! Phase 2: Line Lexer
//!
//! The line lexer decides what one logical line is, looking at nothing but
//! its text. Indentation and neighbouring lines are the parser's business.
//!
//! A line is one of:
//! - `Include`: `include <path>`
//! - `Sequence`: `-` or `- <rest>`
//! - `InlineJson`: `[...]` or `{...}`
//! - `Mapping`: `<key>: <rest>` or `<key>:`
//! - `Scalar`: anything else

use std::borrow::Cow;

use crate::error::{ParseError, Result};

/// The syntactic kind of a line, with its payload split out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Path argument of an include directive.
    Include(&'a str),
    /// Text after the list marker, possibly empty.
    Sequence(&'a str),
    /// The whole bracketed literal.
    InlineJson(&'a str),
    /// Key and the text after its colon, possibly empty.
    Mapping { key: &'a str, rest: &'a str },
    /// Scalar text with surrounding quotes removed.
    Scalar(Cow<'a, str>),
}

/// Classify a line of content.
pub fn classify(text: &str) -> Result<LineKind<'_>> {
    if let Some(arg) = text.strip_prefix("include ") {
        let arg = arg.trim_matches(' ');
        if !arg.is_empty() {
            return Ok(LineKind::Include(arg));
        }
    }

    if text == "-" {
        return Ok(LineKind::Sequence(""));
    }
    if let Some(rest) = text.strip_prefix("- ") {
        return Ok(LineKind::Sequence(rest.trim_matches(' ')));
    }

    if text.starts_with('[') {
        return inline_collection(text, '[', ']');
    }
    if text.starts_with('{') {
        return inline_collection(text, '{', '}');
    }

    if text.starts_with('"') || text.starts_with('\'') {
        return Ok(LineKind::Scalar(unquote(text)));
    }

    if let Some(split) = find_key_colon(text) {
        return Ok(LineKind::Mapping {
            key: text[..split].trim_matches(' '),
            rest: text[split + 1..].trim_matches(' '),
        });
    }

    Ok(LineKind::Scalar(unquote(text)))
}

/// Check that a bracketed literal closes on the same line.
fn inline_collection(text: &str, open: char, close: char) -> Result<LineKind<'_>> {
    if text.len() < 2 || !text.ends_with(close) {
        return Err(ParseError::UnclosedBracket(open, String::new()));
    }
    Ok(LineKind::InlineJson(text))
}

/// Find the colon that separates a key from its value.
///
/// The scan stops at the first space, double quote, or colon. A quote means
/// the line is a scalar. A colon splits only when a space or the end of the
/// line follows it, so `http://host` and `12:30` stay scalars. After a space
/// the scan continues to the first such colon, allowing keys with spaces.
fn find_key_colon(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let first = bytes
        .iter()
        .position(|&b| b == b' ' || b == b'"' || b == b':')?;

    match bytes[first] {
        b'"' => None,
        b':' => splits_at(bytes, first).then_some(first),
        _ => {
            for (i, &b) in bytes.iter().enumerate().skip(first) {
                match b {
                    b'"' => return None,
                    b':' if splits_at(bytes, i) => return Some(i),
                    _ => {}
                }
            }
            None
        }
    }
}

/// A colon followed by a space or the end of the line.
fn splits_at(bytes: &[u8], colon: usize) -> bool {
    bytes.get(colon + 1).map_or(true, |&b| b == b' ')
}

/// Strip matching surrounding quotes, collapsing doubled quote characters.
pub fn unquote(text: &str) -> Cow<'_, str> {
    let len = text.len();
    if len >= 2 {
        if text.starts_with('"') && text.ends_with('"') {
            return Cow::Owned(text[1..len - 1].replace("\"\"", "\""));
        }
        if text.starts_with('\'') && text.ends_with('\'') {
            return Cow::Owned(text[1..len - 1].replace("''", "'"));
        }
    }
    Cow::Borrowed(text)
}
