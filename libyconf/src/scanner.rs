//! Phase 1: Scanner
//!
//! The scanner splits source text into raw lines and hands them to the
//! parser one logical line at a time. It performs:
//! - Indentation counting (a leading list marker counts one extra column)
//! - Comment filtering (whole-line `#` and trailing ` #`)
//! - Blank line skipping
//!
//! Comment stripping is a byte scan, not quote-aware: `a: "x #y"` loses
//! everything from ` #` on.
//!
//! The reader only advances past a line once a caller accepts it, so a line
//! read ahead with too little indent stays in place for the enclosing block.

/// A single logical line after scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// Content without indent, comment, or flanking spaces.
    pub content: &'a str,
    /// Leading spaces, plus one when the line opens with a list marker.
    pub indent: usize,
    /// Number of leading spaces, used for error columns.
    pub col: usize,
    /// Zero-based line number for error reporting.
    pub line_num: usize,
}

/// Cursor over the lines of one source text.
pub struct LineReader<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineReader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().collect(),
            pos: 0,
        }
    }

    /// Take the next logical line if it is indented at least `min_indent`.
    ///
    /// A shallower line is left unconsumed and `None` is returned.
    pub fn next_line(&mut self, min_indent: usize) -> Option<Line<'a>> {
        let line = self.peek_line()?;
        if line.indent < min_indent {
            return None;
        }
        self.pos = line.line_num + 1;
        Some(line)
    }

    /// The next logical line, without consuming it.
    pub fn peek_line(&mut self) -> Option<Line<'a>> {
        while let Some(raw) = self.lines.get(self.pos) {
            if let Some(line) = scan_line(raw, self.pos) {
                return Some(line);
            }
            self.pos += 1;
        }
        None
    }

    /// Take one raw line of a literal block.
    ///
    /// A blank line is consumed and ends the block; a line with fewer than
    /// `min_indent` leading spaces ends it without being consumed.
    pub fn next_literal(&mut self, min_indent: usize) -> Option<&'a str> {
        let raw = *self.lines.get(self.pos)?;
        let text = raw.trim_matches(' ');
        if text.is_empty() {
            self.pos += 1;
            return None;
        }
        if count_indent(raw) < min_indent {
            return None;
        }
        self.pos += 1;
        Some(text)
    }
}

/// Turn one raw line into a logical line, or `None` for blanks and comments.
fn scan_line(raw: &str, line_num: usize) -> Option<Line<'_>> {
    let col = count_indent(raw);
    let rest = &raw[col..];

    let content = rest.trim_end_matches(' ');
    if content.is_empty() || content.starts_with('#') {
        return None;
    }

    let content = match content.find(" #") {
        Some(idx) => content[..idx].trim_end_matches(' '),
        None => content,
    };

    Some(Line {
        content,
        indent: col + usize::from(is_list_marker(rest)),
        col,
        line_num,
    })
}

/// Count the number of leading spaces in a line.
fn count_indent(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}

/// A "-" followed by a space or the end of the line.
fn is_list_marker(rest: &str) -> bool {
    rest == "-" || rest.starts_with("- ")
}
