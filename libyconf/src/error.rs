//! Error types for yconf parsing.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for yconf parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&Path>) -> Self {
        Self {
            filename: filename.map(|p| p.display().to_string()),
        }
    }

    /// Format a location suffix for error messages.
    pub fn loc_suffix(&self, line: usize, col: usize) -> String {
        match &self.filename {
            Some(name) => format!(" at {}:{} of <{}>", line + 1, col + 1, name),
            None => format!(" at {}:{}", line + 1, col + 1),
        }
    }
}

/// Error type for yconf parsing.
///
/// Every variant is fatal: a load either produces a whole tree or fails.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The main file or an included file could not be read.
    #[error("Cannot read <{}>: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A line is indented deeper than its block allows.
    #[error("Unexpected indent{0}")]
    UnexpectedIndent(String),

    /// An inline collection opened with `[` or `{` never closes.
    #[error("Unclosed \"{0}\"{1}")]
    UnclosedBracket(char, String),

    /// An inline collection could not be decoded.
    #[error("Invalid inline collection ({0}){1}")]
    InlineJson(String, String),

    /// Lines of different kinds share one indentation level.
    #[error("Cannot mix {0} with {1}{2}")]
    MixedKinds(&'static str, &'static str, String),

    /// A file includes itself, directly or through other files.
    #[error("Include cycle through <{0}>{1}")]
    IncludeCycle(String, String),

    /// A mapping key cannot be written in a form that reads back as itself.
    #[error("Cannot export key <{0}>")]
    UnexportableKey(String),
}

impl ParseError {
    /// Create an error with location information.
    ///
    /// Read failures carry their path instead of a location and pass
    /// through unchanged, as do export failures.
    pub fn with_location(self, ctx: &ParseContext, line: usize, col: usize) -> Self {
        let suffix = ctx.loc_suffix(line, col);
        match self {
            ParseError::Io { .. } | ParseError::UnexportableKey(_) => self,
            ParseError::UnexpectedIndent(_) => ParseError::UnexpectedIndent(suffix),
            ParseError::UnclosedBracket(c, _) => ParseError::UnclosedBracket(c, suffix),
            ParseError::InlineJson(msg, _) => ParseError::InlineJson(msg, suffix),
            ParseError::MixedKinds(found, open, _) => ParseError::MixedKinds(found, open, suffix),
            ParseError::IncludeCycle(path, _) => ParseError::IncludeCycle(path, suffix),
        }
    }
}
