//! Load sessions and include resolution.
//!
//! A session collects every document produced while loading one top-level
//! source, including the documents of the files it includes. Includes are
//! resolved as soon as their line is read, so an included file's documents
//! land in the session before the document that includes it is finished.
//! Merging later lets the includer override what it included.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ParseContext, ParseError, Result};
use crate::node::Document;
use crate::parser;

/// Documents accumulated by one load.
#[derive(Debug, Default)]
pub struct LoadSession {
    documents: Vec<Document>,
    /// Files currently being parsed, outermost first.
    chain: Vec<PathBuf>,
}

impl LoadSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents in merge order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }

    /// The file being parsed right now, if the source came from a file.
    pub fn current_file(&self) -> Option<&Path> {
        self.chain.last().map(PathBuf::as_path)
    }

    pub(crate) fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Parse `source` into this session. `path` names the file it came from
    /// and anchors relative includes.
    pub fn load_source(&mut self, source: &str, path: Option<&Path>) -> Result<()> {
        let ctx = ParseContext::new(path);
        if let Some(path) = path {
            self.chain.push(path.to_path_buf());
        }
        let result = parser::parse_documents(source, &ctx, self);
        if path.is_some() {
            self.chain.pop();
        }
        result
    }

    /// Read and parse a file into this session.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let source = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_source(&source, Some(path))
    }

    /// Resolve an `include` line found at `line_num` of the current source.
    pub(crate) fn include(
        &mut self,
        arg: &str,
        ctx: &ParseContext,
        line_num: usize,
        col: usize,
    ) -> Result<()> {
        let path = self.base_dir().join(arg);
        if self.is_on_chain(&path) {
            return Err(
                ParseError::IncludeCycle(path.display().to_string(), String::new())
                    .with_location(ctx, line_num, col),
            );
        }
        debug!(include = %path.display(), "resolving include");
        let before = self.documents.len();
        self.load_file(&path)?;
        debug!(
            include = %path.display(),
            documents = self.documents.len() - before,
            "include loaded"
        );
        Ok(())
    }

    /// Directory relative includes resolve against.
    fn base_dir(&self) -> PathBuf {
        self.current_file()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    fn is_on_chain(&self, path: &Path) -> bool {
        let Ok(target) = fs::canonicalize(path) else {
            return false;
        };
        self.chain
            .iter()
            .any(|p| fs::canonicalize(p).map_or(false, |p| p == target))
    }
}
