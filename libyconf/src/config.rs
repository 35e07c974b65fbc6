//! Opening configuration files for an application.
//!
//! [`Config`] is a tree loaded once from a file. [`SharedConfig`] holds the
//! current tree of a file that may be reloaded while readers are active:
//! reloading builds a whole new tree and swaps it in, so a reader holding the
//! previous `Arc<Tree>` keeps a consistent view until it lets go.

use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::{ParseError, Result};
use crate::merge::merge;
use crate::tree::Tree;

/// A configuration tree and the file it came from.
#[derive(Debug, Clone)]
pub struct Config {
    tree: Tree,
    path: PathBuf,
}

impl Config {
    /// Load and merge the file at `path` and everything it includes.
    pub fn open(path: impl AsRef<Path>) -> Result<Config> {
        let path = resolve(path.as_ref())?;
        let tree = load(&path)?;
        info!(path = %path.display(), "config loaded");
        Ok(Config { tree, path })
    }

    /// Canonical path of the loaded file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }
}

impl Deref for Config {
    type Target = Tree;

    fn deref(&self) -> &Tree {
        &self.tree
    }
}

/// A reloadable configuration shared between threads.
#[derive(Debug)]
pub struct SharedConfig {
    path: PathBuf,
    current: RwLock<Arc<Tree>>,
}

impl SharedConfig {
    pub fn open(path: impl AsRef<Path>) -> Result<SharedConfig> {
        let Config { tree, path } = Config::open(path)?;
        Ok(SharedConfig {
            path,
            current: RwLock::new(Arc::new(tree)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The tree as of the last successful load.
    pub fn current(&self) -> Arc<Tree> {
        Arc::clone(&self.current.read())
    }

    /// Load the file again and swap the new tree in.
    ///
    /// On failure the current tree stays in place and the error is returned.
    pub fn reload(&self) -> Result<()> {
        match load(&self.path) {
            Ok(tree) => {
                *self.current.write() = Arc::new(tree);
                info!(path = %self.path.display(), "config reloaded");
                Ok(())
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "config reload failed, keeping previous");
                Err(err)
            }
        }
    }
}

fn resolve(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load(path: &Path) -> Result<Tree> {
    Ok(merge(&crate::load_file(path)?))
}
