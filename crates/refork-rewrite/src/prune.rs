//! Removes upstream files and directories that do not belong in the fork.

use std::fs;

use tracing::debug;

use crate::REWRITE_TARGET;
use crate::error::RewriteError;
use crate::glob::FileGlob;
use crate::tree::{SourceTree, TreePath};

/// Globs naming files or directories to delete.
#[derive(Debug, Clone)]
pub struct PruneSpec {
    paths: FileGlob,
}

impl PruneSpec {
    /// Creates a prune spec from a glob set.
    #[must_use]
    pub const fn new(paths: FileGlob) -> Self {
        Self { paths }
    }

    /// Globs of the entries to remove.
    #[must_use]
    pub const fn paths(&self) -> &FileGlob {
        &self.paths
    }

    /// Removes every matching entry. A matching directory is removed with its
    /// whole content. Missing entries are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] when the tree cannot be walked or an entry
    /// cannot be removed.
    pub fn apply(&self, tree: &SourceTree) -> Result<Vec<TreePath>, RewriteError> {
        let mut doomed: Vec<(TreePath, bool)> = Vec::new();
        for item in tree.walk() {
            let entry = item?;
            let Some(path) = tree.relative(entry.path()) else {
                continue;
            };
            let inside_doomed = doomed.iter().any(|(parent, is_dir)| {
                *is_dir && path.as_str().starts_with(&format!("{parent}/"))
            });
            if inside_doomed || !self.paths.matches(path.as_str()) {
                continue;
            }
            doomed.push((path, entry.file_type().is_dir()));
        }

        for (path, is_dir) in &doomed {
            let resolved = tree.resolve(path);
            let removed = if *is_dir {
                fs::remove_dir_all(&resolved)
            } else {
                fs::remove_file(&resolved)
            };
            removed.map_err(|error| RewriteError::io(resolved, error))?;
            debug!(target: REWRITE_TARGET, path = %path, "pruned");
        }
        Ok(doomed.into_iter().map(|(path, _)| path).collect())
    }
}
