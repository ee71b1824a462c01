//! Renames files whose names carry the upstream project marker.

use std::collections::BTreeSet;
use std::fs;

use tracing::debug;

use crate::REWRITE_TARGET;
use crate::error::RewriteError;
use crate::glob::FileGlob;
use crate::tree::{SourceTree, TreePath};

/// Moves selected files to a name with the first `from` token replaced by
/// `to`. Only the final path component is edited; files stay in their
/// directory.
#[derive(Debug, Clone)]
pub struct RenameSpec {
    files: FileGlob,
    from: String,
    to: String,
}

impl RenameSpec {
    /// Creates a rename spec.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidPattern`] when `from_token` is empty.
    pub fn new(
        files: FileGlob,
        from_token: impl Into<String>,
        to_token: impl Into<String>,
    ) -> Result<Self, RewriteError> {
        let from = from_token.into();
        if from.is_empty() {
            return Err(RewriteError::invalid_pattern(from, "rename token is empty"));
        }
        Ok(Self {
            files,
            from,
            to: to_token.into(),
        })
    }

    /// Files considered for renaming.
    #[must_use]
    pub const fn files(&self) -> &FileGlob {
        &self.files
    }

    /// Token removed from file names.
    #[must_use]
    pub fn from_token(&self) -> &str {
        &self.from
    }

    /// Token inserted in its place.
    #[must_use]
    pub fn to_token(&self) -> &str {
        &self.to
    }

    /// Plans every move without touching the tree.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::RenameCollision`] when a destination exists or
    /// two files would land on the same name, and [`RewriteError::Io`] when
    /// the tree cannot be listed.
    pub fn plan(&self, tree: &SourceTree) -> Result<Vec<(TreePath, TreePath)>, RewriteError> {
        let mut moves = Vec::new();
        let mut claimed = BTreeSet::new();
        for source in tree.select(&self.files)? {
            let name = source.file_name();
            if !name.contains(self.from.as_str()) {
                continue;
            }
            let target = source.with_file_name(&name.replacen(self.from.as_str(), &self.to, 1));
            if target == source {
                continue;
            }
            if tree.exists(&target) || !claimed.insert(target.clone()) {
                return Err(RewriteError::RenameCollision {
                    from: tree.resolve(&source),
                    to: tree.resolve(&target),
                });
            }
            moves.push((source, target));
        }
        Ok(moves)
    }

    /// Renames the selected files.
    ///
    /// Every destination is checked before the first move, so a collision
    /// leaves the tree untouched.
    ///
    /// # Errors
    ///
    /// See [`RenameSpec::plan`]; additionally returns [`RewriteError::Io`]
    /// when a move fails.
    pub fn apply(&self, tree: &SourceTree) -> Result<Vec<(TreePath, TreePath)>, RewriteError> {
        let moves = self.plan(tree)?;
        for (source, target) in &moves {
            let from = tree.resolve(source);
            fs::rename(&from, tree.resolve(target)).map_err(|error| RewriteError::io(from, error))?;
            debug!(
                target: REWRITE_TARGET,
                from = %source,
                to = %target,
                "renamed file"
            );
        }
        Ok(moves)
    }
}
