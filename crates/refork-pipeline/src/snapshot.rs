//! Copies the upstream snapshot into the working directory.
//!
//! Every regular file is copied with the license header prepended and its
//! permission bits preserved. A symbolic link is copied as the content it
//! points at. Dot entries at any depth are skipped, and so is anything that
//! is neither a file, a directory nor a link.

use std::fs;
use std::path::Path;

use refork_rewrite::visible_entries;
use tracing::debug;

use crate::PIPELINE_TARGET;
use crate::error::PipelineError;

/// Loads an upstream tree, stamping each file with a fixed header.
#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    header: String,
}

impl SnapshotLoader {
    /// Creates a loader that prepends `header` to every file.
    #[must_use]
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }

    /// Copies `upstream` into `destination`, returning the number of files.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Rewrite`] when the upstream tree cannot be
    /// walked, and [`PipelineError::Io`] when a file cannot be read, written
    /// or have its permissions set. A link to a directory or a dangling link
    /// cannot be read.
    pub fn load(&self, upstream: &Path, destination: &Path) -> Result<usize, PipelineError> {
        let mut copied = 0_usize;

        for item in visible_entries(upstream) {
            let entry = item?;
            let Ok(relative) = entry.path().strip_prefix(upstream) else {
                continue;
            };
            let target = destination.join(relative);
            let file_type = entry.file_type();
            if file_type.is_dir() {
                fs::create_dir_all(&target).map_err(|source| PipelineError::io(&target, source))?;
                continue;
            }
            if !file_type.is_file() && !file_type.is_symlink() {
                debug!(
                    target: PIPELINE_TARGET,
                    path = %entry.path().display(),
                    "skipping entry that is not a regular file"
                );
                continue;
            }
            self.copy_file(entry.path(), &target)?;
            copied = copied.saturating_add(1);
        }

        debug!(
            target: PIPELINE_TARGET,
            files = copied,
            from = %upstream.display(),
            "loaded upstream snapshot"
        );
        Ok(copied)
    }

    fn copy_file(&self, source_path: &Path, target: &Path) -> Result<(), PipelineError> {
        let content = fs::read(source_path).map_err(|error| PipelineError::io(source_path, error))?;
        let permissions = fs::metadata(source_path)
            .map_err(|error| PipelineError::io(source_path, error))?
            .permissions();

        let mut stamped = Vec::with_capacity(self.header.len() + content.len());
        stamped.extend_from_slice(self.header.as_bytes());
        stamped.extend_from_slice(&content);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|error| PipelineError::io(parent, error))?;
        }
        fs::write(target, stamped).map_err(|error| PipelineError::io(target, error))?;
        fs::set_permissions(target, permissions).map_err(|error| PipelineError::io(target, error))
    }
}
