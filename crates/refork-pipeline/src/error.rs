//! Error types for fork runs.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use refork_rewrite::{PatchError, RewriteError};
use thiserror::Error;

use crate::command::CommandError;
use crate::state::Stage;

/// Errors raised by a single pipeline stage.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// The search path variable is unset or empty.
    #[error("environment variable {var} is unset or empty")]
    SearchPathUnset {
        /// Name of the variable.
        var: String,
    },

    /// The working directory is not below the search path's source root.
    #[error("working directory {} is not inside {}", work_dir.display(), source_root.display())]
    OutsideSearchPath {
        /// Absolute working directory.
        work_dir: PathBuf,
        /// The `src` directory of the search path.
        source_root: PathBuf,
    },

    /// The upstream tree does not exist.
    #[error("upstream tree {} does not exist", path.display())]
    UpstreamMissing {
        /// Expected location of the upstream tree.
        path: PathBuf,
    },

    /// The working directory holds entries other than dot entries.
    #[error("non empty working directory: {entry}")]
    WorkDirNotEmpty {
        /// First offending entry name.
        entry: String,
    },

    /// An external command failed.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// A rewrite, rename or prune failed.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    /// The embedded patch did not apply.
    #[error(transparent)]
    Patch(#[from] PatchError),

    /// A file system operation failed.
    #[error("I/O error for {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Arc<io::Error>,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}

/// The first failing stage of a run together with its cause.
#[derive(Debug, Clone, Error)]
#[error("{stage} failed: {error}")]
pub struct RunFailure {
    stage: Stage,
    #[source]
    error: PipelineError,
}

impl RunFailure {
    /// Creates a failure record.
    #[must_use]
    pub const fn new(stage: Stage, error: PipelineError) -> Self {
        Self { stage, error }
    }

    /// Stage that failed.
    #[must_use]
    pub const fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Cause of the failure.
    #[must_use]
    pub const fn error(&self) -> &PipelineError {
        &self.error
    }

    /// Output of the failing command, when a command failed.
    #[must_use]
    pub fn diagnostic_output(&self) -> Option<&str> {
        match &self.error {
            PipelineError::Command(error) => error.output(),
            _ => None,
        }
    }
}
