//! Error types for tree rewriting operations.
//!
//! Every variant is fatal to a fork run. I/O errors are wrapped in `Arc` so the
//! enum stays small and cloneable into stage reports.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while selecting, rewriting, renaming or removing tree files.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum RewriteError {
    /// A matcher or scope pattern failed to compile.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Pattern source text.
        pattern: String,
        /// Compiler diagnostic.
        message: String,
    },

    /// A file glob failed to compile.
    #[error("invalid file glob '{glob}': {message}")]
    InvalidGlob {
        /// Glob source text.
        glob: String,
        /// Compiler diagnostic.
        message: String,
    },

    /// A rule running in strict mode touched no file.
    #[error("rule '{rule}' matched nothing in the tree")]
    RuleMatchedNothing {
        /// Name of the rule.
        rule: String,
    },

    /// A rename destination already exists or is claimed twice.
    #[error("cannot rename {} to {}: destination already exists", from.display(), to.display())]
    RenameCollision {
        /// Source path.
        from: PathBuf,
        /// Destination path.
        to: PathBuf,
    },

    /// A path would resolve outside the tree root.
    #[error("path '{path}' escapes the tree root: {reason}")]
    PathEscape {
        /// Offending path.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },

    /// A file system operation failed.
    #[error("I/O error for {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl RewriteError {
    /// Creates an invalid pattern error.
    #[must_use]
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid glob error.
    #[must_use]
    pub fn invalid_glob(glob: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidGlob {
            glob: glob.into(),
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path that produced it.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}
