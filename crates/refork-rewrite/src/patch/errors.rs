//! Error types for unified-diff parsing and application.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while parsing or applying a patch. Nothing is written when
/// any of these is returned.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum PatchError {
    /// The patch document contains nothing to apply.
    #[error("patch input was empty")]
    EmptyPatch,

    /// The patch document contains NUL bytes.
    #[error("patch contains binary data")]
    BinaryPatch,

    /// A hunk appeared before any `---`/`+++` file header.
    #[error("patch line {line}: hunk without a file header")]
    MissingFileHeader {
        /// One-based line in the patch document.
        line: usize,
    },

    /// A `+++` header was not preceded by a `---` header.
    #[error("patch line {line}: '+++' header without a preceding '---' header")]
    UnpairedHeader {
        /// One-based line in the patch document.
        line: usize,
    },

    /// A hunk header could not be parsed.
    #[error("patch line {line}: invalid hunk header '{text}'")]
    InvalidHunkHeader {
        /// One-based line in the patch document.
        line: usize,
        /// Header text.
        text: String,
    },

    /// The hunk body does not agree with the counts in its header.
    #[error("hunk {hunk} of {path}: body does not match the header line counts")]
    CountMismatch {
        /// Target path as written in the patch.
        path: String,
        /// One-based hunk index within the file.
        hunk: usize,
    },

    /// A path in the patch is unusable after stripping.
    #[error("invalid patch path '{path}': {reason}")]
    InvalidPath {
        /// Path as written in the patch.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },

    /// A modified file does not exist.
    #[error("patch target {path} does not exist")]
    FileNotFound {
        /// Target path.
        path: String,
    },

    /// A created file already exists.
    #[error("patch would create {path}, which already exists")]
    FileAlreadyExists {
        /// Target path.
        path: String,
    },

    /// The patch deletes a file.
    #[error("patch deletes {path}; file deletion is not supported")]
    DeleteUnsupported {
        /// Target path.
        path: String,
    },

    /// A target file is not valid UTF-8.
    #[error("patch target {path} is not valid UTF-8")]
    NotUtf8 {
        /// Target path.
        path: String,
    },

    /// A hunk's pre-image was not found in the target.
    #[error("hunk {hunk} of {path} does not apply (expected at line {line})")]
    HunkMismatch {
        /// Target path.
        path: String,
        /// One-based hunk index within the file.
        hunk: usize,
        /// Line the hunk header points at.
        line: usize,
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

impl PatchError {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }
}
