//! Unified-diff patch application.
//!
//! A [`PatchSet`] is parsed and applied entirely in memory: every hunk of
//! every file must apply before any file is written, so a failing patch
//! leaves the tree exactly as it was.

mod apply;
mod errors;
mod parser;
mod types;

use std::collections::BTreeMap;

use tracing::debug;

pub use self::errors::PatchError;
use crate::REWRITE_TARGET;
use crate::error::RewriteError;
use crate::tree::{SourceTree, TreePath};
use self::apply::apply_hunks;
use self::parser::{display_path, parse_patch};
use self::types::FilePatch;

/// A literal patch document plus how to resolve its paths.
#[derive(Debug, Clone)]
pub struct PatchSet {
    text: String,
    strip: usize,
    directory: Option<TreePath>,
}

impl PatchSet {
    /// Creates a patch applied at the tree root with no prefix stripping
    /// (`patch -p0`).
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            strip: 0,
            directory: None,
        }
    }

    /// Strips `strip` leading components from every path (`patch -pN`).
    #[must_use]
    pub const fn with_strip(mut self, strip: usize) -> Self {
        self.strip = strip;
        self
    }

    /// Resolves paths relative to a subdirectory of the tree.
    #[must_use]
    pub fn relative_to(mut self, directory: TreePath) -> Self {
        self.directory = Some(directory);
        self
    }

    /// The patch document.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of stripped leading path components.
    #[must_use]
    pub const fn strip(&self) -> usize {
        self.strip
    }

    /// Paths the patch touches, in patch order, without reading the tree.
    ///
    /// # Errors
    ///
    /// Returns a [`PatchError`] when the document does not parse or a path is
    /// unusable.
    pub fn targets(&self) -> Result<Vec<TreePath>, PatchError> {
        parse_patch(&self.text)?
            .iter()
            .map(|file| self.target_path(file))
            .collect()
    }

    /// Applies the patch to `tree`.
    ///
    /// Returns the written paths in the order they were first touched.
    ///
    /// # Errors
    ///
    /// Returns a [`PatchError`] when the document does not parse, a path is
    /// rejected, a target is missing or a hunk does not apply. No file is
    /// written in that case.
    pub fn apply(&self, tree: &SourceTree) -> Result<Vec<TreePath>, PatchError> {
        let files = parse_patch(&self.text)?;
        let mut staged: BTreeMap<TreePath, String> = BTreeMap::new();
        let mut order = Vec::new();

        for file in &files {
            let path = self.target_path(file)?;
            let current = match staged.get(&path) {
                Some(content) => content.clone(),
                None => {
                    order.push(path.clone());
                    load_target(tree, &path, file)?
                }
            };
            let updated = apply_hunks(path.as_str(), &current, &file.hunks)?;
            debug!(
                target: REWRITE_TARGET,
                file = %path,
                hunks = file.hunks.len(),
                "patch section applies"
            );
            staged.insert(path, updated);
        }

        for path in &order {
            if let Some(content) = staged.get(path) {
                tree.write(path, content.as_bytes()).map_err(into_patch_error)?;
            }
        }
        Ok(order)
    }

    fn target_path(&self, file: &FilePatch) -> Result<TreePath, PatchError> {
        let Some(raw) = file.new_path.as_deref() else {
            return Err(PatchError::DeleteUnsupported {
                path: display_path(file),
            });
        };
        let stripped = strip_components(raw, self.strip)?;
        let joined = match &self.directory {
            Some(directory) => format!("{directory}/{stripped}"),
            None => stripped.to_owned(),
        };
        TreePath::new(joined).map_err(|error| PatchError::invalid_path(raw, error.to_string()))
    }
}

fn strip_components(path: &str, strip: usize) -> Result<&str, PatchError> {
    let mut rest = path;
    for _ in 0..strip {
        let (_, tail) = rest
            .split_once('/')
            .ok_or_else(|| PatchError::invalid_path(path, "too few components to strip"))?;
        rest = tail.trim_start_matches('/');
    }
    Ok(rest)
}

fn load_target(tree: &SourceTree, path: &TreePath, file: &FilePatch) -> Result<String, PatchError> {
    let exists = tree.exists(path);
    if file.old_path.is_none() {
        if exists {
            return Err(PatchError::FileAlreadyExists {
                path: path.to_string(),
            });
        }
        return Ok(String::new());
    }
    if !exists {
        return Err(PatchError::FileNotFound {
            path: path.to_string(),
        });
    }
    let bytes = tree.read(path).map_err(into_patch_error)?;
    String::from_utf8(bytes).map_err(|_| PatchError::NotUtf8 {
        path: path.to_string(),
    })
}

fn into_patch_error(error: RewriteError) -> PatchError {
    match error {
        RewriteError::Io { path, source } => PatchError::Io { path, source },
        other => PatchError::invalid_path("", other.to_string()),
    }
}
