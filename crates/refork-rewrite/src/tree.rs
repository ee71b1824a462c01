//! Working-tree access for the rewrite stages.
//!
//! The tree is addressed through [`TreePath`] values: relative,
//! `/`-separated paths that never start with a dot component. Dot-prefixed
//! entries at any depth (`.git`, `.gitignore`, ...) belong to the fork's own
//! repository metadata and are invisible to every stage.

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::RewriteError;
use crate::glob::FileGlob;

/// Relative, `/`-separated path of a file inside a [`SourceTree`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreePath(String);

impl TreePath {
    /// Validates and wraps a relative path.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::PathEscape`] for empty or absolute paths and
    /// for paths containing `..` components.
    pub fn new(raw: impl Into<String>) -> Result<Self, RewriteError> {
        let path = raw.into().replace('\\', "/");
        if path.trim().is_empty() {
            return Err(RewriteError::PathEscape {
                path,
                reason: String::from("path is empty"),
            });
        }
        let candidate = Path::new(&path);
        if candidate.is_absolute() || path.starts_with('/') {
            return Err(RewriteError::PathEscape {
                path,
                reason: String::from("absolute paths are not allowed"),
            });
        }
        for component in candidate.components() {
            if matches!(component, Component::ParentDir | Component::Prefix(_)) {
                return Err(RewriteError::PathEscape {
                    path,
                    reason: String::from("path traversal is not allowed"),
                });
            }
        }
        Ok(Self(path))
    }

    /// The path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final path component.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit_once('/').map_or(self.0.as_str(), |(_, name)| name)
    }

    /// The directory part, empty for root-level files.
    #[must_use]
    pub fn parent(&self) -> &str {
        self.0.rsplit_once('/').map_or("", |(parent, _)| parent)
    }

    /// A sibling path with the final component replaced.
    #[must_use]
    pub fn with_file_name(&self, name: &str) -> Self {
        match self.parent() {
            "" => Self(name.to_owned()),
            parent => Self(format!("{parent}/{name}")),
        }
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// The working tree a fork run mutates in place.
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: PathBuf,
}

impl SourceTree {
    /// Opens the tree rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a tree path to an absolute file system path.
    #[must_use]
    pub fn resolve(&self, path: &TreePath) -> PathBuf {
        path.as_str()
            .split('/')
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }

    /// Lists every regular file, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] when a directory cannot be read.
    pub fn files(&self) -> Result<Vec<TreePath>, RewriteError> {
        let mut files = Vec::new();
        for item in self.walk() {
            let entry = item?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(path) = self.relative(entry.path()) {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// Lists the files selected by `glob`, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] when a directory cannot be read.
    pub fn select(&self, glob: &FileGlob) -> Result<Vec<TreePath>, RewriteError> {
        Ok(self
            .files()?
            .into_iter()
            .filter(|path| glob.matches(path.as_str()))
            .collect())
    }

    /// Returns true when a file or directory exists at `path`.
    #[must_use]
    pub fn exists(&self, path: &TreePath) -> bool {
        self.resolve(path).exists()
    }

    /// Reads a file as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] when the file cannot be read.
    pub fn read(&self, path: &TreePath) -> Result<Vec<u8>, RewriteError> {
        let resolved = self.resolve(path);
        fs::read(&resolved).map_err(|source| RewriteError::io(resolved, source))
    }

    /// Replaces the content of a file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] when the file cannot be written.
    pub fn write(&self, path: &TreePath, content: &[u8]) -> Result<(), RewriteError> {
        let resolved = self.resolve(path);
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent).map_err(|source| RewriteError::io(parent, source))?;
        }
        fs::write(&resolved, content).map_err(|source| RewriteError::io(resolved, source))
    }

    pub(crate) fn walk(&self) -> impl Iterator<Item = Result<DirEntry, RewriteError>> {
        visible_entries(&self.root)
    }

    pub(crate) fn relative(&self, path: &Path) -> Option<TreePath> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(TreePath(parts.join("/")))
    }
}

/// Walks every entry below `root` in file-name order, skipping dot entries
/// and everything beneath them.
///
/// Symbolic links are yielded as links and never followed. Walk failures are
/// reported as [`RewriteError::Io`] against the offending path.
pub fn visible_entries(root: &Path) -> impl Iterator<Item = Result<DirEntry, RewriteError>> {
    let walk_root = root.to_path_buf();
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry))
        .map(move |item| item.map_err(|error| walk_error(&walk_root, error)))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn walk_error(root: &Path, error: walkdir::Error) -> RewriteError {
    let path = error.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
    let source = error
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
    RewriteError::io(path, source)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn tree_with(files: &[(&str, &str)]) -> (TempDir, SourceTree) {
        let dir = TempDir::new().expect("temp dir");
        let tree = SourceTree::new(dir.path());
        for (name, content) in files {
            let path = TreePath::new(*name).expect("tree path");
            tree.write(&path, content.as_bytes()).expect("write file");
        }
        (dir, tree)
    }

    #[test]
    fn lists_files_sorted_and_skips_dot_entries() {
        let (_dir, tree) = tree_with(&[
            ("value.go", ""),
            ("ast/node.go", ""),
            (".git/HEAD", ""),
            (".gitignore", ""),
            ("ast/.hidden.go", ""),
        ]);
        let files: Vec<String> = tree
            .files()
            .expect("list")
            .into_iter()
            .map(|path| path.as_str().to_owned())
            .collect();
        assert_eq!(files, vec!["ast/node.go", "value.go"]);
    }

    #[test]
    fn visible_entries_yield_directories_and_skip_dot_subtrees() {
        let (dir, _tree) = tree_with(&[("ast/node.go", ""), (".git/HEAD", ""), ("value.go", "")]);
        let names: Vec<String> = visible_entries(dir.path())
            .map(|item| {
                let entry = item.expect("entry");
                entry.file_name().to_string_lossy().into_owned()
            })
            .collect();
        assert_eq!(names, vec!["ast", "node.go", "value.go"]);
    }

    #[test]
    fn select_applies_glob() {
        let (_dir, tree) = tree_with(&[("value.go", ""), ("ast/node.go", ""), ("README", "")]);
        let glob = FileGlob::new("*.go").expect("glob");
        let selected = tree.select(&glob).expect("select");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.first().map(TreePath::as_str), Some("value.go"));
    }

    #[rstest]
    #[case::parent("../outside.go")]
    #[case::nested_parent("ast/../../outside.go")]
    #[case::absolute("/etc/passwd")]
    #[case::empty("  ")]
    fn tree_path_rejects_escapes(#[case] path: &str) {
        let error = TreePath::new(path).expect_err("should reject");
        assert!(matches!(error, RewriteError::PathEscape { .. }));
    }

    #[test]
    fn tree_path_parts() {
        let path = TreePath::new("parser/otto_lexer.go").expect("path");
        assert_eq!(path.file_name(), "otto_lexer.go");
        assert_eq!(path.parent(), "parser");
        assert_eq!(
            path.with_file_name("js_lexer.go").as_str(),
            "parser/js_lexer.go"
        );
        let root = TreePath::new("otto.go").expect("path");
        assert_eq!(root.with_file_name("js.go").as_str(), "js.go");
    }
}
