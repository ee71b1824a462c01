//! Resolution of the upstream tree and the fork's import path.
//!
//! The search path variable (`GOPATH` for Go projects) lists workspace roots;
//! only the first entry is used. Upstream sources live at
//! `<root>/src/<upstream import path>` and the fork's own import path is the
//! working directory relative to `<root>/src`.

use std::env;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::error::PipelineError;

/// Locations a fork run works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkEnvironment {
    search_root: PathBuf,
    upstream_dir: PathBuf,
    work_dir: PathBuf,
    import_path: String,
}

impl ForkEnvironment {
    /// Resolves the environment from the variable named `search_path_var`.
    ///
    /// # Errors
    ///
    /// See [`ForkEnvironment::from_search_path`]; an unset variable yields
    /// [`PipelineError::SearchPathUnset`].
    pub fn resolve(
        search_path_var: &str,
        upstream_import_path: &str,
        work_dir: &Path,
    ) -> Result<Self, PipelineError> {
        let value = env::var_os(search_path_var).unwrap_or_default();
        Self::from_search_path(search_path_var, &value, upstream_import_path, work_dir)
    }

    /// Resolves the environment from an explicit search path list.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SearchPathUnset`] when the list has no
    /// non-empty first entry, [`PipelineError::OutsideSearchPath`] when the
    /// working directory is not strictly below `<root>/src`, and
    /// [`PipelineError::UpstreamMissing`] when the upstream tree is absent.
    pub fn from_search_path(
        search_path_var: &str,
        search_path: &OsStr,
        upstream_import_path: &str,
        work_dir: &Path,
    ) -> Result<Self, PipelineError> {
        let unset = || PipelineError::SearchPathUnset {
            var: search_path_var.to_owned(),
        };
        let first = env::split_paths(search_path)
            .next()
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or_else(unset)?;
        let search_root = absolute(&first)?;
        let fork_dir = absolute(work_dir)?;
        let source_root = search_root.join("src");

        let import_path = import_path_of(&fork_dir, &source_root).ok_or_else(|| {
            PipelineError::OutsideSearchPath {
                work_dir: fork_dir.clone(),
                source_root: source_root.clone(),
            }
        })?;

        let upstream_dir = upstream_import_path
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(source_root, |acc, part| acc.join(part));
        if !upstream_dir.is_dir() {
            return Err(PipelineError::UpstreamMissing { path: upstream_dir });
        }

        Ok(Self {
            search_root,
            upstream_dir,
            work_dir: fork_dir,
            import_path,
        })
    }

    /// First entry of the search path, made absolute.
    #[must_use]
    pub fn search_root(&self) -> &Path {
        &self.search_root
    }

    /// Directory holding the upstream sources.
    #[must_use]
    pub fn upstream_dir(&self) -> &Path {
        &self.upstream_dir
    }

    /// Absolute working directory receiving the fork.
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// The fork's import path, `/`-separated.
    #[must_use]
    pub fn import_path(&self) -> &str {
        &self.import_path
    }
}

fn absolute(path: &Path) -> Result<PathBuf, PipelineError> {
    std::path::absolute(path).map_err(|source| PipelineError::io(path, source))
}

fn import_path_of(work_dir: &Path, source_root: &Path) -> Option<String> {
    let relative = work_dir.strip_prefix(source_root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    (!parts.is_empty()).then(|| parts.join("/"))
}
