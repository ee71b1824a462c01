//! Working directory precondition.
//!
//! The fork is produced inside an existing repository checkout, so dot
//! entries (`.git`, `.gitignore`, ...) are expected and always kept. Any other
//! entry either aborts the run or, with force-clean, is removed first.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::PIPELINE_TARGET;
use crate::error::PipelineError;

/// Ensures `dir` exists and holds nothing but dot entries.
///
/// With `force_clean`, every non-dot entry is removed and the removed names
/// are returned in sorted order.
///
/// # Errors
///
/// Returns [`PipelineError::WorkDirNotEmpty`] naming the first offending
/// entry when `force_clean` is off, or [`PipelineError::Io`] when the
/// directory cannot be listed or cleaned.
pub fn prepare_work_dir(dir: &Path, force_clean: bool) -> Result<Vec<String>, PipelineError> {
    fs::create_dir_all(dir).map_err(|source| PipelineError::io(dir, source))?;

    let mut entries = Vec::new();
    for item in fs::read_dir(dir).map_err(|source| PipelineError::io(dir, source))? {
        let entry = item.map_err(|source| PipelineError::io(dir, source))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            entries.push(name);
        }
    }
    entries.sort();

    if !force_clean {
        return match entries.into_iter().next() {
            Some(entry) => Err(PipelineError::WorkDirNotEmpty { entry }),
            None => Ok(Vec::new()),
        };
    }

    for name in &entries {
        let path = dir.join(name);
        let result = if path.is_dir() && !path.is_symlink() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|source| PipelineError::io(&path, source))?;
        info!(target: PIPELINE_TARGET, entry = %name, "removed working directory entry");
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn populated() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir_all(dir.path().join(".git")).expect("git dir");
        fs::write(dir.path().join(".gitignore"), "*.o\n").expect("gitignore");
        fs::create_dir_all(dir.path().join("parser")).expect("parser");
        fs::write(dir.path().join("parser/lexer.go"), "package parser\n").expect("lexer");
        fs::write(dir.path().join("value.go"), "package js\n").expect("value");
        dir
    }

    #[test]
    fn dot_entries_alone_are_accepted() {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir_all(dir.path().join(".git")).expect("git dir");
        let removed = prepare_work_dir(dir.path(), false).expect("accept");
        assert!(removed.is_empty());
    }

    #[test]
    fn other_entries_are_rejected_without_force_clean() {
        let dir = populated();
        let error = prepare_work_dir(dir.path(), false).expect_err("should fail");
        assert!(matches!(error, PipelineError::WorkDirNotEmpty { ref entry } if entry == "parser"));
        assert!(dir.path().join("value.go").exists());
    }

    #[test]
    fn force_clean_keeps_only_dot_entries() {
        let dir = populated();
        let removed = prepare_work_dir(dir.path(), true).expect("clean");
        assert_eq!(removed, vec!["parser", "value.go"]);
        assert!(dir.path().join(".git").is_dir());
        assert!(dir.path().join(".gitignore").is_file());
        assert!(!dir.path().join("parser").exists());
        assert!(!dir.path().join("value.go").exists());
    }

    #[test]
    fn missing_directory_is_created() {
        let dir = TempDir::new().expect("temp dir");
        let target = dir.path().join("fork");
        prepare_work_dir(&target, false).expect("create");
        assert!(target.is_dir());
    }
}
