//! Deriving session names from the enclosing git repository.

use std::path::{Path, PathBuf};

use crate::domain::model::sanitize_session_name;
use crate::domain::target::FileTarget;

const GIT_MARKER: &str = ".git";

/// Walk upward from `start` to the first directory holding a `.git` entry.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(GIT_MARKER).exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Session name for the repository containing `target`, or an empty string outside any repo.
///
/// The search starts at the target's directory, or at `cwd` when no file was given.
pub fn session_name(target: &FileTarget, cwd: &Path) -> String {
    find_repo_root(&search_start(target, cwd))
        .and_then(|root| {
            root.file_name()
                .map(|name| sanitize_session_name(&name.to_string_lossy()))
        })
        .unwrap_or_default()
}

fn search_start(target: &FileTarget, cwd: &Path) -> PathBuf {
    if !target.has_path() {
        return cwd.to_path_buf();
    }

    let path = cwd.join(target.path());
    if path.is_dir() {
        return path;
    }
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.to_path_buf())
}
