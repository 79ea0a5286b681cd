//! Repository discovery
//!
//! Finds every git working copy under a root directory, so one invocation
//! can fan out over a checkout farm. A `.git` entry (directory, or file for
//! worktrees) marks its parent as a repository; the walk does not descend
//! into git metadata.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub fn find_repositories(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(root).into_iter();

    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else {
            continue;
        };
        if entry.file_name() == ".git" {
            if let Some(repo) = entry.path().parent() {
                found.push(repo.to_path_buf());
            }
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
        }
    }

    found.sort();
    found.dedup();
    found
}
