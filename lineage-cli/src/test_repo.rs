//! Shared git repository fixture for tests.

use std::fs;
use std::path::Path;

use anyhow::Result;
use git2::{Oid, Repository};
use tempfile::TempDir;

pub struct TestRepo {
    pub repo: Repository,
    pub dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let repo = Repository::init(dir.path())?;

        // Configure user for commits
        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;

        Ok(Self { repo, dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `path`, stage it, and commit on HEAD with the
    /// given parents.
    pub fn commit_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        parents: &[Oid],
    ) -> Result<Oid> {
        fs::write(self.dir.path().join(path), content)?;
        let mut index = self.repo.index()?;
        index.add_path(Path::new(path))?;
        index.write()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent_commits: Vec<git2::Commit> = parents
            .iter()
            .map(|&oid| self.repo.find_commit(oid))
            .collect::<Result<_, git2::Error>>()?;
        let parent_refs: Vec<&git2::Commit> = parent_commits.iter().collect();

        let sig = self.repo.signature()?;
        let current_tip = self.repo.head().ok().and_then(|h| h.target());
        let update_ref = match parents.first() {
            None => Some("HEAD"),
            Some(&first) if current_tip == Some(first) => Some("HEAD"),
            Some(_) => None,
        };
        let oid = self
            .repo
            .commit(update_ref, &sig, &sig, message, &tree, &parent_refs)?;
        Ok(oid)
    }
}
