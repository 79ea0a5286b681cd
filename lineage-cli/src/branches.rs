//! Branch enumeration
//!
//! Lists branches with their tip commit and committer time, sorted by
//! name. Remote mode walks `origin/` refs with the prefix stripped; the
//! default branch and the symbolic `HEAD` entry are filtered unless asked
//! for.

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use git2::{BranchType, Repository};
use serde::Serialize;

/// A branch tip.
#[derive(Debug, Clone, Serialize)]
pub struct BranchInfo {
    pub name: String,
    /// Full hash of the tip commit.
    pub commit: String,
    /// Committer timestamp of the tip (ISO 8601).
    pub committer_time: String,
}

/// Enumerate branches.
///
/// # Arguments
/// * `use_origin` - list `origin/` remote refs instead of local heads
/// * `include_default` - keep the default branch in the result
pub fn list(repo: &Repository, use_origin: bool, include_default: bool) -> Result<Vec<BranchInfo>> {
    let default_branch = default_branch_name(repo)?;
    let branch_type = if use_origin {
        BranchType::Remote
    } else {
        BranchType::Local
    };

    let mut result = Vec::new();
    for entry in repo.branches(Some(branch_type))? {
        let (branch, _) = entry?;
        let Some(full_name) = branch.name()?.map(str::to_string) else {
            continue;
        };
        let name = if use_origin {
            match full_name.strip_prefix("origin/") {
                Some(stripped) => stripped.to_string(),
                None => continue,
            }
        } else {
            full_name
        };
        // The symbolic origin/HEAD entry is not a branch.
        if name == "HEAD" {
            continue;
        }
        if !include_default && name == default_branch {
            continue;
        }
        let Some(target) = branch.get().target() else {
            continue;
        };
        let commit = repo.find_commit(target)?;
        result.push(BranchInfo {
            name,
            commit: target.to_string(),
            committer_time: format_git_time(&commit.time()),
        });
    }

    result.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(result)
}

fn default_branch_name(repo: &Repository) -> Result<String> {
    let head = repo.head().context("Could not resolve HEAD")?;
    Ok(head.shorthand().unwrap_or("HEAD").to_string())
}

/// Format a git timestamp as ISO 8601.
fn format_git_time(time: &git2::Time) -> String {
    match Utc.timestamp_opt(time.seconds(), 0).single() {
        Some(dt) => dt.to_rfc3339(),
        None => "1970-01-01T00:00:00Z".to_string(),
    }
}
