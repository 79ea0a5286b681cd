//! Commit graph construction via libgit2
//!
//! Walks the requested refs oldest-first and records each commit's ordered
//! parent list. The same ref selection is passed to the `git log` patch
//! stream, so the graph and the diff source cover the same slice of
//! history.

use anyhow::{Context, Result};
use git2::{BranchType, Repository, Sort};
use tracing::debug;

use lineage_engine::{CommitInterner, ParentsGraph};

/// Build the parents graph for HEAD or for all local branches, optionally
/// cutting history below `since` (exclusive).
pub fn build_parents_graph(
    repo: &Repository,
    interner: &CommitInterner,
    all_branches: bool,
    since: Option<&str>,
) -> Result<ParentsGraph> {
    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;

    if all_branches {
        for entry in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            if let Some(target) = branch.get().target() {
                revwalk.push(target)?;
            }
        }
        revwalk.push_head()?;
    } else {
        revwalk.push_head()?;
    }

    if let Some(since) = since {
        let cutoff = repo
            .revparse_single(since)
            .with_context(|| format!("Failed to resolve start commit {:?}", since))?
            .peel_to_commit()
            .with_context(|| format!("{:?} does not name a commit", since))?;
        revwalk.hide(cutoff.id())?;
    }

    let mut graph = ParentsGraph::new();
    for oid in revwalk {
        let oid = oid?;
        let commit = repo.find_commit(oid)?;
        let key = interner.intern(&oid.to_string());
        let parents = commit
            .parent_ids()
            .map(|parent| interner.intern(&parent.to_string()))
            .collect();
        graph.insert(key, parents);
    }

    debug!(commits = graph.len(), all_branches, "parents graph built");
    Ok(graph)
}
