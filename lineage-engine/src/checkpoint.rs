//! Incremental checkpoints
//!
//! Persists the live frontier of a run (every blame still held by the
//! store) plus the set of processed commits, so a later run over the same
//! repository can pick up where this one stopped. Reference counts are
//! deliberately not persisted: the commit graph may have grown between
//! runs, so the driver recomputes them from the graph it resumes against.
//!
//! The codec resolves interned commit keys back to hashes; round-tripping
//! a checkpoint reproduces every blame exactly.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::blame::{Blame, Line};
use crate::intern::{CommitInterner, CommitKey};
use crate::store::BlameStore;

const CHECKPOINT_VERSION: u32 = 1;

/// Frontier blames keyed back to commit hashes, ready for the store.
pub type FrontierEntries = Vec<(CommitKey, Vec<(String, Arc<Blame>)>)>;

#[derive(Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    /// Hashes of commits already emitted.
    pub processed: Vec<String>,
    /// Live frontier state at the time of capture.
    pub frontier: Vec<FrontierCommit>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FrontierCommit {
    pub commit: String,
    pub files: Vec<FrontierFile>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FrontierFile {
    pub path: String,
    pub blame: BlameSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlameSnapshot {
    pub commit: String,
    pub is_binary: bool,
    pub lines: Vec<LineSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub commit: String,
    /// Raw bytes, serialized as a number array so non-UTF-8 content
    /// survives exactly.
    pub content: Vec<u8>,
}

impl Checkpoint {
    /// Snapshot the store and processed set.
    pub fn capture(
        store: &BlameStore,
        processed: &FxHashSet<CommitKey>,
        interner: &CommitInterner,
    ) -> Self {
        let mut processed: Vec<String> = processed
            .iter()
            .map(|&key| interner.resolve(key).to_string())
            .collect();
        processed.sort_unstable();

        let mut frontier: Vec<FrontierCommit> = store
            .iter_commits()
            .map(|commit| {
                let mut files: Vec<FrontierFile> = store
                    .files(commit)
                    .map(|(path, blame, _)| FrontierFile {
                        path: path.to_string(),
                        blame: snapshot_blame(blame, interner),
                    })
                    .collect();
                files.sort_by(|a, b| a.path.cmp(&b.path));
                FrontierCommit {
                    commit: interner.resolve(commit).to_string(),
                    files,
                }
            })
            .collect();
        frontier.sort_by(|a, b| a.commit.cmp(&b.commit));

        Self {
            version: CHECKPOINT_VERSION,
            processed,
            frontier,
        }
    }

    /// Decode the frontier and processed set, interning hashes as needed.
    /// The caller decides each frontier commit's reference count against
    /// its current graph.
    pub fn restore(&self, interner: &CommitInterner) -> (FrontierEntries, FxHashSet<CommitKey>) {
        let entries = self
            .frontier
            .iter()
            .map(|frontier_commit| {
                let commit = interner.intern(&frontier_commit.commit);
                let files = frontier_commit
                    .files
                    .iter()
                    .map(|file| {
                        (
                            file.path.clone(),
                            Arc::new(restore_blame(&file.blame, interner)),
                        )
                    })
                    .collect();
                (commit, files)
            })
            .collect();
        let processed = self
            .processed
            .iter()
            .map(|hash| interner.intern(hash))
            .collect();
        (entries, processed)
    }

    /// Write as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create checkpoint dir {:?}", parent))?;
        }
        let data = serde_json::to_vec(self)?;
        fs::write(path, data)
            .with_context(|| format!("Failed to write checkpoint {:?}", path))?;
        Ok(())
    }

    /// Read a previously saved checkpoint.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("Failed to read checkpoint {:?}", path))?;
        let checkpoint: Checkpoint = serde_json::from_slice(&data)
            .with_context(|| format!("Failed to parse checkpoint {:?}", path))?;
        anyhow::ensure!(
            checkpoint.version == CHECKPOINT_VERSION,
            "unsupported checkpoint version {}",
            checkpoint.version
        );
        Ok(checkpoint)
    }
}

fn snapshot_blame(blame: &Blame, interner: &CommitInterner) -> BlameSnapshot {
    BlameSnapshot {
        commit: interner.resolve(blame.commit).to_string(),
        is_binary: blame.is_binary,
        lines: blame
            .lines
            .iter()
            .map(|line| LineSnapshot {
                commit: interner.resolve(line.commit).to_string(),
                content: line.content.to_vec(),
            })
            .collect(),
    }
}

fn restore_blame(snapshot: &BlameSnapshot, interner: &CommitInterner) -> Blame {
    Blame {
        commit: interner.intern(&snapshot.commit),
        is_binary: snapshot.is_binary,
        lines: snapshot
            .lines
            .iter()
            .map(|line| Line::new(line.content.as_slice(), interner.intern(&line.commit)))
            .collect(),
    }
}
