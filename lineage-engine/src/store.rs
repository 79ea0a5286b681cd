//! Reference-counted blame store
//!
//! Holds the blame of every live file for every commit still reachable from
//! an unprocessed child. Entries are inserted when the producing commit is
//! processed, with an initial count equal to the number of children that
//! will consume them, and dropped as the last consumer releases them. This
//! release discipline is the only thing bounding the working set on deep
//! histories.
//!
//! Blames are shared: a child inheriting an unchanged file clones the `Arc`,
//! not the lines.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::blame::Blame;
use crate::intern::CommitKey;

#[derive(Debug, Default)]
pub struct BlameStore {
    commits: FxHashMap<CommitKey, CommitState>,
}

#[derive(Debug, Default)]
struct CommitState {
    files: FxHashMap<String, StoreEntry>,
    /// Children that have not yet consumed this commit's state. Kept at the
    /// commit level as well so a commit with an empty tree still lives until
    /// its last child has looked at it.
    live_children: usize,
}

#[derive(Debug)]
struct StoreEntry {
    blame: Arc<Blame>,
    live_children: usize,
}

impl BlameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a processed commit with no file entries (an empty tree).
    /// A no-op when `live_children` is zero: nothing will ever read it.
    pub fn register(&mut self, commit: CommitKey, live_children: usize) {
        if live_children == 0 {
            return;
        }
        let state = self.commits.entry(commit).or_default();
        state.live_children = state.live_children.max(live_children);
    }

    /// Insert the blame of one file at one commit. A no-op when
    /// `live_children` is zero: the entry could never be released and the
    /// store must end a run empty.
    pub fn put(
        &mut self,
        commit: CommitKey,
        path: String,
        blame: Arc<Blame>,
        live_children: usize,
    ) {
        if live_children == 0 {
            return;
        }
        let state = self.commits.entry(commit).or_default();
        state.live_children = state.live_children.max(live_children);
        state.files.insert(
            path,
            StoreEntry {
                blame,
                live_children,
            },
        );
    }

    /// Borrow the blame of `path` at `commit`. `None` either because the
    /// commit is not in the store or because the file did not exist at that
    /// commit; `contains_commit` tells the two apart.
    pub fn get(&self, commit: CommitKey, path: &str) -> Option<&Arc<Blame>> {
        self.commits
            .get(&commit)?
            .files
            .get(path)
            .map(|entry| &entry.blame)
    }

    /// Whether the store holds state for `commit` at all.
    pub fn contains_commit(&self, commit: CommitKey) -> bool {
        self.commits.contains_key(&commit)
    }

    /// Iterate the live files of a commit: path, blame, remaining count.
    pub fn files(
        &self,
        commit: CommitKey,
    ) -> impl Iterator<Item = (&str, &Arc<Blame>, usize)> + '_ {
        self.commits
            .get(&commit)
            .into_iter()
            .flat_map(|state| {
                state
                    .files
                    .iter()
                    .map(|(path, entry)| (path.as_str(), &entry.blame, entry.live_children))
            })
    }

    pub fn iter_commits(&self) -> impl Iterator<Item = CommitKey> + '_ {
        self.commits.keys().copied()
    }

    /// Drop one consumer of a single entry; the entry is removed when its
    /// count reaches zero. Returns false if no such entry was live.
    pub fn release(&mut self, commit: CommitKey, path: &str) -> bool {
        let Some(state) = self.commits.get_mut(&commit) else {
            return false;
        };
        let Some(entry) = state.files.get_mut(path) else {
            return false;
        };
        entry.live_children -= 1;
        if entry.live_children == 0 {
            state.files.remove(path);
        }
        true
    }

    /// Drop one consumer of a commit's whole state: every file entry and the
    /// commit-level count. The state is removed once the last consumer is
    /// gone. Returns false if the commit was not in the store.
    pub fn release_commit(&mut self, commit: CommitKey) -> bool {
        let Some(state) = self.commits.get_mut(&commit) else {
            return false;
        };
        state.files.retain(|_, entry| {
            entry.live_children -= 1;
            entry.live_children > 0
        });
        state.live_children = state.live_children.saturating_sub(1);
        if state.live_children == 0 {
            self.commits.remove(&commit);
        }
        true
    }

    /// Number of live `(commit, path)` entries.
    pub fn entry_count(&self) -> usize {
        self.commits.values().map(|state| state.files.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}
