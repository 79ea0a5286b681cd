//! Commit parents graph
//!
//! Records, for each commit, the ordered list of its parents (first parent
//! is the mainline), and exposes Kahn-style topological iteration plus the
//! child counts the blame store uses as initial reference counts.
//!
//! Parents that were never inserted (history cut off by a start commit or
//! a limit) do not block iteration; commits referencing them are treated
//! as roots of the processed slice.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use crate::intern::CommitKey;

#[derive(Debug, Default)]
pub struct ParentsGraph {
    parents: FxHashMap<CommitKey, Vec<CommitKey>>,
    child_counts: FxHashMap<CommitKey, usize>,
    children: FxHashMap<CommitKey, Vec<CommitKey>>,
    /// Insertion order; doubles as the deterministic tie-break for
    /// topological iteration.
    order: Vec<CommitKey>,
    positions: FxHashMap<CommitKey, usize>,
}

impl ParentsGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a commit and its ordered parent list. Re-inserting a commit
    /// replaces nothing; the first insertion wins.
    pub fn insert(&mut self, commit: CommitKey, parents: Vec<CommitKey>) {
        if self.parents.contains_key(&commit) {
            return;
        }
        for &parent in &parents {
            *self.child_counts.entry(parent).or_insert(0) += 1;
            self.children.entry(parent).or_default().push(commit);
        }
        self.positions.insert(commit, self.order.len());
        self.order.push(commit);
        self.parents.insert(commit, parents);
    }

    /// Ordered parents of a commit; empty for roots and unknown hashes.
    pub fn parents(&self, commit: CommitKey) -> &[CommitKey] {
        self.parents
            .get(&commit)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of commits listing `commit` as one of their parents. A parent
    /// listed twice by the same child is counted twice, mirroring the
    /// per-listing consumption of its blames.
    pub fn child_count(&self, commit: CommitKey) -> usize {
        self.child_counts.get(&commit).copied().unwrap_or(0)
    }

    /// Commits listing `commit` as a parent, in insertion order.
    pub fn children(&self, commit: CommitKey) -> &[CommitKey] {
        self.children
            .get(&commit)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, commit: CommitKey) -> bool {
        self.parents.contains_key(&commit)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate commits so that every commit is yielded after all of its
    /// (known) parents. Ties are broken by insertion order.
    pub fn topological_iter(&self) -> TopoIter<'_> {
        let mut indegree: FxHashMap<CommitKey, usize> =
            FxHashMap::with_capacity_and_hasher(self.order.len(), Default::default());
        let mut ready = BinaryHeap::new();

        for (position, &commit) in self.order.iter().enumerate() {
            let known_parents = self.parents[&commit]
                .iter()
                .filter(|p| self.parents.contains_key(p))
                .count();
            if known_parents == 0 {
                ready.push(Reverse(position));
            } else {
                indegree.insert(commit, known_parents);
            }
        }

        TopoIter {
            graph: self,
            indegree,
            ready,
        }
    }
}

pub struct TopoIter<'a> {
    graph: &'a ParentsGraph,
    indegree: FxHashMap<CommitKey, usize>,
    ready: BinaryHeap<Reverse<usize>>,
}

impl Iterator for TopoIter<'_> {
    type Item = CommitKey;

    fn next(&mut self) -> Option<CommitKey> {
        let Reverse(position) = self.ready.pop()?;
        let commit = self.graph.order[position];
        if let Some(children) = self.graph.children.get(&commit) {
            for &child in children {
                if let Some(remaining) = self.indegree.get_mut(&child) {
                    *remaining -= 1;
                    if *remaining == 0 {
                        self.indegree.remove(&child);
                        self.ready.push(Reverse(self.graph.positions[&child]));
                    }
                }
            }
        }
        Some(commit)
    }
}
