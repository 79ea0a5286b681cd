//! Blame driver loop
//!
//! Pulls commits from the parents graph in topological order, fetches each
//! commit's per-file diffs from the [`DiffSource`], computes new blames
//! against the parents' stored state, emits `(commit, path, blame)` records
//! to the [`Sink`] in sorted path order, and maintains the store's
//! reference counts so the working set stays bounded by the live frontier.
//!
//! Applies for distinct files of one commit are independent and run on the
//! rayon pool; the store is only read while they run and only mutated in
//! the serial phase that follows.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use crate::apply::apply;
use crate::blame::Blame;
use crate::checkpoint::Checkpoint;
use crate::diff::Diff;
use crate::error::{EngineResult, Error, ParseError};
use crate::graph::ParentsGraph;
use crate::ignore;
use crate::intern::{CommitInterner, CommitKey};
use crate::store::BlameStore;

/// One emitted blame: the authorship of `path` as of `commit`.
#[derive(Debug, Clone)]
pub struct BlameRecord {
    pub commit: CommitKey,
    pub path: String,
    pub blame: Arc<Blame>,
}

/// Supplies, for a commit hash, the diffs of every file the commit touched,
/// keyed by post-commit path.
pub trait DiffSource {
    fn diffs_for(&mut self, commit: &str) -> anyhow::Result<FxHashMap<String, Diff>>;
}

/// Receives emitted blame records. A sink failure aborts the traversal.
pub trait Sink {
    fn emit(&mut self, record: BlameRecord) -> anyhow::Result<()>;
}

/// Cooperative cancellation, checked between commits; an in-progress commit
/// always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Path selection layered on top of the built-in exclusion table.
#[derive(Debug, Clone)]
pub struct ProcessOpts {
    /// Only process paths matching this pattern.
    pub include: Option<Regex>,
    /// Drop paths matching this pattern.
    pub exclude: Option<Regex>,
    /// Apply the built-in lockfile/vendor/media exclusions.
    pub use_builtin_exclusions: bool,
    /// Stop after this many newly processed commits.
    pub limit: Option<usize>,
    /// Keep the blame state of branch tips alive after the run instead of
    /// letting the reference counts drain it. Required for checkpoints:
    /// commits added later build on the old tips.
    pub retain_tips: bool,
}

impl Default for ProcessOpts {
    fn default() -> Self {
        Self {
            include: None,
            exclude: None,
            use_builtin_exclusions: true,
            limit: None,
            retain_tips: false,
        }
    }
}

/// Counters from one driver run.
#[derive(Debug, Default)]
pub struct RunStats {
    /// Commits newly processed (checkpoint-seeded commits not included).
    pub commits: usize,
    /// Blame records emitted.
    pub files: usize,
    /// Total lines across emitted blames.
    pub lines: usize,
    /// Paths dropped by filters.
    pub skipped_paths: usize,
    /// The run stopped on the cancellation flag.
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl RunStats {
    pub fn summary(&self) -> String {
        let mut text = format!(
            "{} commits, {} blames, {} lines, {} paths skipped in {:.1?}",
            self.commits, self.files, self.lines, self.skipped_paths, self.elapsed
        );
        if self.cancelled {
            text.push_str(" (cancelled)");
        }
        text
    }
}

struct ApplyTask {
    path: String,
    diff: Diff,
    parent_blames: Vec<Arc<Blame>>,
}

struct AppliedFile {
    path: String,
    is_deletion: bool,
    renamed_from: Option<String>,
    blame: Arc<Blame>,
}

/// The driver. Borrows the interner and graph, owns the diff source, sink,
/// and blame store for the duration of the run.
pub struct Processor<'a, D, S> {
    interner: &'a CommitInterner,
    graph: &'a ParentsGraph,
    source: D,
    sink: S,
    opts: ProcessOpts,
    cancel: CancelFlag,
    store: BlameStore,
    processed: FxHashSet<CommitKey>,
}

impl<'a, D: DiffSource, S: Sink> Processor<'a, D, S> {
    pub fn new(interner: &'a CommitInterner, graph: &'a ParentsGraph, source: D, sink: S) -> Self {
        Self {
            interner,
            graph,
            source,
            sink,
            opts: ProcessOpts::default(),
            cancel: CancelFlag::new(),
            store: BlameStore::new(),
            processed: FxHashSet::default(),
        }
    }

    pub fn with_opts(mut self, opts: ProcessOpts) -> Self {
        self.opts = opts;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Seed the store and the processed set from an earlier run's
    /// checkpoint; seeded commits are skipped, their stored blames serve as
    /// parent state for the commits that follow them. Reference counts are
    /// recomputed against the current graph, which may have grown since the
    /// checkpoint was captured. Apply options before resuming so tip
    /// retention is taken into account.
    pub fn resume_from(mut self, checkpoint: &Checkpoint) -> Self {
        let (entries, processed) = checkpoint.restore(self.interner);
        let mut store = BlameStore::new();
        for (commit, files) in entries {
            let unprocessed_children = self
                .graph
                .children(commit)
                .iter()
                .filter(|child| !processed.contains(child))
                .count();
            let live = match unprocessed_children {
                0 if self.opts.retain_tips => 1,
                n => n,
            };
            if live == 0 {
                continue;
            }
            store.register(commit, live);
            for (path, blame) in files {
                store.put(commit, path, blame, live);
            }
        }
        self.store = store;
        self.processed = processed;
        self
    }

    /// Run the traversal to completion, cancellation, or first error.
    pub fn run(&mut self) -> EngineResult<RunStats> {
        let started = Instant::now();
        let mut stats = RunStats::default();

        let order: Vec<CommitKey> = self.graph.topological_iter().collect();
        info!(
            commits = order.len(),
            resumed = self.processed.len(),
            "starting blame traversal"
        );

        for commit in order {
            if self.cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }
            if let Some(limit) = self.opts.limit {
                if stats.commits >= limit {
                    break;
                }
            }
            if self.processed.contains(&commit) {
                continue;
            }
            self.process_commit(commit, &mut stats)?;
            stats.commits += 1;
        }

        stats.elapsed = started.elapsed();
        info!("{}", stats.summary());
        Ok(stats)
    }

    /// Snapshot of the live frontier and processed set, for incremental
    /// runs.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::capture(&self.store, &self.processed, self.interner)
    }

    pub fn store(&self) -> &BlameStore {
        &self.store
    }

    /// Access the sink, e.g. to collect results after the run.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn process_commit(&mut self, commit: CommitKey, stats: &mut RunStats) -> EngineResult<()> {
        let hash = self.interner.resolve(commit).to_string();
        let parents = self.graph.parents(commit).to_vec();
        let child_count = self.graph.child_count(commit);

        for &parent in &parents {
            if self.graph.contains(parent) && !self.store.contains_commit(parent) {
                return Err(Error::GraphIntegrity {
                    commit: hash,
                    parent: self.interner.resolve(parent).to_string(),
                });
            }
        }

        let diffs = self
            .source
            .diffs_for(&hash)
            .map_err(|source| match source.downcast::<ParseError>() {
                Ok(parse) => Error::DiffParse {
                    commit: hash.clone(),
                    source: parse,
                },
                Err(source) => Error::DiffSource {
                    commit: hash.clone(),
                    source,
                },
            })?;

        let mut work: Vec<(String, Diff)> = Vec::with_capacity(diffs.len());
        for (path, diff) in diffs {
            if let Some(reason) = self.skip_path(&path) {
                debug!(%hash, %path, %reason, "path skipped");
                stats.skipped_paths += 1;
                continue;
            }
            work.push((path, diff));
        }
        work.sort_by(|a, b| a.0.cmp(&b.0));

        // Serial phase: read parent state for every task.
        let tasks: Vec<ApplyTask> = work
            .into_iter()
            .map(|(path, diff)| {
                let lookup = diff.renamed_from.as_deref().unwrap_or(&path);
                let parent_blames = parents
                    .iter()
                    .map(|&parent| self.parent_blame(parent, lookup))
                    .collect();
                ApplyTask {
                    path,
                    diff,
                    parent_blames,
                }
            })
            .collect();

        // Parallel phase: applies for distinct paths are independent.
        let applied: Vec<AppliedFile> = tasks
            .into_par_iter()
            .map(|task| {
                let parent_refs: Vec<&Blame> =
                    task.parent_blames.iter().map(Arc::as_ref).collect();
                match apply(&parent_refs, &task.diff, commit) {
                    Ok(blame) => Ok(AppliedFile {
                        blame: Arc::new(blame),
                        is_deletion: task.diff.is_deletion,
                        renamed_from: task.diff.renamed_from,
                        path: task.path,
                    }),
                    Err(source) => Err(Error::Apply {
                        commit: hash.clone(),
                        path: task.path,
                        source,
                    }),
                }
            })
            .collect::<Result<_, _>>()?;

        // Serial phase: emit in sorted path order, publish, release.
        for file in &applied {
            self.sink
                .emit(BlameRecord {
                    commit,
                    path: file.path.clone(),
                    blame: Arc::clone(&file.blame),
                })
                .map_err(|source| Error::Sink {
                    commit: hash.clone(),
                    path: file.path.clone(),
                    source,
                })?;
            stats.files += 1;
            stats.lines += file.blame.line_count();
        }

        // Tips (no children yet) are normally dropped immediately; with
        // retention on they stay live for the next incremental run.
        let live_children = match child_count {
            0 if self.opts.retain_tips => 1,
            n => n,
        };
        if live_children > 0 {
            self.store.register(commit, live_children);

            let overridden: FxHashSet<&str> = applied
                .iter()
                .map(|f| f.path.as_str())
                .chain(
                    applied
                        .iter()
                        .filter_map(|f| f.renamed_from.as_deref()),
                )
                .collect();

            if let Some(&first_parent) = parents.first() {
                let inherited: Vec<(String, Arc<Blame>)> = self
                    .store
                    .files(first_parent)
                    .filter(|(path, _, _)| !overridden.contains(path))
                    .map(|(path, blame, _)| (path.to_string(), Arc::clone(blame)))
                    .collect();
                for (path, blame) in inherited {
                    self.store.put(commit, path, blame, live_children);
                }
            }

            for file in applied {
                if file.is_deletion {
                    continue;
                }
                self.store.put(commit, file.path, file.blame, live_children);
            }
        }

        for &parent in &parents {
            if self.graph.contains(parent) {
                self.store.release_commit(parent);
            }
        }

        self.processed.insert(commit);
        Ok(())
    }

    /// Blame of `path` at `parent`. A file the parent does not carry (or a
    /// parent outside the processed slice) contributes an empty blame, so
    /// the diff applies as a creation.
    fn parent_blame(&self, parent: CommitKey, path: &str) -> Arc<Blame> {
        self.store
            .get(parent, path)
            .cloned()
            .unwrap_or_else(|| Arc::new(Blame::empty(parent)))
    }

    fn skip_path(&self, path: &str) -> Option<String> {
        if let Some(include) = &self.opts.include {
            if !include.is_match(path) {
                return Some("not matched by include filter".to_string());
            }
        }
        if let Some(exclude) = &self.opts.exclude {
            if exclude.is_match(path) {
                return Some("matched exclude filter".to_string());
            }
        }
        if self.opts.use_builtin_exclusions {
            if let Some(reason) = ignore::skip_reason(path) {
                return Some(reason.to_string());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{Hunk, HunkLocation};

    /// In-memory diff source keyed by commit hash.
    #[derive(Default)]
    struct MapSource {
        diffs: FxHashMap<String, FxHashMap<String, Diff>>,
    }

    impl MapSource {
        fn add(&mut self, commit: &str, path: &str, diff: Diff) {
            self.diffs
                .entry(commit.to_string())
                .or_default()
                .insert(path.to_string(), diff);
        }
    }

    impl DiffSource for MapSource {
        fn diffs_for(&mut self, commit: &str) -> anyhow::Result<FxHashMap<String, Diff>> {
            Ok(self.diffs.remove(commit).unwrap_or_default())
        }
    }

    /// Sink collecting resolved (commit, path, contents, attributions).
    #[derive(Default)]
    struct VecSink {
        records: Vec<BlameRecord>,
        fail_on: Option<String>,
    }

    impl Sink for VecSink {
        fn emit(&mut self, record: BlameRecord) -> anyhow::Result<()> {
            if self.fail_on.as_deref() == Some(record.path.as_str()) {
                anyhow::bail!("sink refused {}", record.path);
            }
            self.records.push(record);
            Ok(())
        }
    }

    fn single_hunk(offset: usize, lines: usize, body: &str) -> Diff {
        Diff {
            hunks: vec![Hunk {
                locations: vec![HunkLocation { offset, lines }],
                data: body.as_bytes().to_vec(),
            }],
            ..Default::default()
        }
    }

    fn resolved(
        interner: &CommitInterner,
        record: &BlameRecord,
    ) -> (String, String, Vec<(String, String)>) {
        (
            interner.resolve(record.commit).to_string(),
            record.path.clone(),
            record
                .blame
                .lines
                .iter()
                .map(|l| {
                    (
                        interner.resolve(l.commit).to_string(),
                        String::from_utf8_lossy(&l.content).to_string(),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn test_linear_history_threads_attribution() {
        let interner = CommitInterner::new();
        let a = interner.intern("A");
        let b = interner.intern("B");

        let mut graph = ParentsGraph::new();
        graph.insert(a, vec![]);
        graph.insert(b, vec![a]);

        let mut source = MapSource::default();
        source.add("A", "f.rs", single_hunk(0, 0, "+x\n+y\n"));
        source.add("B", "f.rs", single_hunk(1, 2, " x\n y\n+z\n"));

        let mut processor = Processor::new(&interner, &graph, source, VecSink::default());
        let stats = processor.run().unwrap();

        assert_eq!(stats.commits, 2);
        assert_eq!(stats.files, 2);
        assert!(processor.store().is_empty(), "store drains after the run");

        let last = resolved(&interner, &processor.sink.records[1]);
        assert_eq!(last.0, "B");
        assert_eq!(
            last.2,
            vec![
                ("A".to_string(), "x".to_string()),
                ("A".to_string(), "y".to_string()),
                ("B".to_string(), "z".to_string()),
            ]
        );
    }

    #[test]
    fn test_untouched_files_propagate_through_merges() {
        let interner = CommitInterner::new();
        let a = interner.intern("A");
        let e = interner.intern("E");
        let f = interner.intern("F");
        let m = interner.intern("M");
        let t = interner.intern("T");

        let mut graph = ParentsGraph::new();
        graph.insert(a, vec![]);
        graph.insert(e, vec![a]);
        graph.insert(f, vec![a]);
        graph.insert(m, vec![e, f]);
        graph.insert(t, vec![m]);

        let mut source = MapSource::default();
        // `quiet.rs` is created at A and never touched again until T.
        source.add("A", "quiet.rs", single_hunk(0, 0, "+q\n"));
        source.add("A", "busy.rs", single_hunk(0, 0, "+x\n"));
        source.add("E", "busy.rs", single_hunk(1, 1, " x\n+e\n"));
        source.add("F", "busy.rs", single_hunk(1, 1, " x\n+f\n"));
        source.add(
            "M",
            "busy.rs",
            Diff {
                hunks: vec![Hunk {
                    locations: vec![
                        HunkLocation { offset: 1, lines: 2 },
                        HunkLocation { offset: 1, lines: 2 },
                    ],
                    data: b"  x\n +e\n+ f\n".to_vec(),
                }],
                ..Default::default()
            },
        );
        source.add("T", "quiet.rs", single_hunk(1, 1, " q\n+t\n"));

        let mut processor = Processor::new(&interner, &graph, source, VecSink::default());
        processor.run().unwrap();
        assert!(processor.store().is_empty());

        let records: Vec<_> = processor
            .sink
            .records
            .iter()
            .map(|r| resolved(&interner, r))
            .collect();

        // quiet.rs at T still credits A for the original line.
        let quiet_at_t = records
            .iter()
            .find(|(c, p, _)| c == "T" && p == "quiet.rs")
            .expect("record for quiet.rs at T");
        assert_eq!(
            quiet_at_t.2,
            vec![
                ("A".to_string(), "q".to_string()),
                ("T".to_string(), "t".to_string()),
            ]
        );

        // busy.rs at M carries one line from each branch.
        let busy_at_m = records
            .iter()
            .find(|(c, p, _)| c == "M" && p == "busy.rs")
            .expect("record for busy.rs at M");
        assert_eq!(
            busy_at_m.2,
            vec![
                ("A".to_string(), "x".to_string()),
                ("E".to_string(), "e".to_string()),
                ("F".to_string(), "f".to_string()),
            ]
        );
    }

    #[test]
    fn test_emission_is_topological_and_path_sorted() {
        let interner = CommitInterner::new();
        let a = interner.intern("A");
        let b = interner.intern("B");

        let mut graph = ParentsGraph::new();
        graph.insert(a, vec![]);
        graph.insert(b, vec![a]);

        let mut source = MapSource::default();
        source.add("A", "zz.rs", single_hunk(0, 0, "+1\n"));
        source.add("A", "aa.rs", single_hunk(0, 0, "+1\n"));
        source.add("B", "mm.rs", single_hunk(0, 0, "+1\n"));

        let mut processor = Processor::new(&interner, &graph, source, VecSink::default());
        processor.run().unwrap();

        let seen: Vec<(String, String)> = processor
            .sink
            .records
            .iter()
            .map(|r| (interner.resolve(r.commit).to_string(), r.path.clone()))
            .collect();
        assert_eq!(
            seen,
            vec![
                ("A".to_string(), "aa.rs".to_string()),
                ("A".to_string(), "zz.rs".to_string()),
                ("B".to_string(), "mm.rs".to_string()),
            ]
        );
    }

    #[test]
    fn test_deleted_file_emits_empty_blame_and_leaves_state() {
        let interner = CommitInterner::new();
        let a = interner.intern("A");
        let b = interner.intern("B");
        let c = interner.intern("C");

        let mut graph = ParentsGraph::new();
        graph.insert(a, vec![]);
        graph.insert(b, vec![a]);
        graph.insert(c, vec![b]);

        let mut source = MapSource::default();
        source.add("A", "gone.rs", single_hunk(0, 0, "+x\n"));
        source.add("A", "kept.rs", single_hunk(0, 0, "+k\n"));
        let mut deletion = single_hunk(1, 1, "-x\n");
        deletion.is_deletion = true;
        source.add("B", "gone.rs", deletion);
        // C re-creates the path; it must apply as a creation, not inherit.
        source.add("C", "gone.rs", single_hunk(0, 0, "+fresh\n"));

        let mut processor = Processor::new(&interner, &graph, source, VecSink::default());
        processor.run().unwrap();

        let records: Vec<_> = processor
            .sink
            .records
            .iter()
            .map(|r| resolved(&interner, r))
            .collect();

        let deleted = records
            .iter()
            .find(|(c, p, _)| c == "B" && p == "gone.rs")
            .expect("deletion record");
        assert!(deleted.2.is_empty());

        let recreated = records
            .iter()
            .find(|(c, p, _)| c == "C" && p == "gone.rs")
            .expect("recreation record");
        assert_eq!(recreated.2, vec![("C".to_string(), "fresh".to_string())]);
    }

    #[test]
    fn test_rename_carries_attribution() {
        let interner = CommitInterner::new();
        let a = interner.intern("A");
        let b = interner.intern("B");
        let c = interner.intern("C");

        let mut graph = ParentsGraph::new();
        graph.insert(a, vec![]);
        graph.insert(b, vec![a]);
        graph.insert(c, vec![b]);

        let mut source = MapSource::default();
        source.add("A", "old.rs", single_hunk(0, 0, "+x\n+y\n"));
        let mut rename = single_hunk(1, 2, " x\n y\n+z\n");
        rename.renamed_from = Some("old.rs".to_string());
        source.add("B", "new.rs", rename);
        source.add("C", "new.rs", single_hunk(1, 3, " x\n y\n z\n+w\n"));

        let mut processor = Processor::new(&interner, &graph, source, VecSink::default());
        processor.run().unwrap();

        let records: Vec<_> = processor
            .sink
            .records
            .iter()
            .map(|r| resolved(&interner, r))
            .collect();
        let final_blame = records
            .iter()
            .find(|(c, p, _)| c == "C" && p == "new.rs")
            .expect("record at C");
        assert_eq!(
            final_blame.2,
            vec![
                ("A".to_string(), "x".to_string()),
                ("A".to_string(), "y".to_string()),
                ("B".to_string(), "z".to_string()),
                ("C".to_string(), "w".to_string()),
            ]
        );
    }

    #[test]
    fn test_ignored_paths_are_skipped() {
        let interner = CommitInterner::new();
        let a = interner.intern("A");

        let mut graph = ParentsGraph::new();
        graph.insert(a, vec![]);

        let mut source = MapSource::default();
        source.add("A", "go.mod", single_hunk(0, 0, "+module x\n"));
        source.add("A", "main.go", single_hunk(0, 0, "+package x\n"));

        let mut processor = Processor::new(&interner, &graph, source, VecSink::default());
        let stats = processor.run().unwrap();

        assert_eq!(stats.skipped_paths, 1);
        assert_eq!(processor.sink.records.len(), 1);
        assert_eq!(processor.sink.records[0].path, "main.go");
    }

    #[test]
    fn test_parse_failures_name_the_commit() {
        struct BadSource;
        impl DiffSource for BadSource {
            fn diffs_for(&mut self, _commit: &str) -> anyhow::Result<FxHashMap<String, Diff>> {
                Err(ParseError::MissingPath.into())
            }
        }

        let interner = CommitInterner::new();
        let a = interner.intern("A");
        let mut graph = ParentsGraph::new();
        graph.insert(a, vec![]);

        let mut processor = Processor::new(&interner, &graph, BadSource, VecSink::default());
        let err = processor.run().unwrap_err();
        match err {
            Error::DiffParse { commit, .. } => assert_eq!(commit, "A"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_sink_failure_aborts() {
        let interner = CommitInterner::new();
        let a = interner.intern("A");

        let mut graph = ParentsGraph::new();
        graph.insert(a, vec![]);

        let mut source = MapSource::default();
        source.add("A", "f.rs", single_hunk(0, 0, "+x\n"));

        let sink = VecSink {
            fail_on: Some("f.rs".to_string()),
            ..Default::default()
        };
        let mut processor = Processor::new(&interner, &graph, source, sink);
        let err = processor.run().unwrap_err();
        assert!(matches!(err, Error::Sink { .. }));
    }

    #[test]
    fn test_cancellation_stops_between_commits() {
        let interner = CommitInterner::new();
        let a = interner.intern("A");
        let b = interner.intern("B");

        let mut graph = ParentsGraph::new();
        graph.insert(a, vec![]);
        graph.insert(b, vec![a]);

        let mut source = MapSource::default();
        source.add("A", "f.rs", single_hunk(0, 0, "+x\n"));
        source.add("B", "f.rs", single_hunk(1, 1, " x\n+y\n"));

        let cancel = CancelFlag::new();
        cancel.cancel();

        let mut processor = Processor::new(&interner, &graph, source, VecSink::default())
            .with_cancel(cancel);
        let stats = processor.run().unwrap();
        assert!(stats.cancelled);
        assert_eq!(stats.commits, 0);
        assert!(processor.sink.records.is_empty());
    }

    #[test]
    fn test_limit_stops_early() {
        let interner = CommitInterner::new();
        let a = interner.intern("A");
        let b = interner.intern("B");

        let mut graph = ParentsGraph::new();
        graph.insert(a, vec![]);
        graph.insert(b, vec![a]);

        let mut source = MapSource::default();
        source.add("A", "f.rs", single_hunk(0, 0, "+x\n"));
        source.add("B", "f.rs", single_hunk(1, 1, " x\n+y\n"));

        let opts = ProcessOpts {
            limit: Some(1),
            ..Default::default()
        };
        let mut processor =
            Processor::new(&interner, &graph, source, VecSink::default()).with_opts(opts);
        let stats = processor.run().unwrap();
        assert_eq!(stats.commits, 1);
        assert_eq!(processor.sink.records.len(), 1);
    }
}
