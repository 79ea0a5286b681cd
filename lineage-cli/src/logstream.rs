//! Streaming diff source over `git log` output
//!
//! A reader thread splits the raw byte stream into per-commit patches on
//! the marker lines and hands them over a bounded channel, so the driver
//! applies backpressure to git instead of buffering the whole history. The
//! driver requests commits in its own topological order, which can differ
//! from git's tie-breaking, so patches that arrive early are parked in a
//! lookahead map until asked for.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::thread::{self, JoinHandle};

use anyhow::{bail, Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use lineage_engine::{parse_commit_patch, Diff, DiffSource};

use crate::gitexec::{self, COMMIT_MARKER};

/// In-flight commits between the reader thread and the driver.
const PATCH_CHANNEL_CAPACITY: usize = 64;

/// One commit's worth of raw patch bytes.
struct CommitPatch {
    hash: String,
    patch: Vec<u8>,
}

type StreamItem = Result<CommitPatch, String>;

pub struct LogDiffSource {
    rx: Option<Receiver<StreamItem>>,
    /// Patches that arrived before the driver asked for them.
    pending: FxHashMap<String, Vec<u8>>,
    /// Commits a resumed run will never request; their patches are dropped
    /// on arrival instead of parked.
    skip: FxHashSet<String>,
    reader: Option<JoinHandle<()>>,
}

impl LogDiffSource {
    /// Spawn the git log child process and its reader thread.
    pub fn spawn(
        repo_dir: &Path,
        all_branches: bool,
        since: Option<&str>,
        skip: FxHashSet<String>,
    ) -> Result<Self> {
        let mut child = gitexec::spawn_log(repo_dir, all_branches, since)?;
        let stdout = child
            .stdout
            .take()
            .context("git log child has no stdout pipe")?;

        let (tx, rx) = bounded::<StreamItem>(PATCH_CHANNEL_CAPACITY);
        let reader = thread::spawn(move || {
            if let Err(err) = read_stream(stdout, &tx) {
                let _ = tx.send(Err(err.to_string()));
            }
            // Reap the child; if the receiver hung up early the closed pipe
            // has already stopped it.
            let _ = child.wait();
        });

        Ok(Self {
            rx: Some(rx),
            pending: FxHashMap::default(),
            skip,
            reader: Some(reader),
        })
    }

    fn recv(&mut self) -> Option<StreamItem> {
        self.rx.as_ref()?.recv().ok()
    }
}

impl DiffSource for LogDiffSource {
    fn diffs_for(&mut self, commit: &str) -> anyhow::Result<FxHashMap<String, Diff>> {
        loop {
            if let Some(raw) = self.pending.remove(commit) {
                return Ok(parse_commit_patch(&raw)?);
            }
            match self.recv() {
                Some(Ok(patch)) => {
                    if patch.hash == commit {
                        return Ok(parse_commit_patch(&patch.patch)?);
                    }
                    if self.skip.contains(&patch.hash) {
                        continue;
                    }
                    debug!(arrived = %patch.hash, wanted = %commit, "parking out-of-order patch");
                    self.pending.insert(patch.hash, patch.patch);
                }
                Some(Err(err)) => bail!("git log stream failed: {err}"),
                None => bail!("git log stream ended before commit {commit}"),
            }
        }
    }
}

impl Drop for LogDiffSource {
    fn drop(&mut self) {
        // Disconnect first so a reader blocked on a full channel can exit,
        // then join it.
        self.rx.take();
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}

/// Split the log byte stream into per-commit patches at the marker lines.
fn read_stream<R: Read>(input: R, tx: &Sender<StreamItem>) -> Result<()> {
    let mut reader = BufReader::new(input);
    let mut line = Vec::new();
    let mut current: Option<CommitPatch> = None;

    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line)?;
        if read == 0 {
            break;
        }
        if let Some(rest) = line.strip_prefix(COMMIT_MARKER) {
            if let Some(done) = current.take() {
                if tx.send(Ok(done)).is_err() {
                    // Receiver is gone; stop reading.
                    return Ok(());
                }
            }
            let header = String::from_utf8_lossy(rest);
            let hash = header
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
            current = Some(CommitPatch {
                hash,
                patch: Vec::new(),
            });
        } else if let Some(patch) = current.as_mut() {
            patch.patch.extend_from_slice(&line);
        }
    }

    if let Some(done) = current.take() {
        let _ = tx.send(Ok(done));
    }
    Ok(())
}
