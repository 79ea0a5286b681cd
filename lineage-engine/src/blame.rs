//! Blame data model
//!
//! A [`Blame`] is the full authorship state of one file at one commit: an
//! ordered sequence of lines, each annotated with the commit that introduced
//! it. Blames are produced by the apply engine and owned by the blame store;
//! line content is reference-counted so that a child commit inheriting an
//! unchanged file shares the parent's allocations.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::intern::{CommitInterner, CommitKey};

/// A single line of a file: its content and the commit that introduced it.
///
/// Two lines are equal only if both the content bytes and the introducing
/// commit match; duplicate content from different commits stays distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Raw line content, without the trailing newline.
    pub content: Arc<[u8]>,
    /// Commit that introduced this line.
    pub commit: CommitKey,
}

impl Line {
    pub fn new(content: impl Into<Arc<[u8]>>, commit: CommitKey) -> Self {
        Self {
            content: content.into(),
            commit,
        }
    }
}

/// Authorship state of one file at one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blame {
    /// Commit at which this blame state was produced.
    pub commit: CommitKey,
    /// Binary files carry no lines and accept no further diffs.
    pub is_binary: bool,
    /// Ordered file lines, 0-indexed.
    pub lines: Vec<Line>,
}

impl Blame {
    /// Blame of a file with no content. Distinct from the absence of the
    /// file: an empty file exists and has zero lines.
    pub fn empty(commit: CommitKey) -> Self {
        Self {
            commit,
            is_binary: false,
            lines: Vec::new(),
        }
    }

    /// Blame of a binary file.
    pub fn binary(commit: CommitKey) -> Self {
        Self {
            commit,
            is_binary: true,
            lines: Vec::new(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Compact one-line-per-entry rendering, resolving commit keys through
    /// the interner. Useful in tests to see output.
    pub fn describe(&self, interner: &CommitInterner) -> String {
        let mut out = String::new();
        out.push_str(interner.resolve(self.commit));
        if self.is_binary {
            out.push_str("\nbinary");
            return out;
        }
        if self.lines.is_empty() {
            out.push_str("\nempty");
            return out;
        }
        for (i, line) in self.lines.iter().enumerate() {
            let _ = write!(
                out,
                "\n{}:{}:{}",
                i,
                interner.resolve(line.commit),
                String::from_utf8_lossy(&line.content)
            );
        }
        out
    }
}
