//! Error types for the blame engine
//!
//! Apply-time failures are fatal for the file's lineage and diff failures
//! are fatal for the commit; the driver attaches the commit hash and path
//! before surfacing them. The engine never fabricates an empty blame to
//! paper over a failed apply.

use thiserror::Error;

/// Errors raised while parsing a commit's raw patch bytes into diffs.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed hunk header: {0:?}")]
    BadHunkHeader(String),

    #[error("hunk body line has {got} bytes but the hunk has {expected} op columns")]
    ShortBodyLine { expected: usize, got: usize },

    #[error("hunk body line outside of any file entry")]
    BodyOutsideFile,

    #[error("diff entry has no resolvable path")]
    MissingPath,
}

/// Errors raised while applying one file's diff to its parent blames.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("hunk index {index} outside parent blame of {len} lines")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unrecognized op prefix {op:?} in hunk body")]
    InvalidOpPrefix { op: char },

    #[error("text diff applied to a binary parent blame")]
    BinaryParent,

    #[error("hunk has no parent location")]
    MissingLocation,

    #[error("hunk carries {got} parent locations, expected {expected}")]
    LocationCount { expected: usize, got: usize },

    #[error("hunk body line is empty")]
    EmptyHunkLine,

    #[error("hunk body line has {got} bytes but the diff has {expected} op columns")]
    TruncatedHunkLine { expected: usize, got: usize },

    #[error("unrecognized escape line in hunk body: {0:?}")]
    InvalidEscapeLine(String),
}

/// Top-level engine error, with commit and path context attached by the
/// driver.
#[derive(Debug, Error)]
pub enum Error {
    #[error("commit {commit}: failed to parse diff: {source}")]
    DiffParse {
        commit: String,
        #[source]
        source: ParseError,
    },

    #[error("commit {commit}: diff source failed: {source}")]
    DiffSource {
        commit: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("commit {commit} path {path}: {source}")]
    Apply {
        commit: String,
        path: String,
        #[source]
        source: ApplyError,
    },

    #[error("commit {commit}: blame state for parent {parent} missing from store")]
    GraphIntegrity { commit: String, parent: String },

    #[error("sink rejected record for commit {commit} path {path}: {source}")]
    Sink {
        commit: String,
        path: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type EngineResult<T> = Result<T, Error>;
