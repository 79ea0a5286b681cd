//! Commit hash interning
//!
//! Every blame line carries the hash of the commit that introduced it, and
//! the same forty-byte hash is repeated across millions of lines. Instead of
//! storing duplicate strings we store each unique hash once and reference it
//! by a small key.
//!
//! # Memory Savings
//!
//! For a repo with 50k commits and 1M live blame lines:
//! - Without interning: 1M × 40 bytes = 40MB just for line attribution
//! - With interning: 50k × 40 bytes + 1M × 4 bytes = 6MB

use lasso::{Spur, ThreadedRodeo};

/// A commit key - small (4 bytes) reference to an interned commit hash
pub type CommitKey = Spur;

/// Thread-safe commit hash interner, shared between the graph builder,
/// the apply engine, and the sinks.
#[derive(Debug)]
pub struct CommitInterner {
    inner: ThreadedRodeo,
}

impl Default for CommitInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitInterner {
    /// Create a new interner
    pub fn new() -> Self {
        Self {
            inner: ThreadedRodeo::default(),
        }
    }

    /// Intern a commit hash, returning a key.
    /// If the hash was already interned, returns the existing key.
    #[inline]
    pub fn intern(&self, hash: &str) -> CommitKey {
        self.inner.get_or_intern(hash)
    }

    /// Get the hash for a key
    #[inline]
    pub fn resolve(&self, key: CommitKey) -> &str {
        self.inner.resolve(&key)
    }

    /// Try to get a key for an already-interned hash
    #[inline]
    pub fn get(&self, hash: &str) -> Option<CommitKey> {
        self.inner.get(hash)
    }

    /// Number of unique hashes interned
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
