//! Patch application against parent blames
//!
//! Produces a commit's [`Blame`] for one file from the blames of the
//! commit's parents and the commit's diff for that file. Two shapes:
//!
//! - **single-parent**: walk the parent's lines and the sorted hunks in
//!   lockstep, copying untouched lines through with their original
//!   attribution and stamping added lines with the new commit;
//! - **merge**: start from a copy of the first parent's lines and replay
//!   the combined diff, attributing each surviving line to the parent it
//!   was taken from, or to the merge commit itself for lines no parent
//!   carries (conflict resolutions).
//!
//! In a combined hunk row with one op column per parent, `-` in column `k`
//! means "present in parent `k`, absent from the result", so any row
//! containing a `-` is not part of the result at all. The per-parent
//! cursors and the output cursor below follow from that reading.
//!
//! `apply` is a pure function of its inputs; all failures are explicit
//! [`ApplyError`]s.

use crate::blame::{Blame, Line};
use crate::diff::{Diff, Hunk};
use crate::error::ApplyError;
use crate::intern::CommitKey;

const NO_NEWLINE_MARKER: &[u8] = b" No newline at end of file";

/// Produce the blame of a file at `commit` from its parents' blames and
/// the commit's diff for that file.
///
/// Dispatch: a binary diff yields a binary blame regardless of parents; a
/// text diff against a binary parent is a hard error; zero parents means
/// the diff applies against an empty file; two or more parents take the
/// combined-diff path.
pub fn apply(parents: &[&Blame], diff: &Diff, commit: CommitKey) -> Result<Blame, ApplyError> {
    if diff.is_binary {
        return Ok(Blame::binary(commit));
    }
    if parents.iter().any(|p| p.is_binary) {
        return Err(ApplyError::BinaryParent);
    }

    match parents {
        [] => {
            let empty = Blame::empty(commit);
            apply_single(&empty, diff, commit)
        }
        [parent] => apply_single(parent, diff, commit),
        _ => apply_merge(parents, diff, commit),
    }
}

/// Single-parent apply: hunks ascending by parent offset, one cursor into
/// the parent's lines.
fn apply_single(parent: &Blame, diff: &Diff, commit: CommitKey) -> Result<Blame, ApplyError> {
    let mut hunks: Vec<&Hunk> = diff.hunks.iter().collect();
    hunks.sort_by_key(|h| h.locations.first().map(|l| l.offset).unwrap_or(0));

    let mut out: Vec<Line> = Vec::with_capacity(parent.lines.len());
    let mut old_index = 0usize;

    for hunk in hunks {
        let loc = hunk.locations.first().ok_or(ApplyError::MissingLocation)?;

        // Git's offsets are 1-based; 0 marks an empty parent side.
        let hunk_start = loc.offset.saturating_sub(1);
        if hunk_start < old_index || hunk_start > parent.lines.len() {
            return Err(ApplyError::IndexOutOfRange {
                index: hunk_start,
                len: parent.lines.len(),
            });
        }
        out.extend_from_slice(&parent.lines[old_index..hunk_start]);
        old_index = hunk_start;

        for raw in hunk_body(&hunk.data) {
            let (&op, data) = raw.split_first().ok_or(ApplyError::EmptyHunkLine)?;
            match op {
                b' ' | b'\t' => {
                    let line =
                        parent
                            .lines
                            .get(old_index)
                            .ok_or(ApplyError::IndexOutOfRange {
                                index: old_index,
                                len: parent.lines.len(),
                            })?;
                    out.push(line.clone());
                    old_index += 1;
                }
                b'-' => {
                    if old_index >= parent.lines.len() {
                        return Err(ApplyError::IndexOutOfRange {
                            index: old_index,
                            len: parent.lines.len(),
                        });
                    }
                    old_index += 1;
                }
                b'+' => out.push(Line::new(data, commit)),
                b'\\' => {
                    if data != NO_NEWLINE_MARKER {
                        return Err(ApplyError::InvalidEscapeLine(
                            String::from_utf8_lossy(raw).to_string(),
                        ));
                    }
                }
                other => {
                    return Err(ApplyError::InvalidOpPrefix { op: other as char });
                }
            }
        }
    }

    out.extend_from_slice(&parent.lines[old_index..]);

    Ok(Blame {
        commit,
        is_binary: false,
        lines: out,
    })
}

/// Merge apply: replay an n-parent combined diff on top of the first
/// parent's lines. Hunks are applied in descending offset order so that
/// earlier indices stay valid while the buffer is edited in place.
fn apply_merge(parents: &[&Blame], diff: &Diff, commit: CommitKey) -> Result<Blame, ApplyError> {
    let columns = parents.len();
    let base = parents[0];
    let mut res: Vec<Line> = base.lines.clone();

    let mut hunks: Vec<&Hunk> = diff.hunks.iter().collect();
    hunks.sort_by_key(|h| {
        std::cmp::Reverse(h.locations.first().map(|l| l.offset).unwrap_or(0))
    });

    for hunk in hunks {
        if hunk.locations.len() != columns {
            return Err(ApplyError::LocationCount {
                expected: columns,
                got: hunk.locations.len(),
            });
        }

        // Cursor k points at the parent-k index of the most recent row that
        // parent k carries; it starts one before the hunk and advances as
        // rows belonging to parent k go by.
        let mut cursors: Vec<isize> = hunk
            .locations
            .iter()
            .map(|l| l.offset as isize - 2)
            .collect();
        let mut at = hunk.locations[0].offset.saturating_sub(1);

        for raw in hunk_body(&hunk.data) {
            if raw.first() == Some(&b'\\') {
                continue;
            }
            if raw.len() < columns {
                return Err(ApplyError::TruncatedHunkLine {
                    expected: columns,
                    got: raw.len(),
                });
            }
            let (ops, data) = raw.split_at(columns);

            // A row with any `-` is absent from the result; its `-` columns
            // name the parents that carry it, and its ` ` columns the
            // parents that never had it.
            let removed_row = ops.contains(&b'-');

            for (k, &op) in ops.iter().enumerate().skip(1) {
                match op {
                    b' ' | b'\t' => {
                        if !removed_row {
                            cursors[k] += 1;
                        }
                    }
                    b'-' => cursors[k] += 1,
                    b'+' => {}
                    other => {
                        return Err(ApplyError::InvalidOpPrefix { op: other as char });
                    }
                }
            }

            match ops[0] {
                b' ' | b'\t' => {
                    // Only rows the result keeps occupy an output slot.
                    if !removed_row {
                        at += 1;
                    }
                }
                b'-' => {
                    if at >= res.len() {
                        return Err(ApplyError::IndexOutOfRange {
                            index: at,
                            len: res.len(),
                        });
                    }
                    res.remove(at);
                }
                b'+' => {
                    let attributed = attribute_added_line(parents, ops, &cursors)?;
                    if at > res.len() {
                        return Err(ApplyError::IndexOutOfRange {
                            index: at,
                            len: res.len(),
                        });
                    }
                    res.insert(at, Line::new(data, attributed.unwrap_or(commit)));
                    at += 1;
                }
                other => {
                    return Err(ApplyError::InvalidOpPrefix { op: other as char });
                }
            }
        }
    }

    Ok(Blame {
        commit,
        is_binary: false,
        lines: res,
    })
}

/// A line added relative to the mainline but unchanged from some other
/// parent inherits that parent's attribution; the highest such parent
/// wins. A line no parent carries was written by the merge itself.
fn attribute_added_line(
    parents: &[&Blame],
    ops: &[u8],
    cursors: &[isize],
) -> Result<Option<CommitKey>, ApplyError> {
    for k in (1..ops.len()).rev() {
        if ops[k] != b' ' && ops[k] != b'\t' {
            continue;
        }
        let index = cursors[k];
        let lines = &parents[k].lines;
        if index < 0 || index as usize >= lines.len() {
            return Err(ApplyError::IndexOutOfRange {
                index: index.max(0) as usize,
                len: lines.len(),
            });
        }
        return Ok(Some(lines[index as usize].commit));
    }
    Ok(None)
}

/// Split a hunk body into its lines, dropping the artifact of the trailing
/// newline.
fn hunk_body(data: &[u8]) -> impl Iterator<Item = &[u8]> + '_ {
    let end = match data.last() {
        Some(b'\n') => data.len() - 1,
        _ => data.len(),
    };
    let trimmed = &data[..end];
    let empty = trimmed.is_empty();
    trimmed.split(|&b| b == b'\n').filter(move |_| !empty)
}
