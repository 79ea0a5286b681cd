//! Git child-process plumbing
//!
//! libgit2 covers repository discovery, the commit graph, and branch
//! metadata, but it does not produce the combined (`--cc`) patch format the
//! diff parser consumes, so the patch stream comes from a `git log` child
//! process.

use std::path::Path;
use std::process::{Child, Command, Stdio};

use anyhow::{ensure, Context, Result};
use tracing::debug;

/// Marker prefixed to each commit header line of the log stream; `%x01`
/// cannot appear in patch text, so splitting on it is unambiguous.
pub const COMMIT_MARKER: &[u8] = b"\x01commit\x01 ";

/// Verify a usable git binary before spawning the long-lived log process.
pub fn prepare() -> Result<()> {
    let output = Command::new("git")
        .arg("version")
        .output()
        .context("Failed to run git; is it installed and on PATH?")?;
    ensure!(
        output.status.success(),
        "git version exited with {}",
        output.status
    );
    debug!(
        version = %String::from_utf8_lossy(&output.stdout).trim(),
        "git binary ready"
    );
    Ok(())
}

/// Spawn `git log` producing, oldest first, one marker line per commit
/// followed by its patch. `-c` (not `--cc`) for merges: the dense form
/// drops hunks where the result picks one parent's variant unmodified,
/// which are exactly the rows that attribute cleanly merged lines to
/// their side branch.
pub fn spawn_log(repo_dir: &Path, all_branches: bool, since: Option<&str>) -> Result<Child> {
    let mut cmd = Command::new("git");
    cmd.current_dir(repo_dir)
        .arg("log")
        .arg("--topo-order")
        .arg("--reverse")
        .arg("--no-abbrev")
        .arg("--no-color")
        .arg("-p")
        .arg("-c")
        .arg("-M")
        .arg("--pretty=format:%x01commit%x01 %H");
    if all_branches {
        cmd.arg("--branches").arg("HEAD");
    }
    if let Some(since) = since {
        cmd.arg("--not").arg(since);
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    debug!(?repo_dir, all_branches, ?since, "spawning git log stream");
    cmd.spawn()
        .with_context(|| format!("Failed to spawn git log in {:?}", repo_dir))
}
