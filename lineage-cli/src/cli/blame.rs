//! The blame command: wire the git plumbing to the engine and stream
//! records to the selected reporter.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use git2::Repository;
use regex::Regex;
use rustc_hash::FxHashSet;
use tracing::info;

use lineage_engine::{Checkpoint, CommitInterner, ProcessOpts, Processor, RunStats};

use crate::graph_source;
use crate::logstream::LogDiffSource;
use crate::report::ReportSink;
use crate::gitexec;

const CHECKPOINT_FILE: &str = "frontier.json";

#[derive(Debug)]
pub struct BlameArgs {
    pub format: String,
    pub output: Option<PathBuf>,
    pub all_branches: bool,
    pub since: Option<String>,
    pub limit: Option<usize>,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub no_default_excludes: bool,
    pub checkpoint_dir: Option<PathBuf>,
}

impl Default for BlameArgs {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            output: None,
            all_branches: false,
            since: None,
            limit: None,
            include: None,
            exclude: None,
            no_default_excludes: false,
            checkpoint_dir: None,
        }
    }
}

pub fn run(path: &Path, args: BlameArgs) -> Result<()> {
    let stats = match &args.output {
        Some(file) => {
            let writer = BufWriter::new(
                File::create(file)
                    .with_context(|| format!("Failed to create output file {:?}", file))?,
            );
            execute(path, &args, writer)?
        }
        None => execute(path, &args, io::stdout().lock())?,
    };
    info!("{}", stats.summary());
    Ok(())
}

/// Run the traversal, writing records to `writer`. Factored from `run` so
/// tests can capture output in memory.
pub fn execute<W: Write>(path: &Path, args: &BlameArgs, writer: W) -> Result<RunStats> {
    gitexec::prepare()?;

    let repo = Repository::discover(path)
        .with_context(|| format!("Failed to open git repository at {:?}", path))?;
    let workdir = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

    let interner = CommitInterner::new();
    let graph =
        graph_source::build_parents_graph(&repo, &interner, args.all_branches, args.since.as_deref())?;
    info!(commits = graph.len(), "commit graph ready");

    let checkpoint_file = args
        .checkpoint_dir
        .as_ref()
        .map(|dir| dir.join(CHECKPOINT_FILE));
    let checkpoint = match &checkpoint_file {
        Some(file) if file.exists() => {
            let loaded = Checkpoint::load(file)?;
            info!(
                processed = loaded.processed.len(),
                frontier = loaded.frontier.len(),
                "resuming from checkpoint"
            );
            Some(loaded)
        }
        _ => None,
    };
    let skip: FxHashSet<String> = checkpoint
        .as_ref()
        .map(|c| c.processed.iter().cloned().collect())
        .unwrap_or_default();

    let source = LogDiffSource::spawn(&workdir, args.all_branches, args.since.as_deref(), skip)?;
    let sink = match args.format.as_str() {
        "json" => ReportSink::json(writer, &interner),
        "text" => ReportSink::text(writer, &interner),
        other => bail!("unsupported output format {other:?}"),
    };

    let opts = ProcessOpts {
        include: compile_filter(args.include.as_deref(), "--include")?,
        exclude: compile_filter(args.exclude.as_deref(), "--exclude")?,
        use_builtin_exclusions: !args.no_default_excludes,
        limit: args.limit,
        // Branch tips must outlive the run so the next incremental run can
        // build on them.
        retain_tips: checkpoint_file.is_some(),
    };

    let mut processor = Processor::new(&interner, &graph, source, sink).with_opts(opts);
    if let Some(checkpoint) = &checkpoint {
        processor = processor.resume_from(checkpoint);
    }
    let stats = processor.run()?;

    if let Some(file) = &checkpoint_file {
        processor.checkpoint().save(file)?;
        info!(?file, "checkpoint saved");
    }
    Ok(stats)
}

fn compile_filter(pattern: Option<&str>, flag: &str) -> Result<Option<Regex>> {
    pattern
        .map(|p| Regex::new(p).with_context(|| format!("Invalid {flag} pattern {p:?}")))
        .transpose()
}
