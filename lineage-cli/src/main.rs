//! Lineage - per-line authorship for every commit
//!
//! Walks a repository's commit DAG in topological order and streams, for
//! every commit and every file it touched, the blame of that file: each
//! line annotated with the commit that introduced it.

mod branches;
mod cli;
mod discover;
mod gitexec;
mod graph_source;
mod logstream;
mod report;
#[cfg(test)]
mod test_repo;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    // Parse CLI args and run
    let cli = cli::Cli::parse();
    cli::run(cli)
}
