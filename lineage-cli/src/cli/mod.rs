//! CLI command definitions and handlers

mod blame;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::{branches, discover};

/// Lineage - incremental per-line authorship
///
/// Streams, for every commit and every file it touched, the blame of that
/// file as of that commit.
#[derive(Parser, Debug)]
#[command(name = "lineage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to repository (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk history and stream per-file blame for every commit
    Blame {
        /// Output format
        #[arg(long, short = 'f', default_value = "json", value_parser = ["json", "text"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Process all local branches instead of HEAD only
        #[arg(long)]
        all_branches: bool,

        /// Process only commits after this one (exclusive)
        #[arg(long)]
        since: Option<String>,

        /// Stop after this many commits
        #[arg(long)]
        limit: Option<usize>,

        /// Only process paths matching this regex
        #[arg(long)]
        include: Option<String>,

        /// Drop paths matching this regex
        #[arg(long)]
        exclude: Option<String>,

        /// Disable the built-in lockfile/vendor/media exclusions
        #[arg(long)]
        no_default_excludes: bool,

        /// Directory holding the incremental checkpoint; created on first
        /// run, consumed and refreshed on later runs
        #[arg(long)]
        checkpoint_dir: Option<PathBuf>,
    },

    /// List branches with tip commit and committer time
    Branches {
        /// List origin/ remote refs instead of local heads
        #[arg(long)]
        origin: bool,

        /// Include the default branch
        #[arg(long)]
        include_default: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find git repositories under the given path
    Discover,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Blame {
            format,
            output,
            all_branches,
            since,
            limit,
            include,
            exclude,
            no_default_excludes,
            checkpoint_dir,
        }) => blame::run(
            &cli.path,
            blame::BlameArgs {
                format,
                output,
                all_branches,
                since,
                limit,
                include,
                exclude,
                no_default_excludes,
                checkpoint_dir,
            },
        ),

        Some(Commands::Branches {
            origin,
            include_default,
            json,
        }) => run_branches(&cli.path, origin, include_default, json),

        Some(Commands::Discover) => {
            for repo in discover::find_repositories(&cli.path) {
                println!("{}", repo.display());
            }
            Ok(())
        }

        // Default: stream blame as JSON to stdout.
        None => blame::run(&cli.path, blame::BlameArgs::default()),
    }
}

fn run_branches(path: &PathBuf, origin: bool, include_default: bool, json: bool) -> Result<()> {
    let repo = git2::Repository::discover(path)?;
    let list = branches::list(&repo, origin, include_default)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        for branch in list {
            println!(
                "{}  {}  {}",
                &branch.commit[..branch.commit.len().min(12)],
                branch.committer_time,
                branch.name
            );
        }
    }
    Ok(())
}
