use anyhow::{Context, Result};
use clap::Parser;
use reclaim::{logging, pipeline, PatternTable, RunConfig, StdinConfirm, DEFAULT_WORKERS};
use std::env;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find and remove regenerable build-artifact directories (node_modules, target, .venv, ...)",
    long_about = None
)]
struct Args {
    /// Directory to clean (defaults to current directory)
    path: Option<PathBuf>,

    /// Report what would be removed without deleting anything
    #[arg(long, short)]
    dry_run: bool,

    /// Delete without asking for confirmation
    #[arg(long, short)]
    force: bool,

    /// Show debug diagnostics on stderr
    #[arg(long, short)]
    verbose: bool,

    /// Number of scanning threads
    #[arg(long, short = 'j', default_value_t = DEFAULT_WORKERS)]
    threads: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::setup_logging(args.verbose);

    let root = match args.path {
        Some(path) => path,
        None => env::current_dir().context("Failed to determine current directory")?,
    };

    let table = PatternTable::builtin().context("Failed to load built-in artifact patterns")?;
    let config = RunConfig::new(root)
        .dry_run(args.dry_run)
        .force(args.force)
        .workers(args.threads);

    pipeline::run(&config, &table, &mut StdinConfirm)
        .with_context(|| format!("Failed to clean {}", config.root.display()))?;

    Ok(())
}
