//! One end-to-end run: scan, summarize, confirm, purge.

use crate::config::RunConfig;
use crate::confirm::{gate, Confirm, Decision};
use crate::error::Result;
use crate::patterns::PatternTable;
use crate::purge::{purge, PurgeReport};
use crate::scanner::{scan_tree, DeletionTask};

use colored::Colorize;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const CONFIRM_PROMPT: &str = "Are you sure you want to delete?";

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing under the root matched
    NothingFound { scanned_dirs: u64 },
    /// The user said no; nothing was touched
    Declined { found: usize, total_bytes: u64 },
    /// Tasks were removed, or reported in a dry run
    Completed(PurgeReport),
}

/// Drive a full run for `config`.
///
/// Returns `Err` only for fatal setup problems such as a missing root.
/// Declining the prompt is a normal outcome.
pub fn run<C>(config: &RunConfig, table: &PatternTable, confirm: &mut C) -> Result<RunOutcome>
where
    C: Confirm + ?Sized,
{
    say!("Starting cleanup in: {}", config.root.display());
    if config.dry_run {
        say!("Running in dry-run mode. No files will be deleted.");
    }

    let progress = scan_spinner();
    let scanned = scan_tree(config, table, Some(&progress), |task| {
        progress.suspend(|| announce(task));
    });
    progress.finish_and_clear();
    let report = scanned?;

    if report.is_empty() {
        say!("\nNo directories found to clean up.");
        return Ok(RunOutcome::NothingFound {
            scanned_dirs: report.scanned_dirs,
        });
    }

    say!("\nScanned a total of {} directories.", report.scanned_dirs);

    if !config.dry_run && !config.force {
        say!(
            "{}",
            format!(
                "Found {} directories to clean up. Total size: {}",
                report.tasks.len(),
                format_size(report.total_bytes, BINARY)
            )
            .bold()
        );
    }

    if gate(config, confirm, CONFIRM_PROMPT) == Decision::Abort {
        say!("Aborting cleanup.");
        return Ok(RunOutcome::Declined {
            found: report.tasks.len(),
            total_bytes: report.total_bytes,
        });
    }

    let purged = purge(&report.tasks, config.dry_run);

    say!(
        "Total cleaned up size: {}",
        format_size(purged.reclaimed_bytes, BINARY).bold().green()
    );
    if purged.failed > 0 {
        say!(
            "{}",
            format!("{} directories could not be removed", purged.failed).yellow()
        );
    }
    if config.dry_run {
        say!("Dry run mode: No files were deleted.");
    }

    Ok(RunOutcome::Completed(purged))
}

fn announce(task: &DeletionTask) {
    let name = task
        .path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    say!(
        "Identified {} directory for cleanup at {}, will free up {}.",
        name.cyan(),
        task.path.display(),
        format_size(task.size, BINARY)
    );
}

/// Spinner on stderr; indicatif hides it when stderr is not a terminal
fn scan_spinner() -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        progress.set_style(style);
    }
    progress.set_message("Scanning...");
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}
