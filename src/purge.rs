//! Concurrent removal (or simulated removal) of deletion tasks.

use crate::scanner::DeletionTask;

use colored::Colorize;
use humansize::{format_size, BINARY};
use rayon::prelude::*;
use std::fs;
use tracing::warn;

/// How a single task was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    Removed,
    Simulated,
    Failed,
}

/// Aggregate result of a purge
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    /// Bytes of tasks actually (or, in a dry run, notionally) removed
    pub reclaimed_bytes: u64,
    pub removed: usize,
    pub simulated: usize,
    pub failed: usize,
}

impl PurgeReport {
    fn record(mut self, outcome: PurgeOutcome, size: u64) -> Self {
        match outcome {
            PurgeOutcome::Removed => {
                self.removed += 1;
                self.reclaimed_bytes += size;
            }
            PurgeOutcome::Simulated => {
                self.simulated += 1;
                self.reclaimed_bytes += size;
            }
            PurgeOutcome::Failed => self.failed += 1,
        }
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            reclaimed_bytes: self.reclaimed_bytes + other.reclaimed_bytes,
            removed: self.removed + other.removed,
            simulated: self.simulated + other.simulated,
            failed: self.failed + other.failed,
        }
    }
}

/// Remove every task's directory in parallel, or only report them when `dry_run`.
///
/// A failing task is logged and contributes nothing; it never stops the others.
/// Returns once every task has been resolved.
pub fn purge(tasks: &[DeletionTask], dry_run: bool) -> PurgeReport {
    tasks
        .par_iter()
        .map(|task| (purge_one(task, dry_run), task.size))
        .fold(PurgeReport::default, |report, (outcome, size)| {
            report.record(outcome, size)
        })
        .reduce(PurgeReport::default, PurgeReport::merge)
}

fn purge_one(task: &DeletionTask, dry_run: bool) -> PurgeOutcome {
    if dry_run {
        say!(
            "Would clean up: {} ({})",
            task.path.display(),
            format_size(task.size, BINARY)
        );
        return PurgeOutcome::Simulated;
    }

    match fs::remove_dir_all(&task.path) {
        Ok(()) => {
            say!(
                "{} {} ({})",
                "Removed:".green(),
                task.path.display(),
                format_size(task.size, BINARY)
            );
            PurgeOutcome::Removed
        }
        Err(err) => {
            warn!(path = %task.path.display(), error = %err, "failed to remove directory");
            PurgeOutcome::Failed
        }
    }
}
