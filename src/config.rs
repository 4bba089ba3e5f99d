//! Per-invocation run configuration.

use std::path::PathBuf;

/// Number of walker threads used when none is requested.
///
/// Traversal is I/O bound; more threads than this rarely helps and can
/// exhaust file descriptors on very wide trees.
pub const DEFAULT_WORKERS: usize = 16;

/// Capacity of the queue between walker threads and the aggregator
pub const RESULT_BUFFER: usize = 1000;

/// Options for one run, fixed for its whole duration
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub root: PathBuf,
    /// Report only, never touch the filesystem
    pub dry_run: bool,
    /// Skip the confirmation prompt
    pub force: bool,
    pub workers: usize,
}

impl RunConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
            force: false,
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Set the walker pool size. Zero is treated as one.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}
