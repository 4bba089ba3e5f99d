//! Reclaim - Build Artifact Purger
//!
//! Reclaim finds directories that a build or dependency tool can regenerate
//! (`node_modules`, `target`, `.venv`, ...) and removes them to free disk space.
//! A marker directory only counts when its parent also holds one of the
//! ecosystem's manifest files, so a stray folder called `target` is left alone.
//!
//! ## Pipeline
//!
//! 1. [`scanner::scan_tree`] walks the tree on a bounded thread pool and never
//!    descends into a directory once it has matched.
//! 2. [`scanner::TaskAggregator`] collects matches and their sizes.
//! 3. [`confirm::gate`] applies the dry-run/force flags or asks the user.
//! 4. [`purge::purge`] removes (or reports) every task in parallel.
//!
//! [`pipeline::run`] wires these together for one invocation.

/// `println!` that ignores a closed stdout (e.g. output piped into `head`)
macro_rules! say {
    ($($arg:tt)*) => {{
        use std::io::Write as _;
        let _ = writeln!(std::io::stdout(), $($arg)*);
    }};
}

pub mod config;
pub mod confirm;
pub mod error;
pub mod logging;
pub mod patterns;
pub mod pipeline;
pub mod purge;
pub mod scanner;

// Re-export commonly used items
pub use config::{RunConfig, DEFAULT_WORKERS};
pub use confirm::{gate, Confirm, Decision, StdinConfirm};
pub use error::{ReclaimError, Result};
pub use patterns::{PatternEntry, PatternTable};
pub use pipeline::{run, RunOutcome};
pub use purge::{purge, PurgeReport};
pub use scanner::{directory_size, scan_tree, DeletionTask, ScanReport, TaskAggregator};
