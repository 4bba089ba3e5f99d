//! Concurrent tree scanning and deletion-task aggregation.

use crate::config::{RunConfig, RESULT_BUFFER};
use crate::error::{ReclaimError, Result};
use crate::patterns::PatternTable;

use crossbeam_channel::{bounded, Sender};
use ignore::{DirEntry, WalkBuilder, WalkState};
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// VCS internal directories that are never traversed
pub const VCS_INTERNALS: &[&str] = &[
    ".git", ".jj", ".svn", ".hg", ".bzr", "_darcs", ".pijul", "CVS", ".fossil",
];

/// A directory marked for removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionTask {
    /// Absolute path of the directory
    pub path: PathBuf,
    /// Bytes held by regular files under `path` at scan time
    pub size: u64,
}

/// Everything the scanner found under one root
#[derive(Debug, Default)]
pub struct ScanReport {
    /// In completion order, not traversal order
    pub tasks: Vec<DeletionTask>,
    pub total_bytes: u64,
    pub scanned_dirs: u64,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Single writer for the task list and running byte total.
#[derive(Debug, Default)]
pub struct TaskAggregator {
    tasks: Vec<DeletionTask>,
    total_bytes: u64,
}

impl TaskAggregator {
    pub fn push(&mut self, task: DeletionTask) {
        self.total_bytes += task.size;
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn finish(self, scanned_dirs: u64) -> ScanReport {
        ScanReport {
            tasks: self.tasks,
            total_bytes: self.total_bytes,
            scanned_dirs,
        }
    }
}

/// Check that the root exists and is a directory, and make it absolute
pub fn resolve_root(root: &Path) -> Result<PathBuf> {
    let metadata = fs::metadata(root).map_err(|source| ReclaimError::RootUnavailable {
        path: root.to_path_buf(),
        source,
    })?;

    if !metadata.is_dir() {
        return Err(ReclaimError::RootNotDirectory {
            path: root.to_path_buf(),
        });
    }

    root.canonicalize()
        .map_err(|source| ReclaimError::RootUnavailable {
            path: root.to_path_buf(),
            source,
        })
}

/// Sum the sizes of all regular files under `path`.
///
/// Symlinks are not followed and count as zero. Any unreadable entry aborts the
/// whole computation so a vanished subtree is never silently under-reported.
pub fn directory_size(path: &Path) -> Result<u64> {
    let mut total = 0u64;

    for entry in WalkDir::new(path).follow_links(false) {
        let entry = entry.map_err(|source| ReclaimError::Measure {
            path: path.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_file() {
            let metadata = entry.metadata().map_err(|source| ReclaimError::Measure {
                path: path.to_path_buf(),
                source,
            })?;
            total += metadata.len();
        }
    }

    Ok(total)
}

/// Walk `config.root` with a bounded pool of walker threads and collect every
/// outermost directory that matches `table`.
///
/// Matched directories are sized and then skipped, so nothing beneath them is
/// ever read. `on_match` runs on the calling thread once per task, in
/// completion order. Only a bad root is fatal; per-path failures are logged
/// and the walk carries on. `progress`, when given, gets a running count of
/// scanned directories.
///
/// VCS metadata directories ([`VCS_INTERNALS`]) below the root are never
/// entered, so a matching folder inside e.g. `.git` is not reported.
pub fn scan_tree<F>(
    config: &RunConfig,
    table: &PatternTable,
    progress: Option<&ProgressBar>,
    mut on_match: F,
) -> Result<ScanReport>
where
    F: FnMut(&DeletionTask),
{
    let root = resolve_root(&config.root)?;
    debug!(root = %root.display(), workers = config.workers, "starting scan");

    let (sender, receiver) = bounded::<DeletionTask>(RESULT_BUFFER);
    let scanned = AtomicU64::new(0);
    let workers = config.workers;
    let mut aggregator = TaskAggregator::default();

    thread::scope(|scope| {
        let scanned = &scanned;

        // The walker owns the only original sender; once `run` returns, every
        // clone has been dropped and the receiver loop below ends.
        scope.spawn(move || {
            let walker = WalkBuilder::new(&root)
                .hidden(false)
                // Every directory must be visited; ignore files would hide
                // exactly the folders we are looking for
                .parents(false)
                .ignore(false)
                .git_ignore(false)
                .git_global(false)
                .git_exclude(false)
                .follow_links(false)
                .threads(workers)
                .build_parallel();

            walker.run(|| {
                let sender = sender.clone();
                Box::new(move |result| visit(result, table, &sender, scanned, progress))
            });
        });

        for task in receiver.iter() {
            on_match(&task);
            aggregator.push(task);
        }
    });

    let scanned_dirs = scanned.load(Ordering::Relaxed);
    debug!(
        scanned_dirs,
        matches = aggregator.len(),
        total_bytes = aggregator.total_bytes(),
        "scan complete"
    );

    Ok(aggregator.finish(scanned_dirs))
}

/// Handle one entry yielded by the parallel walker
fn visit(
    result: std::result::Result<DirEntry, ignore::Error>,
    table: &PatternTable,
    sender: &Sender<DeletionTask>,
    scanned: &AtomicU64,
    progress: Option<&ProgressBar>,
) -> WalkState {
    let entry = match result {
        Ok(entry) => entry,
        Err(err) => {
            warn!(error = %err, "skipping unreadable path");
            return WalkState::Continue;
        }
    };

    if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
        return WalkState::Continue;
    }

    let count = scanned.fetch_add(1, Ordering::Relaxed) + 1;
    if let Some(progress) = progress.filter(|_| count % 100 == 0) {
        progress.set_message(format!("{count} directories scanned"));
    }

    let path = entry.path();
    let (Some(name), Some(parent)) = (path.file_name().and_then(|n| n.to_str()), path.parent())
    else {
        return WalkState::Continue;
    };

    if entry.depth() > 0 && VCS_INTERNALS.contains(&name) {
        return WalkState::Skip;
    }

    let pattern = match table.classify(name, parent) {
        Ok(Some(pattern)) => pattern,
        Ok(None) => return WalkState::Continue,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not classify directory, descending into it");
            return WalkState::Continue;
        }
    };

    debug!(path = %path.display(), ecosystem = %pattern.ecosystem, "matched artifact directory");

    match directory_size(path) {
        Ok(size) => {
            let task = DeletionTask {
                path: path.to_path_buf(),
                size,
            };
            if sender.send(task).is_err() {
                // Aggregator is gone, nobody wants further results
                return WalkState::Quit;
            }
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "dropping directory whose size could not be computed");
        }
    }

    // Never descend into a match, it is removed wholesale
    WalkState::Skip
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_directory_size_counts_regular_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("top.bin"), vec![0u8; 10]).unwrap();
        fs::write(dir.path().join("a/mid.bin"), vec![0u8; 200]).unwrap();
        fs::write(dir.path().join("a/b/deep.bin"), vec![0u8; 3000]).unwrap();

        assert_eq!(directory_size(dir.path()).unwrap(), 3210);
    }

    #[test]
    fn test_directory_size_of_empty_dir_is_zero() {
        let dir = tempdir().unwrap();
        assert_eq!(directory_size(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_directory_size_fails_for_missing_path() {
        let dir = tempdir().unwrap();
        let result = directory_size(&dir.path().join("gone"));
        assert!(matches!(result, Err(ReclaimError::Measure { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_size_does_not_follow_symlinks() {
        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        fs::write(outside.path().join("big.bin"), vec![0u8; 4096]).unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        assert_eq!(directory_size(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_resolve_root_rejects_missing_and_files() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        assert!(matches!(
            resolve_root(&dir.path().join("missing")),
            Err(ReclaimError::RootUnavailable { .. })
        ));
        assert!(matches!(
            resolve_root(&file),
            Err(ReclaimError::RootNotDirectory { .. })
        ));

        let resolved = resolve_root(dir.path()).unwrap();
        assert!(resolved.is_absolute());
    }

    #[test]
    fn test_aggregator_sums_sizes() {
        let mut aggregator = TaskAggregator::default();
        aggregator.push(DeletionTask {
            path: PathBuf::from("/a/node_modules"),
            size: 5,
        });
        aggregator.push(DeletionTask {
            path: PathBuf::from("/b/target"),
            size: 7,
        });

        let report = aggregator.finish(42);
        assert_eq!(report.tasks.len(), 2);
        assert_eq!(report.total_bytes, 12);
        assert_eq!(report.scanned_dirs, 42);
    }
}
