use std::collections::HashMap;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use walkdir::{DirEntry, FilterEntry, WalkDir};

use super::targets::{DeletionCandidate, ScanLimits};
use crate::common::platform::HostLayout;
use crate::common::process;
use crate::common::safety;

/// Hard caps for one bounded walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCaps {
    pub max_depth: usize,
    pub max_results: usize,
    /// Directories entered before the walk gives up
    pub max_dirs_sampled: usize,
    /// Matches taken from any single directory
    pub per_dir_limit: Option<usize>,
    pub time_budget: Option<Duration>,
}

impl ScanCaps {
    /// Aggressive sampling for order-of-magnitude previews
    pub fn preview(limits: &ScanLimits) -> Self {
        Self {
            max_depth: limits.preview_max_depth,
            max_results: limits.preview_max_results,
            max_dirs_sampled: limits.preview_max_dirs,
            per_dir_limit: Some(limits.samples_per_dir),
            time_budget: Some(limits.time_budget()),
        }
    }

    /// Larger caps for scans whose results will really be deleted
    pub fn deletion(limits: &ScanLimits) -> Self {
        Self {
            max_depth: limits.deletion_max_depth,
            max_results: limits.deletion_max_results,
            max_dirs_sampled: usize::MAX,
            per_dir_limit: None,
            time_budget: Some(limits.time_budget()),
        }
    }

    /// Depth-limited only; for walks that must be complete
    pub fn complete(max_depth: usize) -> Self {
        Self {
            max_depth,
            max_results: usize::MAX,
            max_dirs_sampled: usize::MAX,
            per_dir_limit: None,
            time_budget: None,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

type Pruner = fn(&DirEntry) -> bool;

/// Lazy, finite walk below a root.
///
/// Stops the moment any cap in [`ScanCaps`] is hit. Protected metadata
/// directories (`.git` and friends) are pruned during the walk, so they
/// are never entered. A missing or unreadable root yields nothing; entries
/// that cannot be read are skipped.
pub struct BoundedWalk<P> {
    inner: FilterEntry<walkdir::IntoIter, Pruner>,
    predicate: P,
    caps: ScanCaps,
    descend_into_matches: bool,
    prune_names: &'static [&'static str],
    started: Instant,
    yielded: usize,
    dirs_seen: usize,
    per_dir: HashMap<PathBuf, usize>,
    done: bool,
}

fn keep_entry(entry: &DirEntry) -> bool {
    !safety::is_protected_dir_name(entry.file_name())
}

impl<P> BoundedWalk<P>
where
    P: FnMut(&DirEntry) -> bool,
{
    pub fn new(root: &Path, caps: ScanCaps, predicate: P) -> Self {
        let inner = WalkDir::new(root)
            .follow_links(false)
            .min_depth(1)
            .max_depth(caps.max_depth)
            .into_iter()
            .filter_entry(keep_entry as Pruner);

        Self {
            inner,
            predicate,
            caps,
            descend_into_matches: true,
            prune_names: &[],
            started: Instant::now(),
            yielded: 0,
            dirs_seen: 0,
            per_dir: HashMap::new(),
            done: false,
        }
    }

    /// Report matching directories without walking their contents
    pub fn skip_matched_dirs(mut self) -> Self {
        self.descend_into_matches = false;
        self
    }

    /// Additionally prune directories with these names (not reported)
    pub fn prune_dirs(mut self, names: &'static [&'static str]) -> Self {
        self.prune_names = names;
        self
    }

    fn exhausted(&self) -> bool {
        if self.yielded >= self.caps.max_results {
            return true;
        }
        match self.caps.time_budget {
            Some(budget) => self.started.elapsed() >= budget,
            None => false,
        }
    }

    fn take_sample(&mut self, path: &Path) -> bool {
        let Some(limit) = self.caps.per_dir_limit else {
            return true;
        };
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let seen = self.per_dir.entry(parent).or_insert(0);
        if *seen >= limit {
            return false;
        }
        *seen += 1;
        true
    }
}

impl<P> Iterator for BoundedWalk<P>
where
    P: FnMut(&DirEntry) -> bool,
{
    type Item = DeletionCandidate;

    fn next(&mut self) -> Option<DeletionCandidate> {
        if self.done {
            return None;
        }

        loop {
            if self.exhausted() {
                tracing::debug!(results = self.yielded, "bounded walk hit its cap");
                self.done = true;
                return None;
            }

            let entry = match self.inner.next() {
                Some(Ok(entry)) => entry,
                Some(Err(err)) => {
                    tracing::trace!(error = %err, "skipping unreadable entry");
                    continue;
                }
                None => {
                    self.done = true;
                    return None;
                }
            };

            let is_dir = entry.file_type().is_dir();
            if is_dir && self.prune_names.iter().any(|n| entry.file_name() == *n) {
                self.inner.skip_current_dir();
                continue;
            }
            if is_dir {
                self.dirs_seen += 1;
                if self.dirs_seen > self.caps.max_dirs_sampled {
                    tracing::debug!(dirs = self.dirs_seen, "bounded walk hit its directory cap");
                    self.done = true;
                    return None;
                }
            }

            if !(self.predicate)(&entry) {
                continue;
            }

            if is_dir && !self.descend_into_matches {
                self.inner.skip_current_dir();
            }

            if !self.take_sample(entry.path()) {
                continue;
            }

            let size_bytes = if is_dir {
                0
            } else {
                entry.metadata().map(|m| disk_bytes(&m)).unwrap_or(0)
            };

            self.yielded += 1;
            return Some(DeletionCandidate {
                path: entry.into_path(),
                is_directory: is_dir,
                size_bytes,
            });
        }
    }
}

/// Physical disk usage of a file
#[cfg(unix)]
pub fn disk_bytes(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.blocks() * 512
}

#[cfg(not(unix))]
pub fn disk_bytes(metadata: &Metadata) -> u64 {
    metadata.len()
}

/// Is the entry's modification time at least `min_age_days` old?
/// Zero days admits everything; an unknown mtime is treated as recent.
pub fn older_than(entry: &DirEntry, min_age_days: u32) -> bool {
    if min_age_days == 0 {
        return true;
    }
    entry
        .metadata()
        .is_ok_and(|m| modified_before(&m, min_age_days))
}

/// Metadata-level form of [`older_than`]
pub fn modified_before(metadata: &Metadata, min_age_days: u32) -> bool {
    if min_age_days == 0 {
        return true;
    }
    let threshold = Duration::from_secs(u64::from(min_age_days) * 86_400);
    metadata
        .modified()
        .map(|mtime| SystemTime::now().duration_since(mtime).unwrap_or_default() >= threshold)
        .unwrap_or(false)
}

/// Calculate total size of a directory (physical disk usage), giving up
/// after `budget`
pub fn dir_size(path: &Path, budget: Option<Duration>) -> u64 {
    let started = Instant::now();
    let mut total = 0u64;
    for entry in WalkDir::new(path).follow_links(false).into_iter().filter_map(|e| e.ok()) {
        if budget.is_some_and(|b| started.elapsed() >= b) {
            tracing::debug!(path = %path.display(), "dir_size ran out of time, partial total");
            break;
        }
        if entry.file_type().is_file() {
            total += entry.metadata().map(|m| disk_bytes(&m)).unwrap_or(0);
        }
    }
    total
}

/// Aggregate size of a tree: `du` first, an in-process walk if `du` is
/// unavailable
pub fn aggregate_size(layout: &HostLayout, limits: &ScanLimits, path: &Path) -> u64 {
    if !path.exists() {
        return 0;
    }
    process::disk_usage(&layout.du_bin, path, limits.du_timeout())
        .unwrap_or_else(|| dir_size(path, Some(limits.time_budget())))
}
