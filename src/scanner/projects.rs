//! Discovery for the categories that live inside project trees:
//! `node_modules` and build output.

use std::path::{Path, PathBuf};
use walkdir::DirEntry;

use super::targets::{DeletionCandidate, ScanLimits};
use super::walker::{self, BoundedWalk, ScanCaps};
use crate::common::platform::HostLayout;
use crate::common::safety;

/// Output directories; only counted next to a project marker
const OUTPUT_DIR_NAMES: &[&str] = &["dist", "build", "target", "out", ".next", "coverage"];

/// Tool caches; counted wherever they appear
const CACHE_DIR_NAMES: &[&str] = &[
    "__pycache__",
    ".pytest_cache",
    ".turbo",
    ".parcel-cache",
    ".nyc_output",
    ".gradle",
];

/// Files whose presence marks a directory as a project root
const PROJECT_MARKERS: &[&str] = &[
    "package.json",
    "Cargo.toml",
    "pyproject.toml",
    "setup.py",
    "build.gradle",
    "build.gradle.kts",
    "pom.xml",
    "tsconfig.json",
    "go.mod",
];

/// Dependency trees are never searched for build output
const DEPENDENCY_DIRS: &[&str] = &["node_modules"];

fn is_named_dir(entry: &DirEntry, names: &[&str]) -> bool {
    entry.file_type().is_dir() && names.iter().any(|n| entry.file_name() == *n)
}

fn is_node_modules(entry: &DirEntry) -> bool {
    is_named_dir(entry, &["node_modules"])
}

fn has_project_marker(dir: &Path) -> bool {
    PROJECT_MARKERS.iter().any(|m| dir.join(m).exists())
}

fn is_build_artifact_dir(entry: &DirEntry) -> bool {
    if is_named_dir(entry, CACHE_DIR_NAMES) {
        return true;
    }
    is_named_dir(entry, OUTPUT_DIR_NAMES)
        && entry.path().parent().is_some_and(has_project_marker)
}

/// Caps for the preview: a handful of directories per search root
fn preview_caps(limits: &ScanLimits) -> ScanCaps {
    ScanCaps {
        max_depth: limits.project_search_depth,
        max_results: limits.dirs_per_root,
        max_dirs_sampled: usize::MAX,
        per_dir_limit: None,
        time_budget: Some(limits.time_budget()),
    }
}

/// node_modules directories below the roots. Matches are reported whole and
/// never entered.
pub fn find_node_modules(roots: &[PathBuf], caps: &ScanCaps, min_age_days: u32) -> Vec<DeletionCandidate> {
    let mut found = Vec::new();
    for root in roots {
        let walk = BoundedWalk::new(root, caps.clone(), |e: &DirEntry| {
            is_node_modules(e) && walker::older_than(e, min_age_days)
        })
        .skip_matched_dirs();
        found.extend(walk);
    }
    found
}

/// Build output and tool-cache directories below the roots
pub fn find_build_artifact_dirs(roots: &[PathBuf], caps: &ScanCaps, min_age_days: u32) -> Vec<DeletionCandidate> {
    let mut found = Vec::new();
    for root in roots {
        let walk = BoundedWalk::new(root, caps.clone(), |e: &DirEntry| {
            is_build_artifact_dir(e) && walker::older_than(e, min_age_days)
        })
        .skip_matched_dirs()
        .prune_dirs(DEPENDENCY_DIRS);
        found.extend(walk);
    }
    found
}

/// Preview sampling for node_modules: capped directory discovery plus `du`
pub fn sample_node_modules(layout: &HostLayout, limits: &ScanLimits, min_age_days: u32) -> Vec<DeletionCandidate> {
    let dirs = find_node_modules(&layout.project_roots(), &preview_caps(limits), min_age_days);
    with_aggregate_sizes(layout, limits, dirs)
}

/// Preview sampling for build output: capped directory discovery plus `du`
pub fn sample_build_artifacts(layout: &HostLayout, limits: &ScanLimits, min_age_days: u32) -> Vec<DeletionCandidate> {
    let dirs = find_build_artifact_dirs(&layout.project_roots(), &preview_caps(limits), min_age_days);
    with_aggregate_sizes(layout, limits, dirs)
}

/// Every node_modules directory, for deletion. Completeness matters more
/// than speed here, so only the depth limit applies.
pub fn collect_node_modules(layout: &HostLayout, limits: &ScanLimits, min_age_days: u32) -> Vec<DeletionCandidate> {
    let caps = ScanCaps::complete(limits.project_search_depth);
    let dirs = find_node_modules(&layout.project_roots(), &caps, min_age_days);
    with_aggregate_sizes(layout, limits, dirs)
}

/// Individual build-artifact files queued for deletion, bounded
pub fn scan_build_artifacts(layout: &HostLayout, limits: &ScanLimits, min_age_days: u32) -> Vec<DeletionCandidate> {
    let dir_caps = ScanCaps::complete(limits.project_search_depth);
    let dirs = find_build_artifact_dirs(&layout.project_roots(), &dir_caps, 0);

    let mut files = Vec::new();
    for dir in dirs {
        let remaining = limits.build_artifact_max_results.saturating_sub(files.len());
        if remaining == 0 {
            tracing::debug!(cap = limits.build_artifact_max_results, "build artifact file cap reached");
            break;
        }
        let caps = ScanCaps::deletion(limits).with_max_results(remaining);
        files.extend(BoundedWalk::new(&dir.path, caps, |e: &DirEntry| {
            e.file_type().is_file() && walker::older_than(e, min_age_days) && !safety::should_exclude(e.path())
        }));
    }
    files
}

fn with_aggregate_sizes(layout: &HostLayout, limits: &ScanLimits, dirs: Vec<DeletionCandidate>) -> Vec<DeletionCandidate> {
    dirs.into_iter()
        .map(|mut d| {
            d.size_bytes = walker::aggregate_size(layout, limits, &d.path);
            d
        })
        .collect()
}
