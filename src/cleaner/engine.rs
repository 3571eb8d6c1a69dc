use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::apps::orphans;
use crate::common::errors::HousekeepError;
use crate::common::format;
use crate::common::platform::HostLayout;
use crate::common::process;
use crate::common::prompt::Confirm;
use crate::common::safety;
use crate::scanner::targets::{Category, DeletionCandidate, ScanLimits};
use crate::scanner::walker;
use crate::scanner::{docker, projects, CategoryScanner};

/// Per-run switches, passed explicitly instead of living in globals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Skip the generic confirmation. Never skips the dev-file warning.
    pub force: bool,
    /// Report what would go and touch nothing. Wins over `force`.
    pub dry_run: bool,
    pub min_age_days: u32,
}

/// How a category deletion ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionStatus {
    Completed,
    NothingToDelete,
    DryRun,
    /// The user declined a confirmation
    Cancelled,
    /// The category cannot be cleaned on this machine
    Unsupported,
}

impl std::fmt::Display for DeletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeletionStatus::Completed => write!(f, "completed"),
            DeletionStatus::NothingToDelete => write!(f, "nothing to delete"),
            DeletionStatus::DryRun => write!(f, "dry run"),
            DeletionStatus::Cancelled => write!(f, "cancelled"),
            DeletionStatus::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Outcome of cleaning one category
#[derive(Debug, Clone, Serialize)]
pub struct DeletionReport {
    pub category: Category,
    pub status: DeletionStatus,
    /// Candidates found by the fresh scan
    pub candidates: u64,
    pub candidate_bytes: u64,
    pub deleted: u64,
    pub failed: u64,
    pub bytes_freed: u64,
    pub errors: Vec<String>,
}

impl DeletionReport {
    fn new(category: Category, status: DeletionStatus) -> Self {
        Self {
            category,
            status,
            candidates: 0,
            candidate_bytes: 0,
            deleted: 0,
            failed: 0,
            bytes_freed: 0,
            errors: Vec::new(),
        }
    }

    fn with_candidates(mut self, count: u64, bytes: u64) -> Self {
        self.candidates = count;
        self.candidate_bytes = bytes;
        self
    }

    /// 0 for completed, empty and dry runs; 1 for cancelled or unsupported
    pub fn exit_code(&self) -> i32 {
        match self.status {
            DeletionStatus::Cancelled | DeletionStatus::Unsupported => 1,
            _ => 0,
        }
    }

    fn record_failure(&mut self, err: impl std::fmt::Display) {
        self.failed += 1;
        self.errors.push(err.to_string());
    }
}

/// Removes the contents of one category at a time.
///
/// Every call re-scans the filesystem; nothing from an earlier preview is
/// reused. Items are deleted one by one and a failure never stops the rest.
pub struct DeletionEngine<'a> {
    scanner: CategoryScanner<'a>,
    run: RunConfig,
    confirm: &'a mut dyn Confirm,
    show_progress: bool,
}

impl<'a> DeletionEngine<'a> {
    pub fn new(layout: &'a HostLayout, limits: &'a ScanLimits, run: RunConfig, confirm: &'a mut dyn Confirm) -> Self {
        Self {
            scanner: CategoryScanner::new(layout, limits),
            run,
            confirm,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn layout(&self) -> &HostLayout {
        self.scanner.layout()
    }

    fn limits(&self) -> &ScanLimits {
        self.scanner.limits()
    }

    /// Clean one category: scan, confirm, delete.
    pub fn delete_category(&mut self, category: Category) -> DeletionReport {
        let platform = self.layout().platform;
        if !Category::for_platform(platform).contains(&category) {
            let mut report = DeletionReport::new(category, DeletionStatus::Unsupported);
            report.errors.push(
                HousekeepError::UnsupportedCategory {
                    category: category.name().to_string(),
                    platform: platform.to_string(),
                }
                .to_string(),
            );
            return report;
        }

        tracing::info!(category = category.name(), dry_run = self.run.dry_run, force = self.run.force, "cleaning category");

        let report = match category {
            Category::Volumes => self.delete_volumes(),
            Category::OrphanedApps => self.delete_orphaned_apps(),
            Category::BrowserTrash => self.empty_trash(),
            Category::NodeModules => {
                let dirs = projects::collect_node_modules(self.layout(), self.limits(), self.run.min_age_days);
                self.delete_candidates(category, dirs)
            }
            Category::BuildArtifacts => {
                let files = projects::scan_build_artifacts(self.layout(), self.limits(), self.run.min_age_days);
                self.delete_candidates(category, files)
            }
            _ => {
                let files = self.scanner.deletion_candidates(category, self.run.min_age_days);
                self.delete_candidates(category, files)
            }
        };

        tracing::info!(
            category = category.name(),
            status = %report.status,
            deleted = report.deleted,
            failed = report.failed,
            bytes = report.bytes_freed,
            "category finished"
        );
        report
    }

    /// Standard flow: filter, confirm, delete each candidate
    fn delete_candidates(&mut self, category: Category, candidates: Vec<DeletionCandidate>) -> DeletionReport {
        let candidates = self.retain_deletable(category, candidates);
        match self.precheck(category, &candidates) {
            Some(report) => report,
            None => self.remove_candidates(category, &candidates),
        }
    }

    /// Empty and dry-run short circuits, then the confirmation gates.
    /// `None` means go ahead.
    fn precheck(&mut self, category: Category, candidates: &[DeletionCandidate]) -> Option<DeletionReport> {
        if candidates.is_empty() {
            return Some(DeletionReport::new(category, DeletionStatus::NothingToDelete));
        }

        let count = candidates.len() as u64;
        let bytes: u64 = candidates.iter().map(|c| c.size_bytes).sum();

        if self.run.dry_run {
            tracing::info!(category = category.name(), count, bytes, "dry run, nothing removed");
            return Some(DeletionReport::new(category, DeletionStatus::DryRun).with_candidates(count, bytes));
        }

        let dev_files = candidates.iter().filter(|c| safety::is_dev_file(&c.path)).count() as u64;
        if !self.confirm_deletion(category, count, bytes, dev_files) {
            return Some(DeletionReport::new(category, DeletionStatus::Cancelled).with_candidates(count, bytes));
        }
        None
    }

    /// The generic prompt (unless forced) followed by the dev-file prompt,
    /// which is asked whenever any candidate looks like a dev file
    fn confirm_deletion(&mut self, category: Category, count: u64, bytes: u64, dev_files: u64) -> bool {
        if !self.run.force {
            let prompt = format!(
                "Delete {} ({}) from {}?",
                format::format_count(count),
                format::format_size(bytes),
                category
            );
            if !self.confirm.confirm(&prompt, false) {
                tracing::info!(category = category.name(), "declined by user");
                return false;
            }
        }

        if dev_files > 0 {
            let prompt = format!(
                "{} development files detected in {} (dependencies, build output). Delete them anyway?",
                dev_files, category
            );
            if !self.confirm.confirm(&prompt, false) {
                tracing::info!(category = category.name(), dev_files, "dev-file deletion declined");
                return false;
            }
        }
        true
    }

    /// Drop protected metadata, category roots and critical directories
    fn retain_deletable(&self, category: Category, candidates: Vec<DeletionCandidate>) -> Vec<DeletionCandidate> {
        let root = self.layout().category_root(category);
        let home = &self.layout().home;
        candidates
            .into_iter()
            .filter(|c| {
                if safety::should_exclude(&c.path) {
                    return false;
                }
                if safety::is_protected(&c.path, home) || root.as_deref() == Some(c.path.as_path()) {
                    let refused = HousekeepError::ProtectedPath { path: c.path.clone() };
                    tracing::warn!(error = %refused, "skipping");
                    return false;
                }
                true
            })
            .collect()
    }

    /// Delete every candidate, counting successes and failures separately
    fn remove_candidates(&mut self, category: Category, candidates: &[DeletionCandidate]) -> DeletionReport {
        let count = candidates.len() as u64;
        let bytes: u64 = candidates.iter().map(|c| c.size_bytes).sum();

        if self.run.dry_run {
            return DeletionReport::new(category, DeletionStatus::DryRun).with_candidates(count, bytes);
        }

        let mut report = DeletionReport::new(category, DeletionStatus::Completed).with_candidates(count, bytes);

        let pb = if self.show_progress {
            let pb = ProgressBar::new(count);
            if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.red} [{bar:40.red/blue}] {pos}/{len} Deleting... {msg}") {
                pb.set_style(style.progress_chars("━━░"));
            }
            Some(pb)
        } else {
            None
        };

        for candidate in candidates {
            if let Some(ref pb) = pb {
                pb.set_message(format::truncate(&format::format_path(&candidate.path), 40));
            }

            match remove_path(&candidate.path) {
                Ok(()) => {
                    report.deleted += 1;
                    report.bytes_freed += candidate.size_bytes;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not delete");
                    report.record_failure(e);
                }
            }

            if let Some(ref pb) = pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        report
    }

    fn delete_volumes(&mut self) -> DeletionReport {
        let category = Category::Volumes;
        let timeout = self.limits().docker_timeout();
        let count = docker::volume_count(self.layout(), timeout).unwrap_or(0);
        if count == 0 {
            return DeletionReport::new(category, DeletionStatus::NothingToDelete);
        }
        if self.run.dry_run {
            return DeletionReport::new(category, DeletionStatus::DryRun).with_candidates(count, 0);
        }
        if !self.confirm_deletion(category, count, 0, 0) {
            return DeletionReport::new(category, DeletionStatus::Cancelled).with_candidates(count, 0);
        }

        if self.run.dry_run {
            return DeletionReport::new(category, DeletionStatus::DryRun).with_candidates(count, 0);
        }
        let mut report = DeletionReport::new(category, DeletionStatus::Completed).with_candidates(count, 0);
        match docker::prune_volumes(self.layout(), timeout) {
            Ok(pruned) => {
                report.deleted = pruned.volumes_removed;
                report.bytes_freed = pruned.bytes_reclaimed;
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(error = %e, "docker daemon did not answer, prune abandoned");
                report.record_failure(e);
            }
            Err(e) => {
                tracing::warn!(error = %e, "docker volume prune failed");
                report.record_failure(e);
            }
        }
        report
    }

    /// Support directories plus their preference plists. macOS only.
    fn delete_orphaned_apps(&mut self) -> DeletionReport {
        let category = Category::OrphanedApps;
        if !self.layout().platform.is_macos() {
            let mut report = DeletionReport::new(category, DeletionStatus::Unsupported);
            report.errors.push(format!("{} can only be removed on macOS", category));
            return report;
        }

        let mut candidates = Vec::new();
        for orphan in orphans::find_orphaned_apps(self.layout(), self.limits()) {
            for pref in orphans::associated_preferences(self.layout(), &orphan) {
                let size_bytes = std::fs::symlink_metadata(&pref).map(|m| walker::disk_bytes(&m)).unwrap_or(0);
                candidates.push(DeletionCandidate {
                    path: pref,
                    is_directory: false,
                    size_bytes,
                });
            }
            candidates.push(DeletionCandidate {
                path: orphan.directory_path,
                is_directory: true,
                size_bytes: orphan.size_bytes,
            });
        }
        self.delete_candidates(category, candidates)
    }

    /// Finder first on macOS, direct removal of the trash contents otherwise
    fn empty_trash(&mut self) -> DeletionReport {
        let category = Category::BrowserTrash;
        let Some(root) = self.layout().category_root(category) else {
            return DeletionReport::new(category, DeletionStatus::NothingToDelete);
        };

        let entries = self.trash_entries(&root);
        let candidates = self.retain_deletable(category, entries);
        if let Some(report) = self.precheck(category, &candidates) {
            return report;
        }

        if self.layout().platform.is_macos() && self.run.min_age_days == 0 && !self.run.dry_run {
            let mut cmd = Command::new("osascript");
            cmd.args(["-e", "tell application \"Finder\" to empty trash"]);
            match process::run_checked(cmd, self.limits().finder_timeout()) {
                Ok(_) => {
                    let mut report = DeletionReport::new(category, DeletionStatus::Completed);
                    report.candidates = candidates.len() as u64;
                    report.candidate_bytes = candidates.iter().map(|c| c.size_bytes).sum();
                    report.deleted = report.candidates;
                    report.bytes_freed = report.candidate_bytes;
                    return report;
                }
                Err(e) => tracing::warn!(error = %e, "Finder could not empty the trash, removing directly"),
            }
        }

        self.remove_candidates(category, &candidates)
    }

    /// Top-level trash entries. A freedesktop trash keeps items in `files/`
    /// and their metadata in `info/`; the trash directories themselves stay.
    fn trash_entries(&self, root: &Path) -> Vec<DeletionCandidate> {
        let dirs: Vec<PathBuf> = if root.join("files").is_dir() {
            vec![root.join("files"), root.join("info")]
        } else {
            vec![root.to_path_buf()]
        };

        let mut entries = Vec::new();
        for dir in dirs {
            let Ok(read) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in read.filter_map(|e| e.ok()) {
                let Ok(meta) = std::fs::symlink_metadata(entry.path()) else {
                    continue;
                };
                if !walker::modified_before(&meta, self.run.min_age_days) {
                    continue;
                }
                let path = entry.path();
                let size_bytes = if meta.is_dir() {
                    walker::aggregate_size(self.layout(), self.limits(), &path)
                } else {
                    walker::disk_bytes(&meta)
                };
                entries.push(DeletionCandidate {
                    is_directory: meta.is_dir(),
                    path,
                    size_bytes,
                });
            }
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }
}

/// Delete a file or directory tree permanently; already gone counts as done
fn remove_path(path: &Path) -> Result<(), HousekeepError> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(HousekeepError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let result = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    result.map_err(|source| HousekeepError::Io {
        path: path.to_path_buf(),
        source,
    })
}
