pub mod docker;
pub mod projects;
pub mod targets;
pub mod walker;

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;
use walkdir::DirEntry;

use crate::apps::orphans;
use crate::common::platform::HostLayout;
use crate::common::safety;
use targets::{Category, DeletionCandidate, PreviewReport, ScanLimits, ScanResult};
use walker::{BoundedWalk, ScanCaps};

/// Measures categories against the live filesystem.
///
/// Nothing is cached: every call re-reads the disk, so a preview and the
/// deletion that follows it each see current state.
pub struct CategoryScanner<'a> {
    layout: &'a HostLayout,
    limits: &'a ScanLimits,
}

impl<'a> CategoryScanner<'a> {
    pub fn new(layout: &'a HostLayout, limits: &'a ScanLimits) -> Self {
        Self { layout, limits }
    }

    pub fn layout(&self) -> &HostLayout {
        self.layout
    }

    pub fn limits(&self) -> &ScanLimits {
        self.limits
    }

    /// Categories offered on this machine, in report order
    pub fn categories(&self) -> Vec<Category> {
        Category::for_platform(self.layout.platform)
    }

    /// Summarise one category. Never fails: anything unreachable or
    /// unmeasurable comes back as an empty result.
    pub fn scan_category(&self, category: Category, min_age_days: u32) -> ScanResult {
        let result = match category {
            Category::NodeModules => self.summarise_dirs(
                category,
                projects::sample_node_modules(self.layout, self.limits, min_age_days),
            ),
            Category::BuildArtifacts => self.summarise_dirs(
                category,
                projects::sample_build_artifacts(self.layout, self.limits, min_age_days),
            ),
            Category::Volumes => self.scan_volumes(),
            Category::OrphanedApps => self.scan_orphans(),
            _ => self.scan_single_path(category, min_age_days),
        };
        tracing::debug!(
            category = category.name(),
            items = result.item_count,
            bytes = result.total_bytes,
            "scanned category"
        );
        result
    }

    /// Deletable files below a single-path category root, with the larger
    /// deletion caps. Empty for special categories.
    pub fn deletion_candidates(&self, category: Category, min_age_days: u32) -> Vec<DeletionCandidate> {
        match self.layout.category_root(category) {
            Some(root) => files_under(&root, ScanCaps::deletion(self.limits), min_age_days).collect(),
            None => Vec::new(),
        }
    }

    fn scan_single_path(&self, category: Category, min_age_days: u32) -> ScanResult {
        let Some(root) = self.layout.category_root(category) else {
            return ScanResult::empty(category, "");
        };
        let display = root.display().to_string();

        let mut count = 0u64;
        let mut bytes = 0u64;
        for file in files_under(&root, ScanCaps::preview(self.limits), min_age_days) {
            count += 1;
            bytes += file.size_bytes;
        }

        if count > 0 && bytes == 0 {
            bytes = walker::aggregate_size(self.layout, self.limits, &root);
        }

        ScanResult::new(category, display, count, bytes)
    }

    /// Size comes from `du` per directory; the item count is an estimate
    fn summarise_dirs(&self, category: Category, dirs: Vec<DeletionCandidate>) -> ScanResult {
        let bytes: u64 = dirs.iter().map(|d| d.size_bytes).sum();
        let count = if dirs.is_empty() {
            0
        } else {
            self.limits.estimate_items(bytes).max(dirs.len() as u64)
        };
        ScanResult::new(category, category.special_display_path(), count, bytes)
    }

    /// Volume count from the daemon; content size is unknown
    fn scan_volumes(&self) -> ScanResult {
        let count = docker::volume_count(self.layout, self.limits.docker_timeout()).unwrap_or(0);
        ScanResult::new(Category::Volumes, Category::Volumes.special_display_path(), count, 0)
    }

    fn scan_orphans(&self) -> ScanResult {
        let found = orphans::find_orphaned_apps(self.layout, self.limits);
        let bytes = found.iter().map(|o| o.size_bytes).sum();
        ScanResult::new(
            Category::OrphanedApps,
            Category::OrphanedApps.special_display_path(),
            found.len() as u64,
            bytes,
        )
    }

    /// Scan every category for the report table. Partial failures only
    /// ever produce empty rows.
    pub fn preview(&self, min_age_days: u32, show_progress: bool) -> PreviewReport {
        let start = Instant::now();
        let categories = self.categories();
        let mut report = PreviewReport::new(min_age_days);

        let pb = if show_progress {
            let pb = ProgressBar::new(categories.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}") {
                pb.set_style(style.progress_chars("━━░"));
            }
            Some(pb)
        } else {
            None
        };

        for category in categories {
            if let Some(ref pb) = pb {
                pb.set_message(format!("Scanning {}...", category));
            }
            report.push(self.scan_category(category, min_age_days));
            if let Some(ref pb) = pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        report.duration_secs = start.elapsed().as_secs_f64();
        report
    }
}

/// Non-directory entries below a root that pass the age filter and are not
/// protected
fn files_under(root: &Path, caps: ScanCaps, min_age_days: u32) -> BoundedWalk<impl FnMut(&DirEntry) -> bool> {
    BoundedWalk::new(root, caps, move |e: &DirEntry| {
        !e.file_type().is_dir() && walker::older_than(e, min_age_days) && !safety::should_exclude(e.path())
    })
}
