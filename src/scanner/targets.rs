use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::errors::HousekeepError;
use crate::common::platform::Platform;

// ─── Category taxonomy ────────────────────────────────────────────────────────

/// How a category finds its targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    /// Everything under one root directory
    SinglePath,
    /// Scattered across project trees or held by an external daemon
    MultiPathSpecial,
}

/// A named cleanup target.
///
/// `downloads` is deliberately absent: too likely to hold files the user
/// cannot get back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Caches,
    Logs,
    Temp,
    BrowserTrash,
    Xcode,
    Apt,
    Yum,
    Pacman,
    NodeModules,
    Docker,
    Volumes,
    BuildArtifacts,
    Snap,
    OrphanedApps,
}

const MACOS_CATEGORIES: &[Category] = &[
    Category::Caches,
    Category::Logs,
    Category::Temp,
    Category::BrowserTrash,
    Category::Xcode,
    Category::NodeModules,
    Category::Docker,
    Category::Volumes,
    Category::BuildArtifacts,
    Category::OrphanedApps,
];

const LINUX_CATEGORIES: &[Category] = &[
    Category::Caches,
    Category::Logs,
    Category::Temp,
    Category::BrowserTrash,
    Category::Apt,
    Category::Yum,
    Category::Pacman,
    Category::NodeModules,
    Category::Docker,
    Category::Volumes,
    Category::BuildArtifacts,
    Category::Snap,
    Category::OrphanedApps,
];

const OTHER_CATEGORIES: &[Category] = &[Category::Caches, Category::Logs, Category::Temp];

const ALL_CATEGORIES: &[Category] = &[
    Category::Caches,
    Category::Logs,
    Category::Temp,
    Category::BrowserTrash,
    Category::Xcode,
    Category::Apt,
    Category::Yum,
    Category::Pacman,
    Category::NodeModules,
    Category::Docker,
    Category::Volumes,
    Category::BuildArtifacts,
    Category::Snap,
    Category::OrphanedApps,
];

impl Category {
    /// Ordered categories offered on a platform
    pub fn for_platform(platform: Platform) -> Vec<Category> {
        match platform {
            Platform::MacOs => MACOS_CATEGORIES.to_vec(),
            Platform::Linux => LINUX_CATEGORIES.to_vec(),
            Platform::Other => OTHER_CATEGORIES.to_vec(),
        }
    }

    /// Space separated category names for a platform
    pub fn names_for(platform: Platform) -> String {
        Self::for_platform(platform)
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn all() -> &'static [Category] {
        ALL_CATEGORIES
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Caches => "caches",
            Category::Logs => "logs",
            Category::Temp => "temp",
            Category::BrowserTrash => "browser_trash",
            Category::Xcode => "xcode",
            Category::Apt => "apt",
            Category::Yum => "yum",
            Category::Pacman => "pacman",
            Category::NodeModules => "node_modules",
            Category::Docker => "docker",
            Category::Volumes => "volumes",
            Category::BuildArtifacts => "build_artifacts",
            Category::Snap => "snap",
            Category::OrphanedApps => "orphaned_apps",
        }
    }

    pub fn kind(self) -> CategoryKind {
        match self {
            Category::NodeModules
            | Category::BuildArtifacts
            | Category::Volumes
            | Category::OrphanedApps => CategoryKind::MultiPathSpecial,
            _ => CategoryKind::SinglePath,
        }
    }

    pub fn is_special(self) -> bool {
        self.kind() == CategoryKind::MultiPathSpecial
    }

    /// Look a category up by name, restricted to what the platform offers
    pub fn parse_for(name: &str, platform: Platform) -> Result<Category, HousekeepError> {
        let category = name.parse::<Category>()?;
        if Self::for_platform(platform).contains(&category) {
            Ok(category)
        } else {
            Err(HousekeepError::UnsupportedCategory {
                category: category.name().to_string(),
                platform: platform.to_string(),
            })
        }
    }

    /// Built-in root for single-path categories
    pub fn default_root(self, platform: Platform, home: &Path, temp_dir: &Path) -> Option<PathBuf> {
        let mac = platform.is_macos();
        let path = match self {
            Category::Caches if mac => home.join("Library/Caches"),
            Category::Caches => home.join(".cache"),
            Category::Logs if mac => home.join("Library/Logs"),
            Category::Logs => PathBuf::from("/var/log"),
            Category::Temp => temp_dir.to_path_buf(),
            Category::BrowserTrash if mac => home.join(".Trash"),
            Category::BrowserTrash => home.join(".local/share/Trash"),
            Category::Xcode => home.join("Library/Developer/Xcode/DerivedData"),
            Category::Docker if mac => home.join("Library/Containers/com.docker.docker/Data/log"),
            Category::Docker => home.join(".docker/desktop/log"),
            Category::Apt => PathBuf::from("/var/cache/apt/archives"),
            Category::Yum => PathBuf::from("/var/cache/yum"),
            Category::Pacman => PathBuf::from("/var/cache/pacman/pkg"),
            Category::Snap => PathBuf::from("/var/lib/snapd/cache"),
            Category::NodeModules
            | Category::BuildArtifacts
            | Category::Volumes
            | Category::OrphanedApps => return None,
        };
        Some(path)
    }

    /// Placeholder shown in reports for categories without a root
    pub fn special_display_path(self) -> &'static str {
        match self {
            Category::NodeModules | Category::BuildArtifacts => "Multiple project directories",
            Category::Volumes => "Docker volumes",
            Category::OrphanedApps => "Application support directories",
            _ => "",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = HousekeepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_CATEGORIES
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| HousekeepError::UnknownCategory {
                name: s.to_string(),
            })
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Scan results ─────────────────────────────────────────────────────────────

/// Outcome of scanning one category. Rebuilt on every call.
///
/// `item_count` is an estimate for the project-tree categories and
/// `total_bytes` is always best effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub category: Category,
    pub display_path: String,
    pub item_count: u64,
    pub total_bytes: u64,
}

impl ScanResult {
    pub fn empty(category: Category, display_path: impl Into<String>) -> Self {
        Self {
            category,
            display_path: display_path.into(),
            item_count: 0,
            total_bytes: 0,
        }
    }

    /// Build a result, forcing zero bytes when nothing was found
    pub fn new(category: Category, display_path: impl Into<String>, item_count: u64, total_bytes: u64) -> Self {
        Self {
            category,
            display_path: display_path.into(),
            item_count,
            total_bytes: if item_count == 0 { 0 } else { total_bytes },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    /// `name|path|count|bytes` line
    pub fn record(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.category.name(),
            self.display_path,
            self.item_count,
            self.total_bytes
        )
    }
}

/// Every category summary plus a grand total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewReport {
    /// When the preview was taken
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// How long the scans took in seconds
    pub duration_secs: f64,
    pub min_age_days: u32,
    pub results: Vec<ScanResult>,
    pub total_items: u64,
    pub total_bytes: u64,
}

impl PreviewReport {
    pub fn new(min_age_days: u32) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            duration_secs: 0.0,
            min_age_days,
            results: Vec::new(),
            total_items: 0,
            total_bytes: 0,
        }
    }

    pub fn push(&mut self, result: ScanResult) {
        self.total_items += result.item_count;
        self.total_bytes += result.total_bytes;
        self.results.push(result);
    }

    /// Categories that found something
    pub fn non_empty(&self) -> impl Iterator<Item = &ScanResult> {
        self.results.iter().filter(|r| !r.is_empty())
    }
}

/// A concrete path queued for removal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionCandidate {
    pub path: PathBuf,
    pub is_directory: bool,
    pub size_bytes: u64,
}

// ─── Limits ───────────────────────────────────────────────────────────────────

/// Caps that keep every scan finite on adversarially large trees.
///
/// Preview scans sample aggressively since only magnitude matters; deletion
/// scans go further because every listed candidate is really removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanLimits {
    /// Files listed per single-path category in a preview
    pub preview_max_results: usize,
    pub preview_max_depth: usize,
    /// Directories entered per single-path category in a preview
    pub preview_max_dirs: usize,
    /// Files queued per single-path category for deletion
    pub deletion_max_results: usize,
    pub deletion_max_depth: usize,
    /// Files sampled from any one directory during a preview
    pub samples_per_dir: usize,
    /// Matching project directories measured per search root in a preview
    pub dirs_per_root: usize,
    /// How deep to look for node_modules / build output below a project root
    pub project_search_depth: usize,
    /// Individual build-artifact files queued for deletion
    pub build_artifact_max_results: usize,
    /// Depth of the installed-application inventory
    pub app_inventory_depth: usize,
    /// Wall-clock cap per bounded walk
    pub time_budget_secs: u64,
    /// Average file size used to turn aggregate bytes into an item estimate
    pub avg_file_size_bytes: u64,
    pub docker_timeout_secs: u64,
    pub du_timeout_secs: u64,
    pub finder_timeout_secs: u64,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            preview_max_results: 2000,
            preview_max_depth: 5,
            preview_max_dirs: 500,
            deletion_max_results: 1000,
            deletion_max_depth: 5,
            samples_per_dir: 50,
            dirs_per_root: 20,
            project_search_depth: 6,
            build_artifact_max_results: 500,
            app_inventory_depth: 2,
            time_budget_secs: 10,
            avg_file_size_bytes: 16 * 1024,
            docker_timeout_secs: 10,
            du_timeout_secs: 30,
            finder_timeout_secs: 15,
        }
    }
}

impl ScanLimits {
    pub fn time_budget(&self) -> Duration {
        Duration::from_secs(self.time_budget_secs)
    }

    pub fn docker_timeout(&self) -> Duration {
        Duration::from_secs(self.docker_timeout_secs)
    }

    pub fn du_timeout(&self) -> Duration {
        Duration::from_secs(self.du_timeout_secs)
    }

    pub fn finder_timeout(&self) -> Duration {
        Duration::from_secs(self.finder_timeout_secs)
    }

    /// Rough item count for categories measured only by aggregate size
    pub fn estimate_items(&self, total_bytes: u64) -> u64 {
        if total_bytes == 0 {
            return 0;
        }
        (total_bytes / self.avg_file_size_bytes.max(1)).max(1)
    }
}
