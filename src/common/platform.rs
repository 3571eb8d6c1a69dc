use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::common::config::Config;
use crate::scanner::targets::Category;

/// Operating system family the category table is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    MacOs,
    Linux,
    Other,
}

impl Platform {
    /// Platform of the running binary
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    pub fn is_macos(self) -> bool {
        self == Platform::MacOs
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::MacOs => write!(f, "macOS"),
            Platform::Linux => write!(f, "Linux"),
            Platform::Other => write!(f, "this platform"),
        }
    }
}

/// Home subdirectories searched for project trees (node_modules, build output)
const PROJECT_ROOT_NAMES: &[&str] = &["dev", "projects", "workspace", "code", "Documents", "Desktop"];

/// Where things live on this machine.
///
/// Every category path, project root and helper binary is resolved through
/// this struct, so a test can point the whole engine at a fixture tree by
/// building one with [`HostLayout::for_home`].
#[derive(Debug, Clone)]
pub struct HostLayout {
    pub platform: Platform,
    pub home: PathBuf,
    pub temp_dir: PathBuf,
    /// Installed application bundles (macOS)
    pub applications_dir: PathBuf,
    /// Executable search path used to decide whether a Linux app is installed
    pub bin_dirs: Vec<PathBuf>,
    /// Self-contained installs (`/opt/<name>`)
    pub opt_dir: PathBuf,
    pub docker_bin: PathBuf,
    pub du_bin: PathBuf,
    /// Per-category root overrides from the config file
    pub category_paths: BTreeMap<String, PathBuf>,
}

impl HostLayout {
    /// Detect the layout of the running machine
    pub fn detect(config: &Config) -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
        let mut layout = Self::for_home(Platform::current(), home);
        layout.category_paths = config.category_paths.clone();
        if let Some(path) = std::env::var_os("PATH") {
            let mut bins: Vec<PathBuf> = std::env::split_paths(&path).collect();
            for extra in &layout.bin_dirs {
                if !bins.contains(extra) {
                    bins.push(extra.clone());
                }
            }
            layout.bin_dirs = bins;
        }
        layout
    }

    /// Layout rooted at an arbitrary home directory with system defaults
    /// for everything else
    pub fn for_home(platform: Platform, home: PathBuf) -> Self {
        Self {
            platform,
            home,
            temp_dir: std::env::temp_dir(),
            applications_dir: PathBuf::from("/Applications"),
            bin_dirs: vec![PathBuf::from("/usr/bin"), PathBuf::from("/usr/local/bin")],
            opt_dir: PathBuf::from("/opt"),
            docker_bin: PathBuf::from("docker"),
            du_bin: PathBuf::from("du"),
            category_paths: BTreeMap::new(),
        }
    }

    /// Root directory for a single-path category; `None` for special
    /// categories and for categories with no meaning on this platform
    pub fn category_root(&self, category: Category) -> Option<PathBuf> {
        if category.is_special() {
            return None;
        }
        if let Some(path) = self.category_paths.get(category.name()) {
            return Some(expand_home(path, &self.home));
        }
        category.default_root(self.platform, &self.home, &self.temp_dir)
    }

    /// Existing project roots under home
    pub fn project_roots(&self) -> Vec<PathBuf> {
        PROJECT_ROOT_NAMES
            .iter()
            .map(|name| self.home.join(name))
            .filter(|p| p.is_dir())
            .collect()
    }

    pub fn application_support_dir(&self) -> PathBuf {
        self.home.join("Library/Application Support")
    }

    pub fn preferences_dir(&self) -> PathBuf {
        self.home.join("Library/Preferences")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.home.join(".config")
    }
}

/// Expand a leading `~` against the given home
pub fn expand_home(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}
