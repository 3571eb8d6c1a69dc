use std::path::{Path, PathBuf};
use walkdir::DirEntry;

use crate::common::platform::HostLayout;
use crate::scanner::walker::{BoundedWalk, ScanCaps};

/// An application found in the inventory phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledApp {
    /// Bundle file name without `.app`
    pub name: String,
    pub bundle_id: Option<String>,
    pub path: PathBuf,
}

fn is_app_bundle(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.path().extension().and_then(|e| e.to_str()) == Some("app")
}

/// Discover `.app` bundles up to `max_depth` below the applications
/// directory. Bundles are not searched for nested apps.
pub fn discover_apps(applications_dir: &Path, max_depth: usize) -> Vec<InstalledApp> {
    let mut apps: Vec<InstalledApp> = BoundedWalk::new(applications_dir, ScanCaps::complete(max_depth), is_app_bundle)
        .skip_matched_dirs()
        .filter_map(|c| parse_app_bundle(&c.path))
        .collect();

    apps.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    tracing::debug!(count = apps.len(), dir = %applications_dir.display(), "application inventory");
    apps
}

/// Parse an .app bundle to extract its display name and identifier
fn parse_app_bundle(app_path: &Path) -> Option<InstalledApp> {
    let name = app_path.file_stem()?.to_string_lossy().to_string();
    let info_plist = app_path.join("Contents/Info.plist");
    let bundle_id = if info_plist.exists() {
        parse_bundle_id(&info_plist)
    } else {
        None
    };

    Some(InstalledApp {
        name,
        bundle_id,
        path: app_path.to_path_buf(),
    })
}

/// Read `CFBundleIdentifier` from an Info.plist (XML or binary)
fn parse_bundle_id(path: &Path) -> Option<String> {
    let value = match plist::Value::from_file(path) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "unreadable Info.plist");
            return None;
        }
    };

    value
        .as_dictionary()?
        .get("CFBundleIdentifier")
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

/// Linux notion of "installed": an executable with the same name on the
/// search path, or a self-contained install under `/opt/<name>`
pub fn is_installed_on_linux(name: &str, layout: &HostLayout) -> bool {
    let lower = name.to_lowercase();
    let on_path = layout.bin_dirs.iter().any(|dir| {
        [name, lower.as_str()]
            .iter()
            .any(|n| dir.join(n).is_file())
    });
    on_path || layout.opt_dir.join(name).exists() || layout.opt_dir.join(&lower).exists()
}
