//! Support and config directories whose owning application is gone.
//!
//! Matching is lenient on purpose: every rule errs towards "still
//! installed", because a false orphan would offer a live app's data for
//! deletion.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::detector::{self, InstalledApp};
use crate::common::platform::{HostLayout, Platform};
use crate::scanner::targets::ScanLimits;
use crate::scanner::walker;

/// Support-directory prefixes of vendors whose data is never offered
const VENDOR_ALLOWLIST: &[&str] = &["com.apple", "Apple", "Microsoft", "Google", "Adobe"];

/// ~/.config entries owned by the desktop stack rather than an application
const LINUX_SYSTEM_CONFIG: &[&str] = &[
    "autostart",
    "dconf",
    "environment.d",
    "fontconfig",
    "gtk-2.0",
    "gtk-3.0",
    "gtk-4.0",
    "ibus",
    "menus",
    "pulse",
    "systemd",
    "user-dirs.dirs",
];

/// Bundle-ID segments that say nothing about the product
const GENERIC_SEGMENT: &str = "com";
const MIN_SEGMENT_LEN: usize = 3;

/// Leading characters two sibling IDs must share to count as variants of
/// one product (`com.todesktop.230313mzl4w4u92` vs `com.todesktop.230313abc123`)
const MIN_VARIANT_PREFIX: usize = 4;

/// A support directory and the installed app it was matched to, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanedApplication {
    pub directory_path: PathBuf,
    /// Bundle ID or plain app name, taken from the directory name
    pub app_identifier: String,
    /// `None` when genuinely orphaned
    pub matched_installed_app: Option<String>,
    pub size_bytes: u64,
}

impl OrphanedApplication {
    pub fn is_orphaned(&self) -> bool {
        self.matched_installed_app.is_none()
    }

    pub fn is_bundle_id(&self) -> bool {
        looks_like_bundle_id(&self.app_identifier)
    }
}

/// Three or more dot-separated segments with a lowercase namespace
/// (`com.vendor.App`); anything else is a plain app name
pub fn looks_like_bundle_id(name: &str) -> bool {
    let segments: Vec<&str> = name.split('.').collect();
    if segments.len() < 3 {
        return false;
    }
    let valid_chars = segments.iter().all(|s| {
        !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    });
    valid_chars && segments[0].chars().all(|c| c.is_ascii_lowercase())
}

fn is_vendor_allowlisted(name: &str) -> bool {
    VENDOR_ALLOWLIST.iter().any(|prefix| name.starts_with(prefix))
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Either ID is a prefix of the other, or both are variants of one
/// product under the same vendor namespace
fn bundle_ids_related(candidate: &str, installed: &str) -> bool {
    let a = candidate.to_lowercase();
    let b = installed.to_lowercase();
    if a.starts_with(&b) || b.starts_with(&a) {
        return true;
    }
    match (a.rsplit_once('.'), b.rsplit_once('.')) {
        (Some((a_ns, a_last)), Some((b_ns, b_last))) => {
            a_ns == b_ns && a_ns.contains('.') && common_prefix_len(a_last, b_last) >= MIN_VARIANT_PREFIX
        }
        _ => false,
    }
}

/// Case-insensitive substring match in either direction
fn names_overlap(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

/// Segments of a bundle ID worth comparing with display names
fn significant_segments(bundle_id: &str) -> impl Iterator<Item = &str> {
    bundle_id.split('.').filter(|s| {
        !s.eq_ignore_ascii_case(GENERIC_SEGMENT)
            && s.chars().count() >= MIN_SEGMENT_LEN
            && !s.chars().all(|c| c.is_ascii_digit())
    })
}

/// Find the installed app owning a support directory name.
///
/// Exact bundle-ID equality is checked first, then prefix/variant IDs,
/// then name heuristics.
pub fn match_installed<'a>(identifier: &str, apps: &'a [InstalledApp]) -> Option<&'a InstalledApp> {
    if looks_like_bundle_id(identifier) {
        if let Some(app) = apps.iter().find(|a| a.bundle_id.as_deref() == Some(identifier)) {
            return Some(app);
        }
        if let Some(app) = apps
            .iter()
            .find(|a| a.bundle_id.as_deref().is_some_and(|id| bundle_ids_related(identifier, id)))
        {
            return Some(app);
        }
        return apps
            .iter()
            .find(|a| significant_segments(identifier).any(|seg| names_overlap(seg, &a.name)));
    }

    apps.iter().find(|a| names_overlap(identifier, &a.name))
}

/// Candidate support directories, minus hidden and allowlisted entries
fn candidate_dirs(dir: &Path, skip: impl Fn(&str) -> bool) -> Vec<(String, PathBuf)> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "no support directory to inspect");
            return Vec::new();
        }
    };

    let mut candidates: Vec<(String, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_string();
            if name.starts_with('.') || skip(&name) {
                None
            } else {
                Some((name, e.path()))
            }
        })
        .collect();
    candidates.sort();
    candidates
}

/// Every candidate directory with its match, orphaned or not. Sizes are
/// left at zero.
pub fn inspect_support_dirs(layout: &HostLayout, limits: &ScanLimits) -> Vec<OrphanedApplication> {
    match layout.platform {
        Platform::MacOs => {
            let apps = detector::discover_apps(&layout.applications_dir, limits.app_inventory_depth);
            candidate_dirs(&layout.application_support_dir(), is_vendor_allowlisted)
                .into_iter()
                .map(|(name, path)| OrphanedApplication {
                    matched_installed_app: match_installed(&name, &apps).map(|a| a.name.clone()),
                    directory_path: path,
                    app_identifier: name,
                    size_bytes: 0,
                })
                .collect()
        }
        Platform::Linux => candidate_dirs(&layout.config_dir(), |n| LINUX_SYSTEM_CONFIG.contains(&n))
            .into_iter()
            .map(|(name, path)| OrphanedApplication {
                matched_installed_app: detector::is_installed_on_linux(&name, layout).then(|| name.clone()),
                directory_path: path,
                app_identifier: name,
                size_bytes: 0,
            })
            .collect(),
        Platform::Other => Vec::new(),
    }
}

/// Support directories with no installed owner, with aggregate sizes
pub fn find_orphaned_apps(layout: &HostLayout, limits: &ScanLimits) -> Vec<OrphanedApplication> {
    let orphans: Vec<OrphanedApplication> = inspect_support_dirs(layout, limits)
        .into_iter()
        .filter(OrphanedApplication::is_orphaned)
        .map(|mut o| {
            o.size_bytes = walker::aggregate_size(layout, limits, &o.directory_path);
            o
        })
        .collect();
    tracing::info!(count = orphans.len(), "orphaned application directories");
    orphans
}

/// Preference plists belonging to an orphan: `<bundle-id>.plist` by exact
/// name, plus anything whose name contains the identifier
pub fn associated_preferences(layout: &HostLayout, orphan: &OrphanedApplication) -> Vec<PathBuf> {
    let prefs = layout.preferences_dir();
    let mut found = Vec::new();

    let exact = prefs.join(format!("{}.plist", orphan.app_identifier));
    if exact.is_file() {
        found.push(exact);
    }

    if orphan.app_identifier.chars().count() >= MIN_SEGMENT_LEN {
        let pattern = format!(
            "{}/*{}*.plist",
            glob::Pattern::escape(&prefs.to_string_lossy()),
            glob::Pattern::escape(&orphan.app_identifier)
        );
        if let Ok(entries) = glob::glob(&pattern) {
            found.extend(entries.filter_map(|e| e.ok()).filter(|p| p.is_file()));
        }
    }

    found.sort();
    found.dedup();
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(name: &str, id: Option<&str>) -> InstalledApp {
        InstalledApp {
            name: name.to_string(),
            bundle_id: id.map(str::to_string),
            path: PathBuf::from(format!("/Applications/{}.app", name)),
        }
    }

    #[test]
    fn test_bundle_id_shape() {
        assert!(looks_like_bundle_id("com.todesktop.230313abc123"));
        assert!(looks_like_bundle_id("com.microsoft.VSCode"));
        assert!(!looks_like_bundle_id("Slack"));
        assert!(!looks_like_bundle_id("com.example"));
        assert!(!looks_like_bundle_id("Some App.v2.0"));
        assert!(!looks_like_bundle_id("com..app"));
    }

    #[test]
    fn test_exact_match_wins() {
        let apps = vec![
            app("Other", Some("com.vendor.tool.helper")),
            app("Tool", Some("com.vendor.tool")),
        ];
        assert_eq!(match_installed("com.vendor.tool", &apps).unwrap().name, "Tool");
    }

    #[test]
    fn test_vendor_suffix_variant_matches() {
        let apps = vec![app("Cursor", Some("com.todesktop.230313mzl4w4u92"))];
        let m = match_installed("com.todesktop.230313abc123", &apps);
        assert_eq!(m.map(|a| a.name.as_str()), Some("Cursor"));
    }

    #[test]
    fn test_prefix_match_either_direction() {
        let apps = vec![app("Zed", Some("dev.zed.Zed"))];
        assert!(match_installed("dev.zed.Zed.Preview", &apps).is_some());
        let apps = vec![app("Thing", Some("io.thing.app.beta"))];
        assert!(match_installed("io.thing.app", &apps).is_some());
    }

    #[test]
    fn test_segment_matches_display_name() {
        let apps = vec![app("Spotify", None)];
        assert!(match_installed("com.spotify.client", &apps).is_some());
    }

    #[test]
    fn test_generic_and_numeric_segments_ignored() {
        // "com" would be a substring of "Compass"
        let apps = vec![app("Compass", None)];
        assert!(match_installed("com.unrelated.vendorapp", &apps).is_none());
        let apps = vec![app("App 2024", None)];
        assert!(match_installed("org.2024.xy", &apps).is_none());
    }

    #[test]
    fn test_unrelated_namespace_not_variant() {
        let apps = vec![app("Chrome", Some("com.google.Chrome"))];
        assert!(match_installed("com.googlx.Chromium2", &apps).is_none());
        assert!(match_installed("net.other.player", &apps).is_none());
    }

    #[test]
    fn test_plain_name_substring_both_ways() {
        let apps = vec![app("Visual Studio Code", None), app("Discord", None)];
        assert!(match_installed("Code", &apps).is_some());
        assert!(match_installed("discord-canary", &apps).is_some());
        assert!(match_installed("Telegram", &apps).is_none());
    }

    #[test]
    fn test_short_names_still_match() {
        let apps = vec![app("Go", None)];
        assert!(match_installed("Go", &apps).is_some());
        assert!(match_installed("Google Earth", &apps).is_some());
        let apps = vec![app("R", None)];
        assert_eq!(match_installed("RStudio", &apps).map(|a| a.name.as_str()), Some("R"));
    }

    #[test]
    fn test_short_bundle_segments_ignored() {
        // "io" and "r" are under the segment floor
        let apps = vec![app("Radio", None)];
        assert!(match_installed("io.r.zz", &apps).is_none());
    }

    #[test]
    fn test_vendor_allowlist() {
        assert!(is_vendor_allowlisted("com.apple.TextEdit"));
        assert!(is_vendor_allowlisted("Microsoft Teams"));
        assert!(is_vendor_allowlisted("Google"));
        assert!(!is_vendor_allowlisted("Slack"));
    }
}
