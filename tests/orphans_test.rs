use std::fs;
use std::path::Path;
use tempfile::TempDir;

use housekeep::apps::orphans::{self, associated_preferences};
use housekeep::cleaner::{DeletionEngine, DeletionStatus, RunConfig};
use housekeep::common::platform::{HostLayout, Platform};
use housekeep::common::prompt::AutoConfirm;
use housekeep::scanner::targets::{Category, ScanLimits};

fn install_app(applications: &Path, name: &str, bundle_id: &str) {
    let contents = applications.join(format!("{}.app/Contents", name));
    fs::create_dir_all(&contents).unwrap();
    let plist = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>CFBundleIdentifier</key>
    <string>{}</string>
</dict>
</plist>
"#,
        bundle_id
    );
    fs::write(contents.join("Info.plist"), plist).unwrap();
}

fn support_dir(home: &Path, name: &str) {
    let dir = home.join("Library/Application Support").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("state.json"), b"{}").unwrap();
}

fn mac_layout(home: &Path) -> HostLayout {
    let mut layout = HostLayout::for_home(Platform::MacOs, home.to_path_buf());
    layout.applications_dir = home.join("Applications");
    layout
}

#[test]
fn test_cursor_variant_is_not_orphaned() {
    let tmp = TempDir::new().unwrap();
    install_app(&tmp.path().join("Applications"), "Cursor", "com.todesktop.230313mzl4w4u92");
    support_dir(tmp.path(), "com.todesktop.230313abc123");

    let layout = mac_layout(tmp.path());
    let limits = ScanLimits::default();

    let inspected = orphans::inspect_support_dirs(&layout, &limits);
    assert_eq!(inspected.len(), 1);
    assert_eq!(inspected[0].matched_installed_app.as_deref(), Some("Cursor"));
    assert!(orphans::find_orphaned_apps(&layout, &limits).is_empty());
}

#[test]
fn test_orphans_and_allowlist() {
    let tmp = TempDir::new().unwrap();
    install_app(&tmp.path().join("Applications"), "Slack", "com.tinyspeck.slackmacgap");
    support_dir(tmp.path(), "Slack");
    support_dir(tmp.path(), "com.gone.Widget");
    support_dir(tmp.path(), "com.apple.TextEdit");
    support_dir(tmp.path(), "Google");
    support_dir(tmp.path(), "Telegram Desktop");

    let layout = mac_layout(tmp.path());
    let found = orphans::find_orphaned_apps(&layout, &ScanLimits::default());
    let ids: Vec<&str> = found.iter().map(|o| o.app_identifier.as_str()).collect();
    assert_eq!(ids, vec!["Telegram Desktop", "com.gone.Widget"]);
    assert!(found.iter().all(|o| o.is_orphaned()));
    assert!(found[1].is_bundle_id());
}

#[test]
fn test_preferences_found_by_identifier() {
    let tmp = TempDir::new().unwrap();
    support_dir(tmp.path(), "com.gone.Widget");
    let prefs = tmp.path().join("Library/Preferences");
    fs::create_dir_all(&prefs).unwrap();
    fs::write(prefs.join("com.gone.Widget.plist"), b"x").unwrap();
    fs::write(prefs.join("com.gone.Widget.helper.plist"), b"x").unwrap();
    fs::write(prefs.join("com.other.App.plist"), b"x").unwrap();

    let layout = mac_layout(tmp.path());
    let found = orphans::find_orphaned_apps(&layout, &ScanLimits::default());
    assert_eq!(found.len(), 1);
    let plists = associated_preferences(&layout, &found[0]);
    assert_eq!(plists.len(), 2);
    assert!(plists.iter().all(|p| p.to_string_lossy().contains("com.gone.Widget")));
}

#[test]
fn test_orphan_deletion_removes_data_and_plists() {
    let tmp = TempDir::new().unwrap();
    install_app(&tmp.path().join("Applications"), "Cursor", "com.todesktop.230313mzl4w4u92");
    support_dir(tmp.path(), "com.todesktop.230313abc123");
    support_dir(tmp.path(), "com.gone.Widget");
    let prefs = tmp.path().join("Library/Preferences");
    fs::create_dir_all(&prefs).unwrap();
    fs::write(prefs.join("com.gone.Widget.plist"), b"x").unwrap();

    let layout = mac_layout(tmp.path());
    let limits = ScanLimits::default();
    let mut confirm = AutoConfirm(true);
    let report = DeletionEngine::new(&layout, &limits, RunConfig::default(), &mut confirm)
        .delete_category(Category::OrphanedApps);

    assert_eq!(report.status, DeletionStatus::Completed);
    assert_eq!(report.deleted, 2);
    let support = tmp.path().join("Library/Application Support");
    assert!(!support.join("com.gone.Widget").exists());
    assert!(!prefs.join("com.gone.Widget.plist").exists());
    assert!(support.join("com.todesktop.230313abc123").exists());
    assert!(support.is_dir());
}
