//! Lexical path classification.
//!
//! Everything in here works on path strings only and never touches the
//! filesystem: these predicates run once per candidate in scans that can
//! see hundreds of thousands of entries.

use std::ffi::OsStr;
use std::path::{Component, Path};

/// Tool and version-control metadata directories. Never deleted, never
/// descended into.
pub const PROTECTED_DIR_NAMES: &[&str] = &[".git", ".claude", ".cursor", ".task-flow"];

/// Finder's per-folder view state file
const DS_STORE: &str = ".DS_Store";

/// Path segments that mark development artifacts
pub const DEV_SEGMENTS: &[&str] = &[
    "node_modules",
    "__pycache__",
    ".pytest_cache",
    ".next",
    "dist",
    "build",
    "target",
    ".gradle",
    ".mvn",
    ".venv",
    "venv",
    ".cache",
    "coverage",
    ".nyc_output",
    ".turbo",
    ".parcel-cache",
];

/// File extensions produced by JS/TS tooling
const DEV_EXTENSIONS: &[&str] = &["map", "tsbuildinfo"];

/// Paths that must NEVER be removed wholesale, whatever category asks for it.
const PROTECTED_PATHS: &[&str] = &[
    "/",
    "/System",
    "/Applications",
    "/Users",
    "/home",
    "/Library",
    "/usr",
    "/bin",
    "/sbin",
    "/var",
    "/var/log",
    "/etc",
    "/opt",
    "/private",
    "/tmp",
    "/Volumes",
];

/// Paths under home that must never be removed wholesale
const PROTECTED_HOME_DIRS: &[&str] = &[
    "Desktop",
    "Documents",
    "Downloads",
    "Pictures",
    "Music",
    "Movies",
    "Library",
    "Library/Application Support",
    "Library/Preferences",
    "Applications",
    ".config",
    ".local",
    ".local/share",
    ".ssh",
    ".gnupg",
];

fn normal_segments(path: &Path) -> impl Iterator<Item = &OsStr> {
    path.components().filter_map(|c| match c {
        Component::Normal(name) => Some(name),
        _ => None,
    })
}

fn has_segment(path: &Path, names: &[&str]) -> bool {
    normal_segments(path).any(|seg| names.iter().any(|n| seg == OsStr::new(n)))
}

/// True when `first` is immediately followed by `second` somewhere in the path.
fn has_segment_pair(path: &Path, first: &str, second: &str) -> bool {
    let segs: Vec<&OsStr> = normal_segments(path).collect();
    segs.windows(2)
        .any(|w| w[0] == OsStr::new(first) && w[1] == OsStr::new(second))
}

/// Is this directory name one the walkers must prune?
pub fn is_protected_dir_name(name: &OsStr) -> bool {
    PROTECTED_DIR_NAMES.iter().any(|n| name == OsStr::new(n))
}

/// Decide whether a path must be kept out of every deletion.
///
/// Protected when the path is, or lies inside, one of
/// [`PROTECTED_DIR_NAMES`] (segment equality, so `.github` or `my.git` do
/// not count), or when it is a `.DS_Store` outside `Library/Caches`.
pub fn should_exclude(path: &Path) -> bool {
    if has_segment(path, PROTECTED_DIR_NAMES) {
        return true;
    }

    if path.file_name() == Some(OsStr::new(DS_STORE)) {
        return !has_segment_pair(path, "Library", "Caches");
    }

    false
}

/// Is the path inside a platform log directory (`Library/Logs`, `/var/log`)?
pub fn is_in_log_dir(path: &Path) -> bool {
    has_segment_pair(path, "Library", "Logs") || path.starts_with("/var/log")
}

/// Soft classifier for development artifacts.
///
/// Never blocks a deletion; a positive answer only triggers the extra
/// "development files detected" confirmation.
pub fn is_dev_file(path: &Path) -> bool {
    if has_segment(path, DEV_SEGMENTS) {
        return true;
    }

    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if DEV_EXTENSIONS.contains(&ext) {
            return true;
        }
        if ext == "log" && !is_in_log_dir(path) {
            return true;
        }
    }

    false
}

/// Check if a path is a system root or a critical home directory that must
/// never be removed as a whole.
pub fn is_protected(path: &Path, home: &Path) -> bool {
    if PROTECTED_PATHS.iter().any(|p| path == Path::new(p)) {
        return true;
    }

    if path == home {
        return true;
    }

    PROTECTED_HOME_DIRS
        .iter()
        .any(|dir| path == home.join(dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_names_as_segments() {
        assert!(should_exclude(Path::new("/x/.git")));
        assert!(should_exclude(Path::new("/x/.git/y")));
        assert!(should_exclude(Path::new("/x/.claude")));
        assert!(should_exclude(Path::new("/x/y/.cursor/z")));
        assert!(should_exclude(Path::new("/x/.task-flow/state.json")));
    }

    #[test]
    fn test_protected_names_not_substrings() {
        assert!(!should_exclude(Path::new("/x/.github/workflows/ci.yml")));
        assert!(!should_exclude(Path::new("/x/my.git/y")));
        assert!(!should_exclude(Path::new("/x/.gitignore")));
        assert!(!should_exclude(Path::new("/x/.cursorrules")));
    }

    #[test]
    fn test_dev_paths_deletable() {
        assert!(!should_exclude(Path::new("/x/node_modules/y")));
        assert!(!should_exclude(Path::new("/x/build/z")));
    }

    #[test]
    fn test_ds_store_rules() {
        assert!(!should_exclude(Path::new("/Users/a/Library/Caches/.DS_Store")));
        assert!(!should_exclude(Path::new("/Users/a/Library/Caches/com.app/.DS_Store")));
        assert!(should_exclude(Path::new("/Users/a/Documents/.DS_Store")));
        assert!(should_exclude(Path::new("/Users/a/Library/.DS_Store")));
    }

    #[test]
    fn test_is_dev_file_segments() {
        assert!(is_dev_file(Path::new("/p/node_modules/pkg/index.js")));
        assert!(is_dev_file(Path::new("/p/__pycache__/m.cpython-311.pyc")));
        assert!(is_dev_file(Path::new("/p/target/debug/app")));
        assert!(!is_dev_file(Path::new("/p/src/main.rs")));
        assert!(!is_dev_file(Path::new("/p/distribution/readme.txt")));
    }

    #[test]
    fn test_is_dev_file_extensions() {
        assert!(is_dev_file(Path::new("/p/app.js.map")));
        assert!(is_dev_file(Path::new("/p/tsconfig.tsbuildinfo")));
        assert!(is_dev_file(Path::new("/p/npm-debug.log")));
        assert!(!is_dev_file(Path::new("/Users/a/Library/Logs/app.log")));
        assert!(!is_dev_file(Path::new("/var/log/syslog.log")));
    }

    #[test]
    fn test_is_protected_roots() {
        let home = Path::new("/home/alice");
        assert!(is_protected(Path::new("/"), home));
        assert!(is_protected(Path::new("/usr"), home));
        assert!(is_protected(home, home));
        assert!(is_protected(&home.join("Documents"), home));
        assert!(is_protected(&home.join(".ssh"), home));
        assert!(!is_protected(&home.join(".cache/pip"), home));
        assert!(!is_protected(Path::new("/tmp/scratch"), home));
    }
}
