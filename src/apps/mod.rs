pub mod detector;
pub mod orphans;

pub use detector::{discover_apps, InstalledApp};
pub use orphans::{find_orphaned_apps, inspect_support_dirs, match_installed, OrphanedApplication};
