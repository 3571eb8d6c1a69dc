use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::common::errors::HousekeepError;
use crate::scanner::targets::{Category, ScanLimits};

/// Global housekeep configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Age filter applied when the command line gives none (0 = everything)
    #[serde(default)]
    pub default_min_age_days: u32,

    /// Skip the generic confirmation prompt by default
    #[serde(default)]
    pub force: bool,

    /// Write a daily log file under ~/.housekeep/logs
    #[serde(default = "default_log_to_file")]
    pub log_to_file: bool,

    /// Scan caps and helper timeouts
    #[serde(default)]
    pub limits: ScanLimits,

    /// Per-category root overrides, e.g. `caches = "~/scratch/cache"`
    #[serde(default)]
    pub category_paths: BTreeMap<String, PathBuf>,
}

fn default_log_to_file() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_min_age_days: 0,
            force: false,
            log_to_file: default_log_to_file(),
            limits: ScanLimits::default(),
            category_paths: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Get the housekeep data directory (~/.housekeep)
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".housekeep")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Get the logs directory
    pub fn logs_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }

    /// Load config from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit file, or defaults if absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Reject `[category_paths]` keys that are not single-path categories
    pub fn validate(&self) -> Result<(), HousekeepError> {
        for name in self.category_paths.keys() {
            let message = match name.parse::<Category>() {
                Err(_) => format!("unknown category '{}' in [category_paths]", name),
                Ok(category) if category.is_special() => format!("'{}' has no single root to override", name),
                Ok(_) => continue,
            };
            return Err(HousekeepError::Config {
                path: Self::config_path(),
                message,
            });
        }
        Ok(())
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        Self::init_dirs()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Initialize all housekeep directories
    pub fn init_dirs() -> Result<()> {
        for dir in [Self::data_dir(), Self::logs_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_min_age_days, 0);
        assert!(!config.force);
        assert!(config.log_to_file);
        assert!(config.category_paths.is_empty());
        assert_eq!(config.limits.samples_per_dir, 50);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            default_min_age_days = 14

            [limits]
            dirs_per_root = 5

            [category_paths]
            caches = "~/scratch"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_min_age_days, 14);
        assert_eq!(config.limits.dirs_per_root, 5);
        assert_eq!(config.limits.docker_timeout_secs, 10);
        assert_eq!(config.category_paths["caches"], PathBuf::from("~/scratch"));
    }

    #[test]
    fn test_validate_category_paths() {
        let mut config = Config::default();
        config.category_paths.insert("caches".into(), PathBuf::from("/tmp/c"));
        assert!(config.validate().is_ok());

        config.category_paths.insert("downloads".into(), PathBuf::from("/tmp/d"));
        assert!(matches!(config.validate(), Err(HousekeepError::Config { .. })));

        config.category_paths.remove("downloads");
        config.category_paths.insert("node_modules".into(), PathBuf::from("/tmp/n"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/housekeep/config.toml")).unwrap();
        assert!(!config.force);
    }
}
