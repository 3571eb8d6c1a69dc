use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Typed errors for housekeep operations.
/// We use `anyhow` at the top level for CLI error handling,
/// but these typed errors allow modules to be precise about failures.
#[derive(Debug, Error)]
pub enum HousekeepError {
    /// File system operation failed
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Category name is not part of the taxonomy
    #[error("Unknown cleanup category '{name}'")]
    UnknownCategory { name: String },

    /// Category exists but is not offered on this platform
    #[error("Category '{category}' is not available on {platform}")]
    UnsupportedCategory { category: String, platform: String },

    /// Refused to touch a protected path
    #[error("Refusing to remove protected path: '{}'", path.display())]
    ProtectedPath { path: PathBuf },

    /// Configuration file is invalid
    #[error("Config error in '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },
}

/// Failure of an external helper command (`du`, `docker`, `osascript`).
#[derive(Debug, Error)]
pub enum CommandError {
    /// Binary missing or not executable
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Process outlived its wall-clock budget and was terminated
    #[error("'{program}' timed out after {}s", timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    /// Process ran but reported failure
    #[error("'{program}' exited with status {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl CommandError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CommandError::TimedOut { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unknown_category() {
        let err = HousekeepError::UnknownCategory {
            name: "downloads".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown cleanup category 'downloads'");
    }

    #[test]
    fn test_timeout_flag() {
        let err = CommandError::TimedOut {
            program: "docker".to_string(),
            timeout: Duration::from_secs(10),
        };
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "'docker' timed out after 10s");
    }
}
