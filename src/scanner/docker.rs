use std::process::Command;
use std::time::Duration;

use crate::common::errors::CommandError;
use crate::common::platform::HostLayout;
use crate::common::process;

/// Result of `docker volume prune`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumePruneReport {
    pub volumes_removed: u64,
    pub bytes_reclaimed: u64,
}

/// Count Docker volumes; `None` when the CLI is missing or the daemon does
/// not answer in time
pub fn volume_count(layout: &HostLayout, timeout: Duration) -> Option<u64> {
    let mut cmd = Command::new(&layout.docker_bin);
    cmd.args(["volume", "ls", "-q"]);

    match process::run_checked(cmd, timeout) {
        Ok(stdout) => Some(stdout.lines().filter(|l| !l.trim().is_empty()).count() as u64),
        Err(e) => {
            tracing::debug!(error = %e, "docker volume listing unavailable");
            None
        }
    }
}

/// Prune unused volumes, killing the CLI if the daemon hangs past `timeout`
pub fn prune_volumes(layout: &HostLayout, timeout: Duration) -> Result<VolumePruneReport, CommandError> {
    let mut cmd = Command::new(&layout.docker_bin);
    cmd.args(["volume", "prune", "-f"]);
    let stdout = process::run_checked(cmd, timeout)?;
    Ok(parse_prune_output(&stdout))
}

/// Parse the `Deleted Volumes:` list and reclaimed-space line
fn parse_prune_output(stdout: &str) -> VolumePruneReport {
    let mut report = VolumePruneReport::default();
    let mut in_list = false;

    for line in stdout.lines() {
        let line = line.trim();
        if line.starts_with("Deleted Volumes") {
            in_list = true;
        } else if let Some(size) = line.strip_prefix("Total reclaimed space:") {
            report.bytes_reclaimed = parse_size_string(size);
            in_list = false;
        } else if line.is_empty() {
            in_list = false;
        } else if in_list {
            report.volumes_removed += 1;
        }
    }

    report
}

/// Parse Docker size strings like "2.5GB", "150MB", "1.2kB"
fn parse_size_string(s: &str) -> u64 {
    let s = s.trim();
    if s == "0B" || s.is_empty() {
        return 0;
    }

    let num_end = s
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(s.len());

    let num: f64 = s[..num_end].parse().unwrap_or(0.0);
    let unit = s[num_end..].trim().to_uppercase();

    match unit.as_str() {
        "B" => num as u64,
        "KB" => (num * 1024.0) as u64,
        "MB" => (num * 1024.0 * 1024.0) as u64,
        "GB" => (num * 1024.0 * 1024.0 * 1024.0) as u64,
        "TB" => (num * 1024.0 * 1024.0 * 1024.0 * 1024.0) as u64,
        _ => num as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::platform::Platform;
    use std::path::PathBuf;

    #[test]
    fn test_parse_size_string() {
        assert_eq!(parse_size_string("0B"), 0);
        assert_eq!(parse_size_string("100B"), 100);
        assert_eq!(parse_size_string("1kB"), 1024);
        assert_eq!(parse_size_string("1MB"), 1048576);
        assert_eq!(parse_size_string(" 1.5GB"), (1.5 * 1024.0 * 1024.0 * 1024.0) as u64);
        assert_eq!(parse_size_string(""), 0);
    }

    #[test]
    fn test_parse_prune_output() {
        let out = "Deleted Volumes:\nabc123\nproject_db\n\nTotal reclaimed space: 2MB\n";
        let report = parse_prune_output(out);
        assert_eq!(report.volumes_removed, 2);
        assert_eq!(report.bytes_reclaimed, 2 * 1024 * 1024);
    }

    #[test]
    fn test_parse_prune_nothing() {
        let report = parse_prune_output("Total reclaimed space: 0B\n");
        assert_eq!(report, VolumePruneReport::default());
    }

    #[test]
    fn test_missing_docker_cli() {
        let mut layout = HostLayout::for_home(Platform::Linux, PathBuf::from("/tmp"));
        layout.docker_bin = PathBuf::from("/nonexistent/docker");
        assert_eq!(volume_count(&layout, Duration::from_secs(1)), None);
        assert!(matches!(
            prune_volumes(&layout, Duration::from_secs(1)),
            Err(CommandError::Spawn { .. })
        ));
    }
}
