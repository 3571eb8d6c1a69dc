use std::io::Read;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::common::errors::CommandError;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Run a command, killing it once `timeout` of wall-clock time has passed.
///
/// stdout and stderr are drained on helper threads so a chatty child can
/// never block on a full pipe while we wait. On timeout the child gets
/// SIGKILL; termination is best effort and the reader threads are left to
/// finish on their own.
pub fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<Output, CommandError> {
    let program = command.get_program().to_string_lossy().into_owned();
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| CommandError::Spawn {
        program: program.clone(),
        source,
    })?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);
    let deadline = Instant::now() + timeout;

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                tracing::warn!(%program, secs = timeout.as_secs(), "command timed out, terminating");
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandError::TimedOut { program, timeout });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                return Err(CommandError::Spawn { program, source });
            }
        }
    };

    Ok(Output {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

/// Like [`run_with_timeout`], but a non-zero exit is an error and stdout
/// comes back as text.
pub fn run_checked(command: Command, timeout: Duration) -> Result<String, CommandError> {
    let program = command.get_program().to_string_lossy().into_owned();
    let output = run_with_timeout(command, timeout)?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(CommandError::Failed {
            program,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Ask `du` for the aggregate on-disk size of a tree, in bytes.
pub fn disk_usage(du_bin: &Path, path: &Path, timeout: Duration) -> Option<u64> {
    let mut cmd = Command::new(du_bin);
    cmd.arg("-sk").arg(path);
    // du exits non-zero when some subtree is unreadable but still prints a total
    let output = run_with_timeout(cmd, timeout).ok()?;
    parse_du_kilobytes(&String::from_utf8_lossy(&output.stdout)).map(|kb| kb * 1024)
}

fn parse_du_kilobytes(stdout: &str) -> Option<u64> {
    stdout
        .lines()
        .last()?
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
