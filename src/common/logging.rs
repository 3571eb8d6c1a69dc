use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::common::config::Config;

/// Install the global subscriber: filtered stderr output plus, when
/// `log_file` is set, a daily rolling file under `~/.housekeep/logs`.
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the whole run.
pub fn init(verbose: bool, log_file: bool) -> Option<WorkerGuard> {
    let default_level = if verbose { "housekeep=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = if log_file && Config::init_dirs().is_ok() {
        let appender = tracing_appender::rolling::daily(Config::logs_dir(), "housekeep.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(EnvFilter::new("housekeep=info"));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let _ = tracing_subscriber::registry()
        .with(stderr_layer.with_filter(filter))
        .with(file_layer)
        .try_init();

    guard
}
