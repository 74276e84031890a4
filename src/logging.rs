//! Logging setup: stderr plus an append-only log file.
//!
//! The log file defaults to `~/.local/share/focus_it/focus_it.log` (or the
//! platform equivalent). `RUST_LOG` overrides the level of both outputs.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn default_log_path() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("", "", "focus_it") {
        pd.data_local_dir().join("focus_it.log")
    } else {
        PathBuf::from("focus_it.log")
    }
}

fn filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install the global subscriber. `console_level` is the default for
/// stderr, which the terminal surface keeps quiet so the countdown line
/// stays readable.
///
/// The returned guard flushes the file writer on drop and must be held
/// until exit. Without a usable log directory, logs go to stderr only.
pub fn init(
    log_path: &Path,
    console_level: &str,
    verbose: bool,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let file_level = if verbose { "debug" } else { "info" };
    let console_level = if verbose { "debug" } else { console_level };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter(console_level));

    let (dir, file_name) = match (log_path.parent(), log_path.file_name()) {
        (Some(dir), Some(name)) => (dir, name),
        _ => {
            tracing_subscriber::registry().with(stderr_layer).init();
            tracing::warn!(path = %log_path.display(), "invalid log path, using stderr only");
            return None;
        }
    };

    if let Err(e) = std::fs::create_dir_all(dir) {
        // Can't use tracing yet since subscriber not initialized
        eprintln!(
            "Failed to create log directory {}: {}, using stderr only",
            dir.display(),
            e
        );
        tracing_subscriber::registry().with(stderr_layer).init();
        return None;
    }

    let (non_blocking, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_filter(filter(file_level));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::info!(log_file = %log_path.display(), verbose, "logging initialized");
    Some(guard)
}
