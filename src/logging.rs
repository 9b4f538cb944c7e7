//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/pushapp/pushapp.log` (or platform equivalent)
//! with 10 MB size-based rotation. Set `DEBUG_LOGGING=1` to enable debug
//! output for this crate.

use std::path::PathBuf;

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_DIR_NAME: &str = "pushapp";
const LOG_FILE_NAME: &str = "pushapp.log";
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Initialize logging with dual output (file + stderr).
///
/// Returns a `WorkerGuard` that MUST be held for the application lifetime
/// so buffered log lines are flushed on shutdown. Console output goes to
/// stderr so it does not interleave with shell replies on stdout.
///
/// If the log directory cannot be created, returns `None` and logs to
/// stderr only.
pub fn init() -> Option<WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let Some(log_dir) = log_dir() else {
        init_console_only(debug_logging);
        return None;
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Subscriber is not installed yet
        eprintln!("Failed to create log directory {log_dir:?}: {e}, using stderr only");
        init_console_only(debug_logging);
        return None;
    }

    // Keep pushapp.log and pushapp.log.1
    let log_path = log_dir.join(LOG_FILE_NAME);
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(MAX_LOG_SIZE),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {log_path:?}: {e}");
            init_console_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_span_events(FmtSpan::NONE);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(filter(debug_logging))
        .init();

    tracing::info!(log_file = ?log_path, debug_logging, "pushapp logging initialized");

    Some(guard)
}

/// `~/.config/pushapp` on Linux, `%APPDATA%/pushapp` on Windows
pub fn log_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(LOG_DIR_NAME))
}

fn filter(debug_logging: bool) -> EnvFilter {
    EnvFilter::new(filter_directive(debug_logging))
}

fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        "info,pushapp_bridge=debug,pushapp=debug"
    } else {
        "info"
    }
}

fn init_console_only(debug_logging: bool) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(filter(debug_logging))
        .init();

    tracing::info!(debug_logging, "pushapp logging initialized (stderr only)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_directive_targets_this_crate() {
        assert_eq!(filter_directive(false), "info");
        assert!(filter_directive(true).contains("pushapp_bridge=debug"));
    }

    #[test]
    fn log_dir_is_named_after_app() {
        if let Some(dir) = log_dir() {
            assert!(dir.ends_with(LOG_DIR_NAME));
        }
    }
}
