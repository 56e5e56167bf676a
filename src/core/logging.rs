use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::core::config::AppPaths;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Filter used when `RUST_LOG` is unset: our own events at info, HTTP client
/// internals only when they warn.
const DEFAULT_DIRECTIVES: &str = "info,hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn";

/// Which process is logging; selects the rolling file under the log directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Server,
    Indexer,
}

impl LogTarget {
    pub fn file_name(self) -> &'static str {
        match self {
            LogTarget::Server => "server.log",
            LogTarget::Indexer => "indexer.log",
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Installs the global subscriber: stdout plus a daily-rolling file for
/// `target`. Later calls are no-ops.
pub fn init(paths: &AppPaths, target: LogTarget) {
    if LOG_GUARD.get().is_some() {
        return;
    }

    let log_dir = &paths.log_dir;
    if let Err(err) = std::fs::create_dir_all(log_dir) {
        eprintln!("Cannot create log directory {}: {}", log_dir.display(), err);
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, target.file_name());
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking);

    // a subscriber installed by a test harness wins
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(stdout_layer)
        .with(file_layer)
        .try_init();
}
