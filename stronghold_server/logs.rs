use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// `info` everywhere, `debug` for the stronghold crates.
const DEFAULT_FILTER: &str = "info,stronghold=debug";

/// Logs to stdout and to `stronghold.log` in `dir`, rotated daily.
///
/// Levels come from `RUST_LOG` when set. File output stops once the
/// returned guard is dropped, so `main` holds it until shutdown.
pub fn setup_logging(dir: impl AsRef<Path>) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(dir, "stronghold.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true),
        )
        .with(fmt::layer().with_writer(std::io::stdout).with_target(true))
        .init();

    guard
}
