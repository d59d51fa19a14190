use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr log subscriber.
///
/// Filters come from `RUST_LOG` when set, otherwise `info`, or `debug`
/// with `--verbose`.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
