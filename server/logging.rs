use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{registry, Layer};

/// Installs a stderr subscriber at `level` and routes `log` records into it.
///
/// An unknown level name falls back to `info`.
pub fn install_logger(level: &str) {
    let (filter, bad_level) = match level.parse::<LevelFilter>() {
        Ok(f)  => (f, false),
        Err(_) => (LevelFilter::INFO, true),
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    if registry().with(layer).try_init().is_err() {
        eprintln!("a global logger is already installed; keeping it");
        return;
    }
    if bad_level {
        log::warn!("unknown log level {:?}, using info", level);
    }
}
