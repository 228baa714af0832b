// Logging setup
//
// Log lines go to stderr so query output on stdout stays machine-readable.

use tracing::Level;

/// Pick the log level: `--quiet` wins over `--verbose`, which wins over config
pub fn resolve_level(verbose: bool, quiet: bool, configured: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }
    if verbose {
        return Level::DEBUG;
    }
    parse_level(configured).unwrap_or(Level::WARN)
}

pub fn parse_level(name: &str) -> Option<Level> {
    match name.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Install the global subscriber; later calls are ignored
pub fn init_logging(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(level >= Level::DEBUG)
        .with_writer(std::io::stderr)
        .try_init();
}
