use tracing::Level;

/// Maps a configured level name to a tracing level. Anything unrecognized
/// means `info`.
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" | "warning" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    }
}

/// Installs the fmt subscriber used by the `pusu` binary.
///
/// Frame-level traffic (`-> ...` / `<- ...`) is logged at `debug`.
pub fn init(level: &str) {
    // try_init: tests and embedding applications may call this more than once
    let _ = tracing_subscriber::fmt()
        .with_max_level(parse_level(level))
        .with_target(false)
        .try_init();
}
