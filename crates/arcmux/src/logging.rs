use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "ARCMUX_LOG";

/// `-q`/`-v` win over `ARCMUX_LOG`; with neither, only warnings are shown.
pub fn init(verbose: u8, quiet: u8) {
    let filter = match level(verbose, quiet) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn level(verbose: u8, quiet: u8) -> Option<&'static str> {
    match (verbose, quiet) {
        (_, q) if q > 0 => Some("error"),
        (0, _) => None,
        (1, _) => Some("info"),
        (2, _) => Some("debug"),
        _ => Some("trace"),
    }
}
