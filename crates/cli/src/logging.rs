use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `PGRID_LOG` overrides the level flags.
pub fn init_tracing(verbose: bool, log_level: Option<&str>) -> Result<(), String> {
    let level = match (verbose, log_level) {
        (_, Some(level)) => level,
        (true, None) => "debug",
        (false, None) => "warn",
    };

    let filter = EnvFilter::try_from_env("PGRID_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .try_init()
        .map_err(|e| e.to_string())
}
