use log::LevelFilter;

/// Environment variable holding an env_logger filter, e.g. `fiken_cli=trace`.
pub const LOG_ENV: &str = "FIKEN_LOG";

/// Install the process-wide logger.
///
/// Warnings only by default; `--verbose` raises this crate to debug. A filter
/// in `FIKEN_LOG` is applied last and wins.
pub fn init_logging(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(LevelFilter::Warn);
    if verbose {
        builder.filter_module("fiken_cli", LevelFilter::Debug);
        builder.filter_module("fiken", LevelFilter::Debug);
    }
    if let Ok(filters) = std::env::var(LOG_ENV) {
        builder.parse_filters(&filters);
    }
    let _ = builder.try_init();
}

pub fn print_verbose(verbose: bool, msg: &str) {
    if verbose {
        eprintln!("Verbose: {}", msg);
    }
}
