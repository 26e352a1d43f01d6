use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn is_log_level(level: &str) -> bool {
    LOG_LEVELS.iter().any(|l| l.eq_ignore_ascii_case(level))
}

/// Directive used when `RUST_LOG` is unset. `--verbose` beats a configured level;
/// an unknown level falls back to info.
pub fn default_directive(verbose: bool, level: Option<&str>) -> String {
    match level {
        _ if verbose => "golden_mass=debug,info".to_string(),
        Some(level) if is_log_level(level) => format!("golden_mass={}", level.to_ascii_lowercase()),
        _ => "golden_mass=info".to_string(),
    }
}

pub fn init_cli_logger(verbose: bool) {
    init_cli_logger_with_level(verbose, None);
}

pub fn init_cli_logger_with_level(verbose: bool, level: Option<&str>) {
    let directive = default_directive(verbose, level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON lines on stderr, for runs whose logs are collected by another tool.
pub fn init_json_logger() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("golden_mass=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .json(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false, None), "golden_mass=info");
        assert_eq!(default_directive(false, Some("debug")), "golden_mass=debug");
        assert_eq!(default_directive(false, Some("WARN")), "golden_mass=warn");
        assert_eq!(default_directive(true, Some("warn")), "golden_mass=debug,info");
        assert_eq!(default_directive(false, Some("loud")), "golden_mass=info");
    }
}
