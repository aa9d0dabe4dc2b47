use concierge_core::config::{LogFormat, LoggingConfig};
use tracing::Level;

/// Installs the global subscriber, writing to stderr so stdout carries only
/// command output. A second call keeps the subscriber already installed.
pub fn init_logging(config: &LoggingConfig) {
    let log_level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!(event_name = "logging.already_initialized", "subscriber already installed");
    }
}
