//! Logging Setup
//!
//! Installs the global tracing subscriber. The filter comes from the
//! configured log level, which `EXCEL_INTERVIEW_LOG` overrides.

use tracing_subscriber::EnvFilter;

use crate::models::settings::AppConfig;

/// Initialize tracing from the configuration. Logs go to stderr so they
/// never interleave with interview text on stdout. A second call is a no-op.
pub fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
