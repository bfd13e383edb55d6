//! Tracing setup: JSON or pretty output filtered by `STRATA_LOG`.

pub mod events;

use strata_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "STRATA_LOG";

/// Install a JSON subscriber filtered by `STRATA_LOG`, defaulting to `info`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    init_tracing_from_config(&ObservabilityConfig::default())
}

/// Install a subscriber per `config`. `STRATA_LOG`, when set, overrides
/// `config.log_level`.
pub fn init_tracing_from_config(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_output {
        builder
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .try_init()
            .is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
