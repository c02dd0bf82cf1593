//! Process-wide tracing setup for the binary.
//!
//! Events go to stderr so they never mix with command output on stdout.
//! The filter comes from `TASKMASTER_LOG` when set, otherwise from the
//! configured level, otherwise [`DEFAULT_LEVEL`].

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "TASKMASTER_LOG";
pub const DEFAULT_LEVEL: &str = "warn";

static INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Installs the global subscriber. Repeated calls return the first outcome.
pub fn init_logging(configured_level: Option<&str>) -> Result<(), String> {
    INIT.get_or_init(|| {
        let filter = build_filter(std::env::var(LOG_ENV_VAR).ok().as_deref(), configured_level)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .map_err(|err| format!("failed to install log subscriber: {err}"))
    })
    .clone()
}

fn build_filter(env_value: Option<&str>, configured_level: Option<&str>) -> Result<EnvFilter, String> {
    let directive = env_value
        .filter(|value| !value.trim().is_empty())
        .or(configured_level.filter(|value| !value.trim().is_empty()))
        .unwrap_or(DEFAULT_LEVEL);

    EnvFilter::try_new(directive.trim()).map_err(|err| format!("invalid log level `{directive}`: {err}"))
}
