use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

const ENGINE_TARGETS: [&str; 2] = ["iop_target", "iop_target_api"];

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(f, "APP_LOG_LEVEL '{value}' is not a valid tracing filter")
            }
            TelemetryError::Subscriber(err) => {
                write!(f, "failed to install tracing subscriber: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Expands a bare level into per-crate directives so dependencies stay at `warn`.
/// Anything that already looks like a filter expression passes through untouched.
pub fn filter_directives(log_level: &str) -> String {
    let level = log_level.trim();
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }

    let mut directives = vec!["warn".to_string()];
    directives.extend(
        ENGINE_TARGETS
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    directives.join(",")
}

pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    let directives = filter_directives(&config.log_level);
    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::EnvFilter {
        value: config.log_level.clone(),
        source,
    })
}

/// Install the global fmt subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(config)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_engine_crates() {
        assert_eq!(
            filter_directives("debug"),
            "warn,iop_target=debug,iop_target_api=debug"
        );
    }

    #[test]
    fn filter_expressions_pass_through() {
        assert_eq!(filter_directives("info,tower=debug"), "info,tower=debug");
    }

    #[test]
    fn invalid_level_reports_the_configured_value() {
        let config = TelemetryConfig {
            log_level: "loud!".to_string(),
        };
        let err = build_filter(&config).expect_err("invalid filter");
        assert!(err.to_string().contains("'loud!'"));
    }
}
