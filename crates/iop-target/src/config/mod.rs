use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub assessment: AssessmentConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = AssessmentConfig::default();
        let assessment = AssessmentConfig {
            months_between_visits: numeric_var(
                "APP_MONTHS_BETWEEN_VISITS",
                defaults.months_between_visits,
            )?,
            fluctuation_window: numeric_var("APP_FLUCTUATION_WINDOW", defaults.fluctuation_window)?,
            lookback_days: numeric_var(
                "APP_MEASUREMENT_LOOKBACK_DAYS",
                defaults.lookback_days,
            )?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            assessment,
        })
    }
}

fn numeric_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for the patient assessment pipeline. The scoring rules themselves are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentConfig {
    /// Spacing assumed between consecutive visits when annualizing progression.
    pub months_between_visits: u32,
    /// Number of most recent measurements pooled for the fluctuation estimate.
    pub fluctuation_window: usize,
    /// Measurements older than this (relative to the assessment time) are ignored.
    pub lookback_days: u32,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            months_between_visits: 6,
            fluctuation_window: 6,
            lookback_days: 180,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_MONTHS_BETWEEN_VISITS");
        env::remove_var("APP_FLUCTUATION_WINDOW");
        env::remove_var("APP_MEASUREMENT_LOOKBACK_DAYS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.assessment, AssessmentConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_assessment_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        env::set_var("APP_MONTHS_BETWEEN_VISITS", "3");
        env::set_var("APP_FLUCTUATION_WINDOW", "4");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.assessment.months_between_visits, 3);
        assert_eq!(config.assessment.fluctuation_window, 4);
        assert_eq!(config.assessment.lookback_days, 180);
        reset_env();
    }

    #[test]
    fn rejects_negative_lookback() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_MEASUREMENT_LOOKBACK_DAYS", "-5");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber {
                key: "APP_MEASUREMENT_LOOKBACK_DAYS"
            })
        ));
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_assessment_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_MEASUREMENT_LOOKBACK_DAYS", "half a year");
        match AppConfig::load() {
            Err(ConfigError::InvalidNumber { key }) => {
                assert_eq!(key, "APP_MEASUREMENT_LOOKBACK_DAYS")
            }
            other => panic!("expected invalid number error, got {other:?}"),
        }
        reset_env();
    }
}
