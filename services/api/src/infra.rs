use chrono::{DateTime, Utc};
use iop_target::assessment::{DiseaseSeverity, RiskLevel};
use iop_target::error::AppError;
use iop_target::monitoring::parse_timestamp;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw)
        .ok_or_else(|| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD"))
}

pub(crate) fn parse_risk_level(raw: &str) -> Result<RiskLevel, String> {
    parse_wire_name(raw).map_err(|_| format!("'{raw}' is not one of low, moderate, high"))
}

/// Unknown severities are kept as unrecognized, matching the HTTP payloads.
pub(crate) fn parse_severity(raw: &str) -> Result<DiseaseSeverity, String> {
    parse_wire_name(raw).map_err(|err| err.to_string())
}

fn parse_wire_name<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    let name = raw.trim().to_ascii_uppercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(name))
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
