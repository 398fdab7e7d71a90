use crate::assessment::AssessmentError;
use crate::config::ConfigError;
use crate::monitoring::MeasurementImportError;
use crate::targets::TargetRecordError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Input(serde_json::Error),
    Import(MeasurementImportError),
    TargetRecord(TargetRecordError),
    Assessment(AssessmentError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Input(err) => write!(f, "invalid input: {}", err),
            AppError::Import(err) => write!(f, "measurement import error: {}", err),
            AppError::TargetRecord(err) => write!(f, "target record rejected: {}", err),
            AppError::Assessment(err) => write!(f, "assessment unavailable: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Input(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::TargetRecord(err) => Some(err),
            AppError::Assessment(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Input(_) | AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::TargetRecord(_) | AppError::Assessment(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Input(value)
    }
}

impl From<MeasurementImportError> for AppError {
    fn from(value: MeasurementImportError) -> Self {
        Self::Import(value)
    }
}

impl From<TargetRecordError> for AppError {
    fn from(value: TargetRecordError) -> Self {
        Self::TargetRecord(value)
    }
}

impl From<AssessmentError> for AppError {
    fn from(value: AssessmentError) -> Self {
        Self::Assessment(value)
    }
}
