//! Measured-pressure classification, progression trends, the measurement log and
//! measurement freshness.

pub mod measurement;
pub mod pressure;
pub mod progression;
pub mod validity;

pub use measurement::{
    parse_timestamp, pressure_fluctuation, Measurement, MeasurementImportError, MeasurementLog,
};
pub use pressure::{evaluate_pressure_status, tolerance_for, PressureEvaluation, PressureStatus};
pub use progression::{
    assess_progression, ProgressionAssessment, ProgressionKind, ProgressionStatus,
};
pub use validity::{
    measurement_validity, resolve_baseline, BaselineIop, BaselineSource, MeasurementValidity,
    DEFAULT_BASELINE_IOP, MEASUREMENT_VALIDITY_DAYS,
};
