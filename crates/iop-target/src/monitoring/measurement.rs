use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::pressure::{evaluate_pressure_status, PressureEvaluation};
use crate::eye::EyePair;

/// One visit's readings. Any reading may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub taken_at: DateTime<Utc>,
    /// Intraocular pressure, mmHg.
    pub iop: EyePair<Option<f64>>,
    /// OCT retinal nerve fiber layer thickness, microns.
    #[serde(default)]
    pub rnfl: EyePair<Option<f64>>,
    /// Visual-field mean deviation, dB.
    #[serde(default)]
    pub vf_md: EyePair<Option<f64>>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub measured_by: Option<String>,
}

impl Measurement {
    pub fn new(taken_at: DateTime<Utc>, od: Option<f64>, os: Option<f64>) -> Self {
        Self {
            taken_at,
            iop: EyePair::new(od, os),
            rnfl: EyePair::default(),
            vf_md: EyePair::default(),
            device: None,
            measured_by: None,
        }
    }

    pub fn has_pressure(&self) -> bool {
        self.iop.od.is_some() || self.iop.os.is_some()
    }

    /// Status of each recorded pressure against the targets in force when it was taken.
    pub fn classify(&self, targets: &EyePair<f64>) -> EyePair<Option<PressureEvaluation>> {
        self.iop.map(|eye, reading| {
            reading.map(|measured| evaluate_pressure_status(measured, *targets.get(eye)))
        })
    }
}

/// A patient's measurements, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Measurement>", into = "Vec<Measurement>")]
pub struct MeasurementLog {
    measurements: Vec<Measurement>,
}

impl From<Vec<Measurement>> for MeasurementLog {
    fn from(mut measurements: Vec<Measurement>) -> Self {
        measurements.sort_by(|left, right| right.taken_at.cmp(&left.taken_at));
        Self { measurements }
    }
}

impl From<MeasurementLog> for Vec<Measurement> {
    fn from(log: MeasurementLog) -> Self {
        log.measurements
    }
}

impl MeasurementLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, measurement: Measurement) {
        let position = self
            .measurements
            .iter()
            .position(|existing| existing.taken_at < measurement.taken_at)
            .unwrap_or(self.measurements.len());
        self.measurements.insert(position, measurement);
    }

    pub fn latest(&self) -> Option<&Measurement> {
        self.measurements.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.measurements.iter()
    }

    /// The first measurement on record.
    pub fn oldest(&self) -> Option<&Measurement> {
        self.measurements.last()
    }

    /// Measurements taken in `(as_of - lookback_days, as_of]`, newest first. A
    /// reading exactly `lookback_days` old has aged out.
    pub fn within(&self, as_of: DateTime<Utc>, lookback_days: u32) -> Vec<&Measurement> {
        // An unrepresentable cutoff means the window reaches back to the first record.
        let cutoff = Duration::try_days(i64::from(lookback_days))
            .and_then(|span| as_of.checked_sub_signed(span));
        self.measurements
            .iter()
            .filter(|measurement| measurement.taken_at <= as_of)
            .filter(|measurement| cutoff.map_or(true, |cutoff| measurement.taken_at > cutoff))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, MeasurementImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Reads `taken_at,iop_od,iop_os,rnfl_od,rnfl_os,vf_md_od,vf_md_os,device` rows.
    /// Empty cells are missing readings.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, MeasurementImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut measurements = Vec::new();

        for (index, record) in csv_reader.deserialize::<MeasurementRow>().enumerate() {
            let row = record?;
            // Header is line 1.
            let line = index + 2;
            let taken_at = parse_timestamp(&row.taken_at).ok_or_else(|| {
                MeasurementImportError::InvalidTimestamp {
                    line,
                    value: row.taken_at.clone(),
                }
            })?;

            measurements.push(Measurement {
                taken_at,
                iop: EyePair::new(row.iop_od, row.iop_os),
                rnfl: EyePair::new(row.rnfl_od, row.rnfl_os),
                vf_md: EyePair::new(row.vf_md_od, row.vf_md_os),
                device: row.device,
                measured_by: row.measured_by,
            });
        }

        tracing::debug!(rows = measurements.len(), "imported measurements");
        Ok(Self::from(measurements))
    }
}

/// Population standard deviation of every pressure reading, both eyes pooled, across
/// the first `window` measurements. Fewer than two measurements or readings give 0.
pub fn pressure_fluctuation<'a, I>(measurements: I, window: usize) -> f64
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let recent: Vec<&Measurement> = measurements.into_iter().take(window).collect();
    if recent.len() < 2 {
        return 0.0;
    }

    let readings: Vec<f64> = recent
        .iter()
        .flat_map(|measurement| [measurement.iop.od, measurement.iop.os])
        .flatten()
        .collect();
    if readings.len() < 2 {
        return 0.0;
    }

    let count = readings.len() as f64;
    let mean = readings.iter().sum::<f64>() / count;
    let variance = readings
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / count;
    variance.sqrt()
}

#[derive(Debug, Deserialize)]
struct MeasurementRow {
    taken_at: String,
    #[serde(default)]
    iop_od: Option<f64>,
    #[serde(default)]
    iop_os: Option<f64>,
    #[serde(default)]
    rnfl_od: Option<f64>,
    #[serde(default)]
    rnfl_os: Option<f64>,
    #[serde(default)]
    vf_md_od: Option<f64>,
    #[serde(default)]
    vf_md_os: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    device: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    measured_by: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// RFC 3339, or a bare `YYYY-MM-DD` taken as midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, thiserror::Error)]
pub enum MeasurementImportError {
    #[error("failed to read measurement export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid measurement CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: unparseable timestamp '{value}'")]
    InvalidTimestamp { line: usize, value: String },
}
