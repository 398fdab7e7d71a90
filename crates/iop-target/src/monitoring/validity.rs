use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::measurement::{Measurement, MeasurementLog};
use crate::eye::EyePair;

/// A pressure reading older than this no longer supports an assessment.
pub const MEASUREMENT_VALIDITY_DAYS: i64 = 90;

/// Assumed untreated pressure when nothing better is on record, mmHg.
pub const DEFAULT_BASELINE_IOP: f64 = 21.0;

/// Whether the most recent visit is fresh enough to assess against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementValidity {
    pub has_measurement: bool,
    pub last_measured_at: Option<DateTime<Utc>>,
    /// Whole days between the last visit and the check.
    pub days_since: Option<i64>,
    pub is_valid: bool,
    pub needs_new_measurement: bool,
    /// Days left before the last visit expires, never negative.
    pub days_until_due: i64,
    pub last_iop: EyePair<Option<f64>>,
    pub reminder: Option<String>,
}

/// Checks the newest visit at or before `as_of` against the validity window.
/// A visit exactly [`MEASUREMENT_VALIDITY_DAYS`] old is still valid.
pub fn measurement_validity(log: &MeasurementLog, as_of: DateTime<Utc>) -> MeasurementValidity {
    let Some(latest) = log.iter().find(|measurement| measurement.taken_at <= as_of) else {
        return MeasurementValidity {
            has_measurement: false,
            last_measured_at: None,
            days_since: None,
            is_valid: false,
            needs_new_measurement: true,
            days_until_due: 0,
            last_iop: EyePair::default(),
            reminder: Some(
                "No measurements recorded. Take an initial IOP measurement.".to_string(),
            ),
        };
    };

    let days_since = (as_of - latest.taken_at).num_days();
    let is_valid = days_since <= MEASUREMENT_VALIDITY_DAYS;
    MeasurementValidity {
        has_measurement: true,
        last_measured_at: Some(latest.taken_at),
        days_since: Some(days_since),
        is_valid,
        needs_new_measurement: !is_valid,
        days_until_due: (MEASUREMENT_VALIDITY_DAYS - days_since).max(0),
        last_iop: latest.iop,
        reminder: (!is_valid).then(|| {
            format!(
                "Last measurement was {days_since} days ago. A new measurement is required for an accurate assessment."
            )
        }),
    }
}

/// Where a resolved baseline came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSource {
    PatientRecord,
    FirstMeasurement,
    Default,
}

/// Untreated pressure used as the reference for target calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineIop {
    pub baselines: EyePair<f64>,
    pub source: BaselineSource,
    /// Visit the baseline was read from, for [`BaselineSource::FirstMeasurement`].
    pub measured_at: Option<DateTime<Utc>>,
}

/// Stored baselines win only when both eyes carry a positive value. Otherwise the
/// first visit supplies them, with [`DEFAULT_BASELINE_IOP`] for an unmeasured eye.
pub fn resolve_baseline(stored: &EyePair<Option<f64>>, log: &MeasurementLog) -> BaselineIop {
    let recorded = |value: &Option<f64>| value.filter(|pressure| *pressure > 0.0);
    if let (Some(od), Some(os)) = (recorded(&stored.od), recorded(&stored.os)) {
        return BaselineIop {
            baselines: EyePair::new(od, os),
            source: BaselineSource::PatientRecord,
            measured_at: None,
        };
    }

    match log.oldest() {
        Some(first) => BaselineIop {
            baselines: first_visit_baselines(first),
            source: BaselineSource::FirstMeasurement,
            measured_at: Some(first.taken_at),
        },
        None => BaselineIop {
            baselines: EyePair::both(DEFAULT_BASELINE_IOP),
            source: BaselineSource::Default,
            measured_at: None,
        },
    }
}

fn first_visit_baselines(first: &Measurement) -> EyePair<f64> {
    first.iop.map(|_, reading| {
        reading
            .filter(|pressure| *pressure > 0.0)
            .unwrap_or(DEFAULT_BASELINE_IOP)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::parse_timestamp;
    use chrono::Duration;

    fn day(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).expect("date")
    }

    #[test]
    fn empty_log_needs_an_initial_measurement() {
        let validity = measurement_validity(&MeasurementLog::new(), day("2024-06-01"));
        assert!(!validity.has_measurement);
        assert!(validity.needs_new_measurement);
        assert_eq!(validity.days_since, None);
        assert!(validity.reminder.is_some());
    }

    #[test]
    fn recent_visit_counts_down_to_its_due_date() {
        let as_of = day("2024-06-01");
        let log = MeasurementLog::from(vec![Measurement::new(
            as_of - Duration::days(30),
            Some(17.0),
            Some(18.0),
        )]);

        let validity = measurement_validity(&log, as_of);
        assert!(validity.is_valid);
        assert_eq!(validity.days_since, Some(30));
        assert_eq!(validity.days_until_due, 60);
        assert_eq!(validity.last_iop, EyePair::new(Some(17.0), Some(18.0)));
        assert_eq!(validity.reminder, None);
    }

    #[test]
    fn validity_expires_after_ninety_days() {
        let as_of = day("2024-06-01");
        let edge = MeasurementLog::from(vec![Measurement::new(
            as_of - Duration::days(90),
            Some(17.0),
            None,
        )]);
        assert!(measurement_validity(&edge, as_of).is_valid);

        let stale = MeasurementLog::from(vec![Measurement::new(
            as_of - Duration::days(120),
            Some(17.0),
            None,
        )]);
        let validity = measurement_validity(&stale, as_of);
        assert!(!validity.is_valid);
        assert!(validity.needs_new_measurement);
        assert_eq!(validity.days_until_due, 0);
        assert!(validity
            .reminder
            .as_deref()
            .is_some_and(|message| message.contains("120 days")));
    }

    #[test]
    fn visits_after_the_check_are_ignored() {
        let as_of = day("2024-06-01");
        let log = MeasurementLog::from(vec![
            Measurement::new(as_of - Duration::days(10), Some(16.0), None),
            Measurement::new(as_of + Duration::days(5), Some(25.0), None),
        ]);
        assert_eq!(measurement_validity(&log, as_of).days_since, Some(10));
    }

    #[test]
    fn stored_baselines_need_both_eyes() {
        let log = MeasurementLog::from(vec![
            Measurement::new(day("2023-01-10"), Some(26.0), None),
            Measurement::new(day("2024-01-10"), Some(18.0), Some(17.0)),
        ]);

        let stored = resolve_baseline(&EyePair::new(Some(28.0), Some(27.0)), &log);
        assert_eq!(stored.source, BaselineSource::PatientRecord);
        assert_eq!(stored.baselines, EyePair::new(28.0, 27.0));

        let partial = resolve_baseline(&EyePair::new(Some(28.0), None), &log);
        assert_eq!(partial.source, BaselineSource::FirstMeasurement);
        assert_eq!(partial.baselines, EyePair::new(26.0, DEFAULT_BASELINE_IOP));
        assert_eq!(partial.measured_at, Some(day("2023-01-10")));
    }

    #[test]
    fn baseline_defaults_without_history() {
        let baseline = resolve_baseline(&EyePair::new(Some(0.0), Some(24.0)), &MeasurementLog::new());
        assert_eq!(baseline.source, BaselineSource::Default);
        assert_eq!(baseline.baselines, EyePair::both(DEFAULT_BASELINE_IOP));
        assert_eq!(baseline.measured_at, None);
    }
}
