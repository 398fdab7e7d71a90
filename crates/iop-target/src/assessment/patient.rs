use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::composite::{
    compute_composite_risk, Adherence, CompositeInput, CompositeRisk, DiseaseSeverity,
};
use super::followup::{recommend_followup, FollowUpPlan};
use crate::config::AssessmentConfig;
use crate::eye::{Eye, EyePair};
use crate::risk::lenient;
use crate::monitoring::{
    assess_progression, pressure_fluctuation, Measurement, MeasurementLog, PressureEvaluation,
    PressureStatus, ProgressionAssessment, ProgressionKind,
};

/// What the assessment needs to know beyond the measurements themselves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientContext {
    /// Final targets of the record currently in force.
    pub targets: EyePair<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub disease_severity: DiseaseSeverity,
    #[serde(default, deserialize_with = "lenient")]
    pub adherence: Adherence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub as_of: DateTime<Utc>,
    pub measured_at: DateTime<Utc>,
    pub pressure: EyePair<Option<PressureEvaluation>>,
    pub iop_status: PressureStatus,
    pub iop_severity: u8,
    pub structural: ProgressionAssessment,
    pub functional: ProgressionAssessment,
    pub fluctuation: f64,
    pub risk: CompositeRisk,
    pub follow_up: FollowUpPlan,
    pub next_visit: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AssessmentError {
    #[error("no measurements in the last {lookback_days} days")]
    NoMeasurements { lookback_days: u32 },
    #[error("no measurement in the window records an intraocular pressure")]
    NoPressureReadings,
}

/// Assesses a patient as of `as_of` from the measurements inside the configured
/// lookback window.
pub fn assess_patient(
    context: &PatientContext,
    log: &MeasurementLog,
    as_of: DateTime<Utc>,
    config: &AssessmentConfig,
) -> Result<Assessment, AssessmentError> {
    let window = log.within(as_of, config.lookback_days);
    if window.is_empty() {
        return Err(AssessmentError::NoMeasurements {
            lookback_days: config.lookback_days,
        });
    }

    let latest_index = window
        .iter()
        .position(|measurement| measurement.has_pressure())
        .ok_or(AssessmentError::NoPressureReadings)?;
    let latest = window[latest_index];
    let older = &window[latest_index + 1..];

    let pressure = latest.classify(&context.targets);
    let (iop_status, iop_severity) = combine_pressure(&pressure);

    let trend = |kind: ProgressionKind| {
        let per_eye = Eye::BOTH.map(|eye| eye_progression(eye, kind, latest, older, config));
        let [od, os] = per_eye;
        od.worst(os)
    };
    let structural = trend(ProgressionKind::Structural);
    let functional = trend(ProgressionKind::Functional);

    let fluctuation = pressure_fluctuation(window.iter().copied(), config.fluctuation_window);

    let risk = compute_composite_risk(&CompositeInput {
        iop_status,
        iop_severity,
        structural_status: structural.status,
        structural_severity: structural.severity,
        functional_status: functional.status,
        functional_severity: functional.severity,
        disease_severity: context.disease_severity,
        fluctuation,
        adherence: context.adherence,
    });
    let follow_up = recommend_followup(risk.level, context.disease_severity);
    let next_visit = follow_up.next_visit(as_of);

    tracing::info!(
        level = risk.level.label(),
        score = risk.score,
        iop_status = iop_status.label(),
        follow_up_days = follow_up.days,
        "patient assessed"
    );

    Ok(Assessment {
        as_of,
        measured_at: latest.taken_at,
        pressure,
        iop_status,
        iop_severity,
        structural,
        functional,
        fluctuation,
        risk,
        follow_up,
        next_visit,
    })
}

/// Above wins over below, below over within; severity is the worse eye's.
fn combine_pressure(pressure: &EyePair<Option<PressureEvaluation>>) -> (PressureStatus, u8) {
    let evaluations: Vec<PressureEvaluation> = pressure.iter().filter_map(|(_, e)| *e).collect();
    let any = |status: PressureStatus| evaluations.iter().any(|evaluation| evaluation.status == status);

    let status = if any(PressureStatus::AboveTarget) {
        PressureStatus::AboveTarget
    } else if any(PressureStatus::BelowTarget) {
        PressureStatus::BelowTarget
    } else {
        PressureStatus::WithinTarget
    };
    let severity = evaluations
        .iter()
        .map(|evaluation| evaluation.severity)
        .max()
        .unwrap_or(0);
    (status, severity)
}

fn eye_progression(
    eye: Eye,
    kind: ProgressionKind,
    latest: &Measurement,
    older: &[&Measurement],
    config: &AssessmentConfig,
) -> ProgressionAssessment {
    let reading = |measurement: &Measurement| match kind {
        ProgressionKind::Structural => *measurement.rnfl.get(eye),
        ProgressionKind::Functional => *measurement.vf_md.get(eye),
    };

    let Some(current) = reading(latest) else {
        return ProgressionAssessment::baseline(kind);
    };
    let history: Vec<f64> = older.iter().filter_map(|measurement| reading(measurement)).collect();
    assess_progression(current, &history, config.months_between_visits, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::RiskLevel;
    use crate::monitoring::{parse_timestamp, ProgressionStatus};
    use chrono::Duration;

    fn day(value: &str) -> DateTime<Utc> {
        parse_timestamp(value).expect("valid date")
    }

    fn context() -> PatientContext {
        PatientContext {
            targets: EyePair::new(16.0, 16.0),
            disease_severity: DiseaseSeverity::Moderate,
            adherence: Adherence::Good,
        }
    }

    #[test]
    fn empty_window_is_an_error() {
        let log = MeasurementLog::from(vec![Measurement::new(
            day("2023-01-01"),
            Some(20.0),
            Some(20.0),
        )]);
        let error = assess_patient(&context(), &log, day("2024-06-01"), &AssessmentConfig::default())
            .expect_err("old data only");
        assert_eq!(error, AssessmentError::NoMeasurements { lookback_days: 180 });
    }

    #[test]
    fn measurements_without_pressure_are_rejected() {
        let mut imaging_only = Measurement::new(day("2024-05-01"), None, None);
        imaging_only.rnfl = EyePair::new(Some(80.0), Some(82.0));
        let log = MeasurementLog::from(vec![imaging_only]);

        let error = assess_patient(&context(), &log, day("2024-06-01"), &AssessmentConfig::default())
            .expect_err("no pressures");
        assert_eq!(error, AssessmentError::NoPressureReadings);
    }

    #[test]
    fn one_eye_above_target_marks_the_patient_above() {
        let log = MeasurementLog::from(vec![
            Measurement::new(day("2024-05-20"), Some(15.0), Some(24.0)),
            Measurement::new(day("2024-02-20"), Some(15.0), Some(16.0)),
        ]);
        let assessment =
            assess_patient(&context(), &log, day("2024-06-01"), &AssessmentConfig::default())
                .expect("assessment");

        assert_eq!(assessment.iop_status, PressureStatus::AboveTarget);
        assert!(assessment.iop_severity > 0);
        assert_eq!(
            assessment.pressure.od.map(|evaluation| evaluation.status),
            Some(PressureStatus::WithinTarget)
        );
        assert!(assessment
            .risk
            .reasons
            .iter()
            .any(|reason| reason.starts_with("IOP")));
        assert_eq!(
            assessment.next_visit,
            day("2024-06-01") + Duration::days(i64::from(assessment.follow_up.days))
        );
    }

    #[test]
    fn skips_newer_visits_without_pressure_and_trends_older_ones() {
        let mut latest = Measurement::new(day("2024-05-01"), Some(15.0), Some(15.0));
        latest.vf_md = EyePair::new(Some(-9.0), None);
        let mut previous = Measurement::new(day("2023-12-01"), Some(15.0), Some(15.0));
        previous.vf_md = EyePair::new(Some(-6.0), None);
        let mut first = Measurement::new(day("2023-07-01"), Some(15.0), Some(15.0));
        first.vf_md = EyePair::new(Some(-5.5), None);
        let imaging_only = Measurement::new(day("2024-05-20"), None, None);

        let log = MeasurementLog::from(vec![first, previous, latest, imaging_only]);
        let config = AssessmentConfig {
            lookback_days: 365,
            ..AssessmentConfig::default()
        };
        let assessment =
            assess_patient(&context(), &log, day("2024-06-01"), &config).expect("assessment");

        assert_eq!(assessment.measured_at, day("2024-05-01"));
        assert_eq!(assessment.functional.status, ProgressionStatus::Progressive);
        assert_eq!(assessment.structural.status, ProgressionStatus::Baseline);
        assert!(assessment
            .risk
            .reasons
            .contains(&"Visual field deterioration".to_string()));
        assert_eq!(assessment.risk.level, RiskLevel::Low);
    }
}
