use serde::{Deserialize, Serialize};

const MIN_TOLERANCE: f64 = 2.0;
const TOLERANCE_FRACTION: f64 = 0.15;
const ABOVE_SEVERITY_CAP: f64 = 30.0;
const BELOW_SEVERITY_CAP: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PressureStatus {
    WithinTarget,
    AboveTarget,
    BelowTarget,
}

impl PressureStatus {
    pub fn label(self) -> &'static str {
        match self {
            PressureStatus::WithinTarget => "WITHIN_TARGET",
            PressureStatus::AboveTarget => "ABOVE_TARGET",
            PressureStatus::BelowTarget => "BELOW_TARGET",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureEvaluation {
    pub status: PressureStatus,
    pub severity: u8,
    pub tolerance: f64,
    /// Measured minus target, in mmHg.
    pub difference: f64,
}

/// Width of the WITHIN_TARGET band on either side of the target.
pub fn tolerance_for(target: f64) -> f64 {
    (TOLERANCE_FRACTION * target).max(MIN_TOLERANCE)
}

/// Classifies one measured pressure against its target. The band edge itself
/// counts as within target.
pub fn evaluate_pressure_status(measured: f64, target: f64) -> PressureEvaluation {
    let tolerance = tolerance_for(target);
    let difference = measured - target;

    let (status, severity) = if difference > tolerance {
        let excess = difference - tolerance;
        // Lower targets are penalised more steeply per mmHg over.
        let weight = 3.0 + (18.0 - target) * 0.2;
        (
            PressureStatus::AboveTarget,
            truncate_severity(excess * weight, ABOVE_SEVERITY_CAP),
        )
    } else if difference < -tolerance {
        let underage = -difference - tolerance;
        (
            PressureStatus::BelowTarget,
            truncate_severity(underage * 2.0, BELOW_SEVERITY_CAP),
        )
    } else {
        (PressureStatus::WithinTarget, 0)
    };

    PressureEvaluation {
        status,
        severity,
        tolerance,
        difference,
    }
}

fn truncate_severity(raw: f64, cap: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, cap) as u8
}
