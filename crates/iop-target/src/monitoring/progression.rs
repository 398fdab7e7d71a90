use serde::{Deserialize, Serialize};

/// Which measurement a trend is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionKind {
    /// RNFL thickness in microns; thinning is loss.
    Structural,
    /// Visual-field mean deviation in dB; more negative is worse.
    Functional,
}

/// Ordered from least to most concerning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressionStatus {
    Baseline,
    Stable,
    Marginal,
    Progressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressionAssessment {
    pub kind: ProgressionKind,
    pub status: ProgressionStatus,
    pub severity: u8,
    /// Annualized change, `None` when there was no trend to measure.
    pub annual_change: Option<f64>,
}

impl ProgressionAssessment {
    pub fn baseline(kind: ProgressionKind) -> Self {
        Self {
            kind,
            status: ProgressionStatus::Baseline,
            severity: 0,
            annual_change: None,
        }
    }

    /// Worst status and highest severity of the two.
    pub fn worst(self, other: Self) -> Self {
        Self {
            kind: self.kind,
            status: self.status.max(other.status),
            severity: self.severity.max(other.severity),
            // Both kinds lose ground in the negative direction.
            annual_change: match (self.annual_change, other.annual_change) {
                (Some(left), Some(right)) => Some(left.min(right)),
                (left, right) => left.or(right),
            },
        }
    }
}

const MAX_SEVERITY: f64 = 25.0;
const MARGINAL_SEVERITY: u8 = 10;

/// Compares `current` against the most recent prior value. `history` is newest
/// first; fewer than two prior points is treated as a baseline with no trend.
pub fn assess_progression(
    current: f64,
    history: &[f64],
    months_between: u32,
    kind: ProgressionKind,
) -> ProgressionAssessment {
    let previous = match history {
        [latest, _, ..] => *latest,
        _ => return ProgressionAssessment::baseline(kind),
    };

    let monthly = (current - previous) / f64::from(months_between.max(1));
    let annual_change = monthly * 12.0;

    let (status, severity) = match kind {
        ProgressionKind::Structural => {
            let loss = -annual_change;
            if loss > 2.0 {
                (ProgressionStatus::Progressive, capped(loss * 5.0))
            } else if loss > 1.0 {
                (ProgressionStatus::Marginal, MARGINAL_SEVERITY)
            } else {
                (ProgressionStatus::Stable, 0)
            }
        }
        ProgressionKind::Functional => {
            if annual_change < -1.0 {
                (ProgressionStatus::Progressive, capped(annual_change.abs() * 10.0))
            } else if annual_change < -0.5 {
                (ProgressionStatus::Marginal, MARGINAL_SEVERITY)
            } else {
                (ProgressionStatus::Stable, 0)
            }
        }
    };

    ProgressionAssessment {
        kind,
        status,
        severity,
        annual_change: Some(annual_change),
    }
}

fn capped(raw: f64) -> u8 {
    raw.clamp(0.0, MAX_SEVERITY) as u8
}
