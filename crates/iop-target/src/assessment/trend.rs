use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::composite::RiskLevel;

/// Only assessments from the last year shape the trend.
pub const TREND_LOOKBACK_DAYS: i64 = 365;

/// A stored assessment outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    pub assessed_at: DateTime<Utc>,
    pub level: RiskLevel,
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Worsening,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTrend {
    pub direction: TrendDirection,
    /// Snapshots inside the lookback window, newest first.
    pub points: Vec<RiskSnapshot>,
}

/// Compares the newest snapshot's score with the oldest one in
/// `[as_of - 365 days, as_of]`. Fewer than two snapshots or equal scores read as stable.
pub fn risk_trend(history: &[RiskSnapshot], as_of: DateTime<Utc>) -> RiskTrend {
    let cutoff = as_of - Duration::days(TREND_LOOKBACK_DAYS);
    let mut points: Vec<RiskSnapshot> = history
        .iter()
        .filter(|snapshot| snapshot.assessed_at <= as_of && snapshot.assessed_at >= cutoff)
        .copied()
        .collect();
    points.sort_by(|left, right| right.assessed_at.cmp(&left.assessed_at));

    let direction = match (points.first(), points.last()) {
        (Some(newest), Some(oldest)) if points.len() > 1 => {
            if newest.score < oldest.score {
                TrendDirection::Improving
            } else if newest.score > oldest.score {
                TrendDirection::Worsening
            } else {
                TrendDirection::Stable
            }
        }
        _ => TrendDirection::Stable,
    };

    RiskTrend { direction, points }
}
