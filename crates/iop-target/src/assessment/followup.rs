use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::composite::{DiseaseSeverity, RiskLevel};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpPlan {
    pub days: u16,
    pub actions: Vec<String>,
}

impl FollowUpPlan {
    pub fn next_visit(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        from + Duration::days(i64::from(self.days))
    }
}

type FollowUpRow = (RiskLevel, DiseaseSeverity, u16, &'static [&'static str]);

const FOLLOW_UP_TABLE: &[FollowUpRow] = &[
    (RiskLevel::Low, DiseaseSeverity::Mild, 180, &["Routine follow-up", "Annual VF and OCT"]),
    (RiskLevel::Low, DiseaseSeverity::Moderate, 120, &["Routine follow-up", "Annual VF and OCT"]),
    (RiskLevel::Low, DiseaseSeverity::Severe, 90, &["3-monthly follow-up", "Semi-annual VF and OCT"]),
    (
        RiskLevel::Moderate,
        DiseaseSeverity::Mild,
        120,
        &["4-monthly follow-up", "Annual VF and OCT", "Review medications"],
    ),
    (
        RiskLevel::Moderate,
        DiseaseSeverity::Moderate,
        90,
        &["3-monthly follow-up", "Semi-annual VF and OCT", "Consider medication change"],
    ),
    (
        RiskLevel::Moderate,
        DiseaseSeverity::Severe,
        60,
        &["2-monthly follow-up", "Quarterly VF and OCT", "Urgently review therapy"],
    ),
    (
        RiskLevel::High,
        DiseaseSeverity::Mild,
        60,
        &["2-monthly follow-up", "Semi-annual VF and OCT", "Urgent medication review"],
    ),
    (
        RiskLevel::High,
        DiseaseSeverity::Moderate,
        30,
        &["Monthly follow-up", "Quarterly VF and OCT", "Consider laser/surgery"],
    ),
    (
        RiskLevel::High,
        DiseaseSeverity::Severe,
        14,
        &["Urgent follow-up", "Monthly visits", "Urgent surgical consultation"],
    ),
];

const FALLBACK_DAYS: u16 = 90;
const FALLBACK_ACTIONS: &[&str] = &["Schedule routine follow-up"];

pub fn recommend_followup(level: RiskLevel, severity: DiseaseSeverity) -> FollowUpPlan {
    let (days, actions) = FOLLOW_UP_TABLE
        .iter()
        .find(|(row_level, row_severity, _, _)| *row_level == level && *row_severity == severity)
        .map(|(_, _, days, actions)| (*days, *actions))
        .unwrap_or((FALLBACK_DAYS, FALLBACK_ACTIONS));

    FollowUpPlan {
        days,
        actions: actions.iter().map(|action| action.to_string()).collect(),
    }
}
