//! Composite risk scoring, follow-up planning, whole-patient assessment and risk trends.

pub mod composite;
pub mod followup;
pub mod patient;
pub mod trend;

pub use composite::{
    compute_composite_risk, Adherence, CompositeInput, CompositeRisk, DiseaseSeverity, RiskLevel,
};
pub use followup::{recommend_followup, FollowUpPlan};
pub use patient::{assess_patient, Assessment, AssessmentError, PatientContext};
pub use trend::{risk_trend, RiskSnapshot, RiskTrend, TrendDirection, TREND_LOOKBACK_DAYS};
