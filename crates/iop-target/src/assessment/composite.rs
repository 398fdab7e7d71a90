use serde::{Deserialize, Serialize};

use crate::monitoring::{PressureStatus, ProgressionStatus};
use crate::risk::{lenient, Categorical};

/// Baseline disease severity on record for the patient. A missing value counts as
/// Moderate. A value that is present but not recognized scores between Moderate and
/// Severe and has no follow-up row of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiseaseSeverity {
    #[serde(alias = "Mild", alias = "mild")]
    Mild,
    #[default]
    #[serde(alias = "Moderate", alias = "moderate")]
    Moderate,
    #[serde(alias = "Severe", alias = "severe")]
    Severe,
    #[serde(other)]
    Unrecognized,
}

impl DiseaseSeverity {
    pub fn points(self) -> f64 {
        match self {
            DiseaseSeverity::Mild => 0.0,
            DiseaseSeverity::Moderate => 3.0,
            DiseaseSeverity::Unrecognized => 5.0,
            DiseaseSeverity::Severe => 10.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DiseaseSeverity::Mild => "MILD",
            DiseaseSeverity::Moderate => "MODERATE",
            DiseaseSeverity::Severe => "SEVERE",
            DiseaseSeverity::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl Categorical for DiseaseSeverity {
    fn from_number(_value: f64) -> Self {
        DiseaseSeverity::Unrecognized
    }

    fn from_flag(_value: bool) -> Self {
        DiseaseSeverity::Unrecognized
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Adherence {
    #[serde(alias = "Poor", alias = "poor")]
    Poor,
    #[default]
    #[serde(alias = "Good", alias = "good", other)]
    Good,
}

impl Categorical for Adherence {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=29 => RiskLevel::Low,
            30..=69 => RiskLevel::Moderate,
            _ => RiskLevel::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
        }
    }
}

/// Signals folded into the composite score. Missing fields read as a stable,
/// well-controlled patient with moderate disease.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeInput {
    pub iop_status: PressureStatus,
    pub iop_severity: u8,
    pub structural_status: ProgressionStatus,
    pub structural_severity: u8,
    pub functional_status: ProgressionStatus,
    pub functional_severity: u8,
    #[serde(deserialize_with = "lenient")]
    pub disease_severity: DiseaseSeverity,
    /// Standard deviation of recent pooled pressures, mmHg.
    pub fluctuation: f64,
    #[serde(deserialize_with = "lenient")]
    pub adherence: Adherence,
}

impl Default for CompositeInput {
    fn default() -> Self {
        Self {
            iop_status: PressureStatus::WithinTarget,
            iop_severity: 0,
            structural_status: ProgressionStatus::Baseline,
            structural_severity: 0,
            functional_status: ProgressionStatus::Baseline,
            functional_severity: 0,
            disease_severity: DiseaseSeverity::default(),
            fluctuation: 0.0,
            adherence: Adherence::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeRisk {
    pub level: RiskLevel,
    pub score: u8,
    pub reasons: Vec<String>,
}

const IOP_WEIGHT: f64 = 1.3;
const FLUCTUATION_THRESHOLD: f64 = 5.0;
const FLUCTUATION_CAP: f64 = 5.0;
const POOR_ADHERENCE_PENALTY: f64 = 15.0;
const SIGNIFICANT_IOP_SEVERITY: u8 = 20;

pub fn compute_composite_risk(input: &CompositeInput) -> CompositeRisk {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    score += IOP_WEIGHT * f64::from(input.iop_severity);
    match input.iop_status {
        PressureStatus::AboveTarget if input.iop_severity >= SIGNIFICANT_IOP_SEVERITY => {
            reasons.push("IOP significantly above target".to_string())
        }
        PressureStatus::AboveTarget => reasons.push("IOP above target range".to_string()),
        PressureStatus::BelowTarget => reasons.push("IOP below target range".to_string()),
        PressureStatus::WithinTarget => {}
    }

    score += f64::from(input.structural_severity);
    match input.structural_status {
        ProgressionStatus::Progressive => {
            reasons.push("Significant RNFL thinning detected".to_string())
        }
        ProgressionStatus::Marginal => reasons.push("Marginal RNFL changes observed".to_string()),
        ProgressionStatus::Stable | ProgressionStatus::Baseline => {}
    }

    score += f64::from(input.functional_severity);
    match input.functional_status {
        ProgressionStatus::Progressive => reasons.push("Visual field deterioration".to_string()),
        ProgressionStatus::Marginal => reasons.push("Borderline VF changes".to_string()),
        ProgressionStatus::Stable | ProgressionStatus::Baseline => {}
    }

    score += input.disease_severity.points();
    if input.disease_severity == DiseaseSeverity::Severe {
        reasons.push("Severe glaucoma at baseline".to_string());
    }

    if input.fluctuation > FLUCTUATION_THRESHOLD {
        score += input.fluctuation.min(FLUCTUATION_CAP);
        reasons.push(format!(
            "High IOP fluctuation ({:.1} mmHg)",
            input.fluctuation
        ));
    }

    if input.adherence == Adherence::Poor {
        score = (score + POOR_ADHERENCE_PENALTY).min(100.0);
        reasons.push("Poor medication adherence reported".to_string());
    }

    let score = score.clamp(0.0, 100.0) as u8;
    if reasons.is_empty() {
        reasons.push("Stable glaucoma control".to_string());
    }

    CompositeRisk {
        level: RiskLevel::from_score(score),
        score,
        reasons,
    }
}
