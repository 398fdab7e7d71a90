//! Grade-based target range: graded risk factors map to a risk grade, the grade to a
//! reduction band, and the band (scaled by disease stage) to a per-eye target range.
//!
//! This mode keeps its own bucket tables and shares nothing with the TRBS path.

use serde::{Deserialize, Serialize};

use super::trbs::round_tenth;
use crate::eye::{Eye, EyePair};
use crate::risk::{lenient, Categorical};

const MIN_TARGET_FLOOR: f64 = 8.0;
const TARGET_FLOOR: f64 = 10.0;
const MAX_TARGET_FLOOR: f64 = 12.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorLevel {
    #[serde(alias = "MODERATE")]
    Moderate,
    #[serde(alias = "HIGH")]
    High,
    #[default]
    #[serde(alias = "LOW", other)]
    Low,
}

/// Numbers are read as points: 1 is Moderate, 2 or more is High.
impl Categorical for FactorLevel {
    fn from_number(value: f64) -> Self {
        if value >= 2.0 {
            FactorLevel::High
        } else if value >= 1.0 {
            FactorLevel::Moderate
        } else {
            FactorLevel::Low
        }
    }
}

/// Thirteen graded factors. Each scores 0 for Low and up to 2 for High. The aliases
/// accept the longer keys older intake forms send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradedFactors {
    #[serde(deserialize_with = "lenient")]
    pub baseline_iop_high: FactorLevel,
    #[serde(deserialize_with = "lenient")]
    pub age_advanced: FactorLevel,
    #[serde(deserialize_with = "lenient")]
    pub family_history: FactorLevel,
    #[serde(deserialize_with = "lenient", alias = "ethnicity_african_descent")]
    pub african_descent: FactorLevel,
    #[serde(deserialize_with = "lenient", alias = "central_corneal_thickness_thin")]
    pub thin_central_cornea: FactorLevel,
    #[serde(deserialize_with = "lenient", alias = "optic_disc_size_small")]
    pub small_optic_disc: FactorLevel,
    #[serde(deserialize_with = "lenient", alias = "vertical_cup_disc_ratio_large")]
    pub large_vertical_cup_disc: FactorLevel,
    #[serde(deserialize_with = "lenient", alias = "pseudoexfoliation_syndrome")]
    pub pseudoexfoliation: FactorLevel,
    #[serde(deserialize_with = "lenient", alias = "pigment_dispersion_syndrome")]
    pub pigment_dispersion: FactorLevel,
    #[serde(deserialize_with = "lenient")]
    pub previous_ischemic_events: FactorLevel,
    #[serde(deserialize_with = "lenient", alias = "myopia_high")]
    pub high_myopia: FactorLevel,
    #[serde(deserialize_with = "lenient")]
    pub diabetes: FactorLevel,
    #[serde(deserialize_with = "lenient")]
    pub systemic_hypertension: FactorLevel,
}

/// Points awarded for (Low, Moderate, High).
type PointScale = [u8; 3];

const STANDARD: PointScale = [0, 1, 2];
const HIGH_ONLY: PointScale = [0, 0, 2];
const CAPPED_AT_ONE: PointScale = [0, 1, 1];

fn award(level: FactorLevel, scale: PointScale) -> u8 {
    match level {
        FactorLevel::Low => scale[0],
        FactorLevel::Moderate => scale[1],
        FactorLevel::High => scale[2],
    }
}

impl GradedFactors {
    pub fn points(&self) -> u8 {
        let scored = [
            (self.baseline_iop_high, STANDARD),
            (self.age_advanced, STANDARD),
            (self.family_history, STANDARD),
            (self.african_descent, STANDARD),
            (self.thin_central_cornea, STANDARD),
            (self.small_optic_disc, STANDARD),
            (self.large_vertical_cup_disc, STANDARD),
            (self.pseudoexfoliation, HIGH_ONLY),
            (self.pigment_dispersion, HIGH_ONLY),
            (self.previous_ischemic_events, STANDARD),
            (self.high_myopia, STANDARD),
            (self.diabetes, CAPPED_AT_ONE),
            (self.systemic_hypertension, CAPPED_AT_ONE),
        ];
        scored
            .into_iter()
            .map(|(level, scale)| award(level, scale))
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskGrade {
    Grade0,
    Grade1,
    Grade2,
    Grade3,
}

impl RiskGrade {
    pub fn from_points(points: u8) -> Self {
        match points {
            0..=2 => RiskGrade::Grade0,
            3..=4 => RiskGrade::Grade1,
            5..=6 => RiskGrade::Grade2,
            _ => RiskGrade::Grade3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskGrade::Grade0 => "Grade 0 (Low Risk)",
            RiskGrade::Grade1 => "Grade 1 (Low-Moderate Risk)",
            RiskGrade::Grade2 => "Grade 2 (Moderate Risk)",
            RiskGrade::Grade3 => "Grade 3 (High Risk)",
        }
    }

    /// (min, target, max) reduction fractions before the stage modifier.
    pub fn reductions(self) -> GradeReductions {
        let (min, target, max) = match self {
            RiskGrade::Grade0 => (0.15, 0.20, 0.25),
            RiskGrade::Grade1 => (0.20, 0.25, 0.30),
            RiskGrade::Grade2 => (0.25, 0.30, 0.35),
            RiskGrade::Grade3 => (0.40, 0.45, 0.50),
        };
        GradeReductions { min, target, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeReductions {
    pub min: f64,
    pub target: f64,
    pub max: f64,
}

/// Clinical stage. Unrecognized values scale like Moderate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlaucomaStage {
    #[default]
    #[serde(alias = "Early")]
    Early,
    #[serde(alias = "Advanced")]
    Advanced,
    #[serde(alias = "Moderate", other)]
    Moderate,
}

impl Categorical for GlaucomaStage {
    fn from_number(_value: f64) -> Self {
        GlaucomaStage::Moderate
    }

    fn from_flag(_value: bool) -> Self {
        GlaucomaStage::Moderate
    }
}

impl GlaucomaStage {
    pub fn modifier(self) -> f64 {
        match self {
            GlaucomaStage::Early => 0.9,
            GlaucomaStage::Moderate => 1.0,
            GlaucomaStage::Advanced => 1.2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeRequest {
    pub baselines: EyePair<f64>,
    #[serde(default)]
    pub factors: GradedFactors,
    #[serde(default, deserialize_with = "lenient")]
    pub stage: GlaucomaStage,
}

/// Conservative-to-aggressive target range for one eye.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRange {
    pub eye: Eye,
    pub baseline: f64,
    pub min_target: f64,
    pub target: f64,
    pub max_target: f64,
    pub reduction_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeOutcome {
    pub points: u8,
    pub grade: RiskGrade,
    pub stage: GlaucomaStage,
    pub od: TargetRange,
    pub os: TargetRange,
    pub recommendation: String,
}

impl GradeOutcome {
    pub fn get(&self, eye: Eye) -> &TargetRange {
        match eye {
            Eye::Od => &self.od,
            Eye::Os => &self.os,
        }
    }

    pub fn targets(&self) -> EyePair<f64> {
        EyePair::new(self.od.target, self.os.target)
    }
}

pub fn compute_grade_based(request: &GradeRequest) -> GradeOutcome {
    let points = request.factors.points();
    let grade = RiskGrade::from_points(points);
    let range = |eye: Eye| target_range(eye, *request.baselines.get(eye), grade, request.stage);

    tracing::debug!(points, grade = grade.label(), stage = ?request.stage, "graded risk");

    GradeOutcome {
        points,
        grade,
        stage: request.stage,
        od: range(Eye::Od),
        os: range(Eye::Os),
        recommendation: recommendation(grade, request.stage).to_string(),
    }
}

pub fn target_range(eye: Eye, baseline: f64, grade: RiskGrade, stage: GlaucomaStage) -> TargetRange {
    let reductions = grade.reductions();
    let modifier = stage.modifier();

    let target = (baseline - baseline * reductions.target * modifier).max(TARGET_FLOOR);
    let min_target = (baseline - baseline * reductions.max * modifier)
        .max(MIN_TARGET_FLOOR)
        .min(target);
    let max_target = (baseline - baseline * reductions.min * modifier)
        .max(MAX_TARGET_FLOOR)
        .max(target);

    TargetRange {
        eye,
        baseline,
        min_target: round_tenth(min_target),
        target: round_tenth(target),
        max_target: round_tenth(max_target),
        reduction_percent: (reductions.target * 100.0).round(),
    }
}

pub fn recommendation(grade: RiskGrade, stage: GlaucomaStage) -> &'static str {
    use GlaucomaStage::*;
    use RiskGrade::*;

    match (grade, stage) {
        (Grade0, Early) => "Monitor IOP control. Annual or semi-annual visits may be appropriate.",
        (Grade0, Moderate) => {
            "Ensure IOP control with target achieved. 6-monthly visits recommended."
        }
        (Grade0, Advanced) => "Aggressive IOP control essential. 3-4 monthly visits recommended.",
        (Grade1, Early) => "Standard IOP target. Semi-annual monitoring.",
        (Grade1, Moderate) => "Moderate IOP reduction goal. 4-6 monthly visits.",
        (Grade1, Advanced) => "Significant IOP reduction needed. 3-4 monthly visits.",
        (Grade2, Early) => "Target 30% reduction from baseline. 3-4 monthly visits.",
        (Grade2, Moderate) => "Target 30% reduction. Regular monitoring every 3 months.",
        (Grade2, Advanced) => "Target 40% reduction. Close monitoring every 2-3 months.",
        (Grade3, Early) => "Aggressive target (40-50% reduction). Monthly visits.",
        (Grade3, Moderate) => "Aggressive target. Monthly visits, consider laser/surgery.",
        (Grade3, Advanced) => "Maximum IOP reduction required. Urgent consideration of surgery.",
    }
}
