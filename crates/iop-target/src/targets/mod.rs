//! Target pressure calculation and the versioned target history.
//!
//! Two calculators exist side by side: the Total Risk Burden Score path ([`trbs`]) and
//! the grade-based range ([`grade`]). The caller picks one per request; their outputs
//! are never blended.

pub mod grade;
pub mod record;
pub mod trbs;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::eye::EyePair;

pub use grade::{
    compute_grade_based, FactorLevel, GlaucomaStage, GradeOutcome, GradeRequest, GradedFactors,
    RiskGrade, TargetRange,
};
pub use record::{
    HistoryEntry, TargetHistory, TargetPressureRecord, TargetProposal, TargetRecordError,
    TargetWindow,
};
pub use trbs::{
    compute_trbs, BilateralTargets, CeilingSource, ReductionRange, RiskTier, TargetCeiling,
    TargetComputation, TrbsRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    Trbs,
    GradeBased,
}

/// A strategy that turns a request into per-eye targets.
pub trait TargetCalculator {
    type Request;
    type Outcome;

    fn mode(&self) -> CalculationMode;

    fn calculate(&self, request: &Self::Request) -> Self::Outcome;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrbsCalculator;

impl TargetCalculator for TrbsCalculator {
    type Request = TrbsRequest;
    type Outcome = BilateralTargets;

    fn mode(&self) -> CalculationMode {
        CalculationMode::Trbs
    }

    fn calculate(&self, request: &TrbsRequest) -> BilateralTargets {
        compute_trbs(request)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GradeCalculator;

impl TargetCalculator for GradeCalculator {
    type Request = GradeRequest;
    type Outcome = GradeOutcome;

    fn mode(&self) -> CalculationMode {
        CalculationMode::GradeBased
    }

    fn calculate(&self, request: &GradeRequest) -> GradeOutcome {
        compute_grade_based(request)
    }
}

/// Wire form of a calculation, tagged by `mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CalculationRequest {
    Trbs(TrbsRequest),
    GradeBased(GradeRequest),
}

impl CalculationRequest {
    pub fn calculate(&self) -> CalculationOutcome {
        match self {
            CalculationRequest::Trbs(request) => {
                CalculationOutcome::Trbs(TrbsCalculator.calculate(request))
            }
            CalculationRequest::GradeBased(request) => {
                CalculationOutcome::GradeBased(GradeCalculator.calculate(request))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CalculationOutcome {
    Trbs(BilateralTargets),
    GradeBased(GradeOutcome),
}

impl CalculationOutcome {
    pub fn mode(&self) -> CalculationMode {
        match self {
            CalculationOutcome::Trbs(_) => CalculationMode::Trbs,
            CalculationOutcome::GradeBased(_) => CalculationMode::GradeBased,
        }
    }

    pub fn targets(&self) -> EyePair<f64> {
        match self {
            CalculationOutcome::Trbs(outcome) => outcome.targets(),
            CalculationOutcome::GradeBased(outcome) => outcome.targets(),
        }
    }

    /// Starting point for a new target record, with finals equal to the computed values.
    pub fn proposal(&self) -> TargetProposal {
        TargetProposal::new(self.mode(), self.targets())
    }
}
