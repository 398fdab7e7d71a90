use serde::{Deserialize, Serialize};

use crate::eye::{Eye, EyePair};
use crate::risk::{ClinicalReadings, CupDiscRatio, DomainScoreSet, PerEyeFactors, SharedFactors};

/// Baselines above this (mmHg) trigger the cup-disc ceiling.
pub const HIGH_BASELINE_THRESHOLD: f64 = 30.0;
/// Hard ceiling for Very High tier eyes, applied after the cup-disc ceiling.
pub const VERY_HIGH_CEILING: f64 = 12.0;

/// Treatment-aggressiveness tier derived from the TRBS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskTier {
    pub fn from_score(trbs: u8) -> Self {
        match trbs {
            0..=6 => RiskTier::Low,
            7..=12 => RiskTier::Moderate,
            13..=18 => RiskTier::High,
            _ => RiskTier::VeryHigh,
        }
    }

    pub fn reduction_range(self) -> ReductionRange {
        let (min_percent, max_percent) = match self {
            RiskTier::Low => (20, 25),
            RiskTier::Moderate => (30, 35),
            RiskTier::High => (40, 45),
            RiskTier::VeryHigh => (50, 50),
        };
        ReductionRange {
            min_percent,
            max_percent,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
            RiskTier::VeryHigh => "Very High",
        }
    }
}

/// Percentage reduction from baseline, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionRange {
    pub min_percent: u8,
    pub max_percent: u8,
}

impl ReductionRange {
    pub fn select(self, aggressive: bool) -> u8 {
        if aggressive {
            self.max_percent
        } else {
            self.min_percent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingSource {
    /// Baseline above 30 mmHg, limited by cup-disc ratio.
    CupDiscRatio,
    VeryHighTier,
}

/// The tightest ceiling that applied to an eye, whether or not it was binding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetCeiling {
    pub source: CeilingSource,
    pub value: f64,
}

/// One eye's computation. Never mutated after it is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetComputation {
    pub eye: Eye,
    pub baseline: f64,
    pub trbs: u8,
    pub tier: RiskTier,
    pub reduction_range: ReductionRange,
    pub reduction_percent: u8,
    pub raw_target: f64,
    pub target: f64,
    pub ceiling: Option<TargetCeiling>,
    pub cap_applied: bool,
    pub domain_scores: DomainScoreSet,
}

/// Inputs for a TRBS calculation covering both eyes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrbsRequest {
    pub baselines: EyePair<f64>,
    #[serde(default)]
    pub shared: SharedFactors,
    #[serde(default)]
    pub per_eye: EyePair<PerEyeFactors>,
    /// Use the top of the tier's reduction range instead of the bottom.
    #[serde(default)]
    pub aggressive: bool,
    /// Raw values that replace the brackets they determine.
    #[serde(default)]
    pub readings: ClinicalReadings,
}

impl TrbsRequest {
    /// Factors with every supplied reading bracketed in.
    pub fn resolved_factors(&self) -> (SharedFactors, EyePair<PerEyeFactors>) {
        let mut shared = self.shared;
        let mut per_eye = self.per_eye;
        self.readings.apply(&mut shared, &mut per_eye);
        (shared, per_eye)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BilateralTargets {
    pub od: TargetComputation,
    pub os: TargetComputation,
}

impl BilateralTargets {
    pub fn get(&self, eye: Eye) -> &TargetComputation {
        match eye {
            Eye::Od => &self.od,
            Eye::Os => &self.os,
        }
    }

    /// The eye with the higher TRBS; OD wins ties.
    pub fn worse_eye(&self) -> &TargetComputation {
        if self.os.trbs > self.od.trbs {
            &self.os
        } else {
            &self.od
        }
    }

    pub fn targets(&self) -> EyePair<f64> {
        EyePair::new(self.od.target, self.os.target)
    }
}

pub fn compute_trbs(request: &TrbsRequest) -> BilateralTargets {
    BilateralTargets {
        od: compute_eye(Eye::Od, request),
        os: compute_eye(Eye::Os, request),
    }
}

pub fn compute_eye(eye: Eye, request: &TrbsRequest) -> TargetComputation {
    let baseline = *request.baselines.get(eye);
    let (shared, per_eye) = request.resolved_factors();
    let factors = per_eye.get(eye);
    let domain_scores = DomainScoreSet::score(baseline, &shared, factors);
    let trbs = domain_scores.total();
    let tier = RiskTier::from_score(trbs);
    let reduction_range = tier.reduction_range();
    let reduction_percent = reduction_range.select(request.aggressive);

    let raw_target = round_tenth(baseline * (1.0 - f64::from(reduction_percent) / 100.0)).max(0.0);
    let ceiling = effective_ceiling(baseline, factors.cup_disc_ratio, tier);

    let (target, cap_applied) = match ceiling {
        Some(ceiling) if raw_target > ceiling.value => {
            tracing::debug!(
                eye = %eye,
                raw_target,
                ceiling = ceiling.value,
                source = ?ceiling.source,
                "target capped"
            );
            (ceiling.value, true)
        }
        _ => (raw_target, false),
    };

    tracing::debug!(eye = %eye, trbs, tier = tier.label(), reduction_percent, target, "computed target");

    TargetComputation {
        eye,
        baseline,
        trbs,
        tier,
        reduction_range,
        reduction_percent,
        raw_target,
        target,
        ceiling,
        cap_applied,
        domain_scores,
    }
}

/// Ceiling per cup-disc bracket for eyes presenting above 30 mmHg.
pub fn cup_disc_ceiling(ratio: CupDiscRatio) -> f64 {
    match ratio {
        CupDiscRatio::UpTo05 | CupDiscRatio::R06 => 18.0,
        CupDiscRatio::R07 => 16.0,
        CupDiscRatio::R08 => 14.0,
        CupDiscRatio::AtLeast09 => 12.0,
    }
}

fn effective_ceiling(baseline: f64, ratio: CupDiscRatio, tier: RiskTier) -> Option<TargetCeiling> {
    let mut ceiling = None;
    if baseline > HIGH_BASELINE_THRESHOLD {
        ceiling = Some(TargetCeiling {
            source: CeilingSource::CupDiscRatio,
            value: cup_disc_ceiling(ratio),
        });
    }
    if tier == RiskTier::VeryHigh {
        let tighter = ceiling.map_or(true, |current| VERY_HIGH_CEILING <= current.value);
        if tighter {
            ceiling = Some(TargetCeiling {
                source: CeilingSource::VeryHighTier,
                value: VERY_HIGH_CEILING,
            });
        }
    }
    ceiling
}

pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
