use serde::{Deserialize, Serialize};

use super::factors::{CornealThickness, PerEyeFactors, SharedFactors};

pub const TRBS_MIN: u8 = 1;
pub const TRBS_MAX: u8 = 39;

/// The seven risk domains that make up the Total Risk Burden Score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskDomain {
    Demographic,
    BaselinePressure,
    Structural,
    Functional,
    PatientFactors,
    OcularModifiers,
    SystemicModifiers,
}

impl RiskDomain {
    pub const ALL: [RiskDomain; 7] = [
        RiskDomain::Demographic,
        RiskDomain::BaselinePressure,
        RiskDomain::Structural,
        RiskDomain::Functional,
        RiskDomain::PatientFactors,
        RiskDomain::OcularModifiers,
        RiskDomain::SystemicModifiers,
    ];

    pub fn min_score(self) -> u8 {
        match self {
            RiskDomain::Demographic => 1,
            _ => 0,
        }
    }

    pub fn max_score(self) -> u8 {
        match self {
            RiskDomain::Demographic => 4,
            RiskDomain::BaselinePressure => 4,
            RiskDomain::Structural => 9,
            RiskDomain::Functional => 6,
            RiskDomain::PatientFactors => 3,
            RiskDomain::OcularModifiers => 8,
            RiskDomain::SystemicModifiers => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskDomain::Demographic => "Demographic risk",
            RiskDomain::BaselinePressure => "Baseline IOP",
            RiskDomain::Structural => "Structural changes",
            RiskDomain::Functional => "Functional changes",
            RiskDomain::PatientFactors => "Disease/patient factors",
            RiskDomain::OcularModifiers => "Ocular risk modifiers",
            RiskDomain::SystemicModifiers => "Systemic risk modifiers",
        }
    }

    fn clamp(self, raw: u32) -> u8 {
        raw.clamp(self.min_score() as u32, self.max_score() as u32) as u8
    }
}

/// Per-domain scores for one eye, each already clamped to its domain's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainScoreSet {
    pub demographic: u8,
    pub baseline_pressure: u8,
    pub structural: u8,
    pub functional: u8,
    pub patient_factors: u8,
    pub ocular_modifiers: u8,
    pub systemic_modifiers: u8,
}

impl DomainScoreSet {
    /// Scores every domain for one eye. The per-eye baseline feeds the pressure domain.
    pub fn score(baseline_pressure: f64, shared: &SharedFactors, eye: &PerEyeFactors) -> Self {
        Self {
            demographic: demographic(shared),
            baseline_pressure: baseline(baseline_pressure, shared),
            structural: structural(eye),
            functional: functional(eye),
            patient_factors: patient(shared),
            ocular_modifiers: ocular(eye),
            systemic_modifiers: systemic(shared),
        }
    }

    pub fn get(&self, domain: RiskDomain) -> u8 {
        match domain {
            RiskDomain::Demographic => self.demographic,
            RiskDomain::BaselinePressure => self.baseline_pressure,
            RiskDomain::Structural => self.structural,
            RiskDomain::Functional => self.functional,
            RiskDomain::PatientFactors => self.patient_factors,
            RiskDomain::OcularModifiers => self.ocular_modifiers,
            RiskDomain::SystemicModifiers => self.systemic_modifiers,
        }
    }

    /// Total Risk Burden Score, clamped to `[TRBS_MIN, TRBS_MAX]`.
    pub fn total(&self) -> u8 {
        let sum: u32 = RiskDomain::ALL
            .iter()
            .map(|domain| self.get(*domain) as u32)
            .sum();
        sum.clamp(TRBS_MIN as u32, TRBS_MAX as u32) as u8
    }

    /// Itemised view for audit trails and API responses.
    pub fn components(&self) -> Vec<DomainScore> {
        RiskDomain::ALL
            .iter()
            .map(|domain| DomainScore {
                domain: *domain,
                score: self.get(*domain),
                max: domain.max_score(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainScore {
    pub domain: RiskDomain,
    pub score: u8,
    pub max: u8,
}

pub fn demographic(shared: &SharedFactors) -> u8 {
    let family = u32::from(shared.family_history.is_present());
    RiskDomain::Demographic.clamp(shared.age.points() as u32 + family)
}

/// Buckets the estimated untreated pressure. Readings taken on treatment understate
/// the true baseline, so each medication tier adds a fixed offset first.
pub fn baseline(measured: f64, shared: &SharedFactors) -> u8 {
    let untreated = measured + shared.medications.untreated_adjustment();
    let band = if untreated < 21.0 {
        0
    } else if untreated <= 25.0 {
        1
    } else if untreated <= 29.0 {
        2
    } else if untreated <= 34.0 {
        3
    } else {
        4
    };
    RiskDomain::BaselinePressure.clamp(band)
}

pub fn structural(eye: &PerEyeFactors) -> u8 {
    let raw = eye.cup_disc_ratio.points() as u32
        + eye.notching.points() as u32
        + u32::from(eye.nerve_fiber_defect.is_present())
        + u32::from(eye.disc_hemorrhage.is_present());
    RiskDomain::Structural.clamp(raw)
}

pub fn functional(eye: &PerEyeFactors) -> u8 {
    let central = if eye.central_field.is_present() { 2 } else { 0 };
    RiskDomain::Functional.clamp(eye.mean_deviation.points() as u32 + central)
}

pub fn patient(shared: &SharedFactors) -> u8 {
    let mut raw = 0;
    if shared.patient.one_eyed_or_advanced_fellow {
        raw += 2;
    }
    if shared.patient.poor_compliance {
        raw += 1;
    }
    RiskDomain::PatientFactors.clamp(raw)
}

pub fn ocular(eye: &PerEyeFactors) -> u8 {
    let cornea = u32::from(eye.corneal_thickness == CornealThickness::Thin);
    let raw = cornea + eye.myopia.points() as u32 + eye.ocular.count() as u32;
    RiskDomain::OcularModifiers.clamp(raw)
}

pub fn systemic(shared: &SharedFactors) -> u8 {
    RiskDomain::SystemicModifiers.clamp(shared.systemic.count() as u32)
}
