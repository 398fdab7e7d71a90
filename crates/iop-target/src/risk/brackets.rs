//! Conversions from raw clinical measurements to the intake brackets.

use serde::{Deserialize, Serialize};

use super::factors::{
    AgeBracket, CornealThickness, CupDiscRatio, Myopia, PerEyeFactors, SharedFactors,
};
use crate::eye::{Eye, EyePair};

/// Diastolic perfusion pressure below this (mmHg) counts as low ocular perfusion.
pub const LOW_PERFUSION_THRESHOLD: f64 = 50.0;

const THIN_CORNEA_MICRONS: f64 = 500.0;

pub fn age_bracket(years: u32) -> AgeBracket {
    if years < 50 {
        AgeBracket::Under50
    } else if years <= 70 {
        AgeBracket::From50To70
    } else {
        AgeBracket::Over70
    }
}

/// Non-finite ratios read as the lowest bracket.
pub fn cup_disc_bracket(ratio: f64) -> CupDiscRatio {
    if !ratio.is_finite() || ratio <= 0.5 {
        CupDiscRatio::UpTo05
    } else if ratio <= 0.6 {
        CupDiscRatio::R06
    } else if ratio <= 0.7 {
        CupDiscRatio::R07
    } else if ratio <= 0.8 {
        CupDiscRatio::R08
    } else {
        CupDiscRatio::AtLeast09
    }
}

pub fn corneal_thickness(microns: f64) -> CornealThickness {
    if microns < THIN_CORNEA_MICRONS {
        CornealThickness::Thin
    } else {
        CornealThickness::Normal
    }
}

/// Buckets a spherical equivalent refraction in diopters.
pub fn myopia_from_sphere(diopters: f64) -> Myopia {
    if diopters > -1.0 {
        Myopia::None
    } else if diopters >= -3.0 {
        Myopia::Low
    } else {
        Myopia::ModerateToHigh
    }
}

/// Diastolic ocular perfusion pressure: diastolic blood pressure minus IOP.
pub fn diastolic_perfusion(diastolic_bp: f64, iop: f64) -> f64 {
    diastolic_bp - iop
}

pub fn is_low_perfusion(diastolic_bp: f64, iop: f64) -> bool {
    diastolic_perfusion(diastolic_bp, iop) < LOW_PERFUSION_THRESHOLD
}

/// Raw clinical values, any of which may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalReadings {
    pub age_years: Option<u32>,
    /// Diastolic blood pressure, mmHg.
    pub diastolic_bp: Option<f64>,
    pub iop: EyePair<Option<f64>>,
    pub cup_disc_ratio: EyePair<Option<f64>>,
    /// Central corneal thickness, microns.
    pub corneal_thickness: EyePair<Option<f64>>,
    /// Spherical equivalent refraction, diopters.
    pub spherical_equivalent: EyePair<Option<f64>>,
}

impl ClinicalReadings {
    /// Overwrites the brackets these readings determine and leaves every other
    /// factor as given. Low perfusion is raised when either eye qualifies and is
    /// never cleared.
    pub fn apply(&self, shared: &mut SharedFactors, per_eye: &mut EyePair<PerEyeFactors>) {
        if let Some(years) = self.age_years {
            shared.age = age_bracket(years);
        }
        if let Some(diastolic) = self.diastolic_bp {
            let low = self
                .iop
                .iter()
                .filter_map(|(_, iop)| *iop)
                .any(|iop| is_low_perfusion(diastolic, iop));
            shared.systemic.low_ocular_perfusion |= low;
        }

        for eye in Eye::BOTH {
            let factors = per_eye.get_mut(eye);
            if let Some(ratio) = *self.cup_disc_ratio.get(eye) {
                factors.cup_disc_ratio = cup_disc_bracket(ratio);
            }
            if let Some(microns) = *self.corneal_thickness.get(eye) {
                factors.corneal_thickness = corneal_thickness(microns);
            }
            if let Some(diopters) = *self.spherical_equivalent.get(eye) {
                factors.myopia = myopia_from_sphere(diopters);
            }
        }
    }
}
