//! Categorical risk-factor inputs.
//!
//! Every enum's default variant is its lowest-risk bucket and doubles as the
//! `#[serde(other)]` fallthrough, so an unrecognized wire value scores the same as a
//! missing one instead of failing the request. serde only accepts the fallthrough on
//! the last variant, so the lowest-risk bucket is always listed last. Wire names
//! follow the bracket keys used by the clinic's intake forms (`"0.5_or_less"`,
//! `"50_to_70"`, ...). Fields decode through [`lenient`], so raw numbers are
//! bucketed with the [`brackets`](super::brackets) conversions.

use serde::{Deserialize, Serialize};

use super::brackets::{age_bracket, corneal_thickness, cup_disc_bracket, myopia_from_sphere};
use super::categorical::{lenient, Categorical};

/// Generic present/absent finding. Accepts `yes`/`no` for the central-field flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    #[serde(alias = "yes")]
    Present,
    #[default]
    #[serde(alias = "no", other)]
    Absent,
}

impl Presence {
    pub fn is_present(self) -> bool {
        matches!(self, Presence::Present)
    }
}

impl Categorical for Presence {
    fn from_number(value: f64) -> Self {
        Presence::from(value != 0.0)
    }

    fn from_flag(value: bool) -> Self {
        Presence::from(value)
    }
}

impl From<bool> for Presence {
    fn from(value: bool) -> Self {
        if value {
            Presence::Present
        } else {
            Presence::Absent
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "under_50")]
    Under50,
    #[serde(rename = "50_to_70")]
    From50To70,
    #[default]
    #[serde(rename = "over_70", other)]
    Over70,
}

impl AgeBracket {
    /// Never zero: age is not a risk-free factor.
    pub fn points(self) -> u8 {
        match self {
            AgeBracket::Over70 => 1,
            AgeBracket::From50To70 => 2,
            AgeBracket::Under50 => 3,
        }
    }
}

/// Number of pressure-lowering medications the baseline was measured under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedicationCount {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3_or_more")]
    ThreeOrMore,
    #[default]
    #[serde(rename = "0", other)]
    None,
}

/// A number is read as years.
impl Categorical for AgeBracket {
    fn from_number(value: f64) -> Self {
        if value < 0.0 {
            return AgeBracket::default();
        }
        age_bracket(value as u32)
    }
}

impl Categorical for MedicationCount {
    fn from_number(value: f64) -> Self {
        if value < 0.0 {
            return MedicationCount::default();
        }
        MedicationCount::from_count(value as u32)
    }
}

impl MedicationCount {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => MedicationCount::None,
            1 => MedicationCount::One,
            2 => MedicationCount::Two,
            _ => MedicationCount::ThreeOrMore,
        }
    }

    /// mmHg added to a treated reading to estimate the untreated baseline.
    pub fn untreated_adjustment(self) -> f64 {
        match self {
            MedicationCount::None => 0.0,
            MedicationCount::One => 5.0,
            MedicationCount::Two => 8.0,
            MedicationCount::ThreeOrMore => 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CupDiscRatio {
    #[serde(rename = "0.6")]
    R06,
    #[serde(rename = "0.7")]
    R07,
    #[serde(rename = "0.8")]
    R08,
    #[serde(rename = "0.9_or_more")]
    AtLeast09,
    #[default]
    #[serde(rename = "0.5_or_less", other)]
    UpTo05,
}

impl Categorical for CupDiscRatio {
    fn from_number(value: f64) -> Self {
        cup_disc_bracket(value)
    }
}

impl CupDiscRatio {
    pub fn points(self) -> u8 {
        match self {
            CupDiscRatio::UpTo05 => 0,
            CupDiscRatio::R06 => 1,
            CupDiscRatio::R07 => 2,
            CupDiscRatio::R08 => 3,
            CupDiscRatio::AtLeast09 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notching {
    Unipolar,
    Bipolar,
    #[default]
    #[serde(other)]
    Absent,
}

impl Categorical for Notching {}

impl Notching {
    pub fn points(self) -> u8 {
        match self {
            Notching::Absent => 0,
            Notching::Unipolar => 2,
            Notching::Bipolar => 3,
        }
    }
}

/// Visual-field mean-deviation bracket (dB) from standard automated perimetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeanDeviation {
    /// Legacy intake bracket still present on older profiles.
    #[serde(rename = "greater_than_minus_6")]
    GreaterThanMinus6,
    #[serde(rename = "minus_6_to_minus_12")]
    Minus6ToMinus12,
    #[serde(rename = "less_than_minus_12")]
    WorseThanMinus12,
    #[serde(rename = "hfa_unreliable")]
    Unreliable,
    #[serde(rename = "hfa_not_possible")]
    NotPossible,
    #[serde(rename = "hfa_not_done")]
    NotPerformed,
    #[default]
    #[serde(rename = "0_to_minus_6", other)]
    ZeroToMinus6,
}

impl Categorical for MeanDeviation {}

impl MeanDeviation {
    /// Missing or impossible fields score like the worst measured bracket.
    pub fn points(self) -> u8 {
        match self {
            MeanDeviation::ZeroToMinus6 => 0,
            MeanDeviation::GreaterThanMinus6 => 1,
            MeanDeviation::Minus6ToMinus12 | MeanDeviation::Unreliable => 2,
            MeanDeviation::WorseThanMinus12
            | MeanDeviation::NotPossible
            | MeanDeviation::NotPerformed => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornealThickness {
    Thin,
    #[default]
    #[serde(other)]
    Normal,
}

/// A number is read as central corneal thickness in microns.
impl Categorical for CornealThickness {
    fn from_number(value: f64) -> Self {
        if value <= 0.0 {
            return CornealThickness::default();
        }
        corneal_thickness(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Myopia {
    #[serde(rename = "low_myopia")]
    Low,
    #[serde(rename = "mod_high_myopia")]
    ModerateToHigh,
    #[default]
    #[serde(rename = "none", other)]
    None,
}

/// A number is read as spherical equivalent in diopters.
impl Categorical for Myopia {
    fn from_number(value: f64) -> Self {
        myopia_from_sphere(value)
    }
}

impl Myopia {
    pub fn points(self) -> u8 {
        match self {
            Myopia::None => 0,
            Myopia::Low => 1,
            Myopia::ModerateToHigh => 2,
        }
    }
}

/// Boolean ocular modifiers, one point each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcularFlags {
    pub angle_recession: bool,
    pub pseudoexfoliation: bool,
    pub pigment_dispersion: bool,
    pub steroid_responder: bool,
}

impl OcularFlags {
    pub fn count(&self) -> u8 {
        [
            self.angle_recession,
            self.pseudoexfoliation,
            self.pigment_dispersion,
            self.steroid_responder,
        ]
        .into_iter()
        .filter(|flag| *flag)
        .count() as u8
    }
}

/// Boolean systemic modifiers, one point each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemicFlags {
    pub low_ocular_perfusion: bool,
    pub migraine_vasospasm: bool,
    pub raynauds: bool,
    pub sleep_apnea: bool,
    pub diabetes_mellitus: bool,
}

impl SystemicFlags {
    pub fn count(&self) -> u8 {
        [
            self.low_ocular_perfusion,
            self.migraine_vasospasm,
            self.raynauds,
            self.sleep_apnea,
            self.diabetes_mellitus,
        ]
        .into_iter()
        .filter(|flag| *flag)
        .count() as u8
    }
}

/// Patient-context flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientFlags {
    /// Functionally one-eyed, or the fellow eye already has advanced disease.
    pub one_eyed_or_advanced_fellow: bool,
    pub poor_compliance: bool,
}

/// Inputs that apply to both eyes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedFactors {
    #[serde(deserialize_with = "lenient")]
    pub age: AgeBracket,
    #[serde(deserialize_with = "lenient")]
    pub family_history: Presence,
    #[serde(deserialize_with = "lenient")]
    pub medications: MedicationCount,
    pub systemic: SystemicFlags,
    pub patient: PatientFlags,
}

/// Inputs measured separately for each eye.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerEyeFactors {
    #[serde(deserialize_with = "lenient")]
    pub cup_disc_ratio: CupDiscRatio,
    #[serde(deserialize_with = "lenient")]
    pub notching: Notching,
    #[serde(deserialize_with = "lenient")]
    pub nerve_fiber_defect: Presence,
    #[serde(deserialize_with = "lenient")]
    pub disc_hemorrhage: Presence,
    #[serde(deserialize_with = "lenient")]
    pub mean_deviation: MeanDeviation,
    #[serde(deserialize_with = "lenient")]
    pub central_field: Presence,
    #[serde(deserialize_with = "lenient")]
    pub corneal_thickness: CornealThickness,
    #[serde(deserialize_with = "lenient")]
    pub myopia: Myopia,
    pub ocular: OcularFlags,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_brackets_fall_back_to_lowest_risk() {
        let factors: PerEyeFactors = serde_json::from_str(
            r#"{
                "cup_disc_ratio": "0.65",
                "notching": "temporal",
                "mean_deviation": "pending",
                "myopia": "extreme"
            }"#,
        )
        .expect("unknown values still deserialize");

        assert_eq!(factors.cup_disc_ratio, CupDiscRatio::UpTo05);
        assert_eq!(factors.notching, Notching::Absent);
        assert_eq!(factors.mean_deviation, MeanDeviation::ZeroToMinus6);
        assert_eq!(factors.myopia, Myopia::None);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let shared: SharedFactors = serde_json::from_str("{}").expect("empty object parses");
        assert_eq!(shared, SharedFactors::default());
        assert_eq!(shared.age, AgeBracket::Over70);
    }

    #[test]
    fn intake_keys_map_to_brackets() {
        let factors: PerEyeFactors = serde_json::from_str(
            r#"{
                "cup_disc_ratio": "0.9_or_more",
                "notching": "bipolar",
                "central_field": "yes",
                "mean_deviation": "hfa_not_done",
                "myopia": "mod_high_myopia",
                "ocular": { "pseudoexfoliation": true }
            }"#,
        )
        .expect("intake payload parses");

        assert_eq!(factors.cup_disc_ratio, CupDiscRatio::AtLeast09);
        assert_eq!(factors.notching, Notching::Bipolar);
        assert!(factors.central_field.is_present());
        assert_eq!(factors.mean_deviation, MeanDeviation::NotPerformed);
        assert_eq!(factors.myopia, Myopia::ModerateToHigh);
        assert_eq!(factors.ocular.count(), 1);
    }

    #[test]
    fn numeric_medication_count_is_bucketed() {
        let shared: SharedFactors =
            serde_json::from_str(r#"{ "medications": 2, "age": 64 }"#).expect("numbers parse");
        assert_eq!(shared.medications, MedicationCount::Two);
        assert_eq!(shared.age, AgeBracket::From50To70);

        let named: SharedFactors =
            serde_json::from_str(r#"{ "medications": "2" }"#).expect("names parse");
        assert_eq!(named.medications, MedicationCount::Two);

        let nonsense: SharedFactors =
            serde_json::from_str(r#"{ "medications": -4, "family_history": [1] }"#)
                .expect("nonsense still parses");
        assert_eq!(nonsense.medications, MedicationCount::None);
        assert_eq!(nonsense.family_history, Presence::Absent);
    }

    #[test]
    fn numeric_eye_measurements_are_bucketed() {
        let factors: PerEyeFactors = serde_json::from_str(
            r#"{
                "cup_disc_ratio": 0.8,
                "corneal_thickness": 488,
                "myopia": -4.5,
                "disc_hemorrhage": true,
                "central_field": 0,
                "mean_deviation": -8.2,
                "notching": null
            }"#,
        )
        .expect("numeric intake parses");

        assert_eq!(factors.cup_disc_ratio, CupDiscRatio::R08);
        assert_eq!(factors.corneal_thickness, CornealThickness::Thin);
        assert_eq!(factors.myopia, Myopia::ModerateToHigh);
        assert!(factors.disc_hemorrhage.is_present());
        assert!(!factors.central_field.is_present());
        assert_eq!(factors.mean_deviation, MeanDeviation::ZeroToMinus6);
        assert_eq!(factors.notching, Notching::Absent);
    }

    #[test]
    fn medication_count_saturates_at_three() {
        assert_eq!(MedicationCount::from_count(0), MedicationCount::None);
        assert_eq!(MedicationCount::from_count(7), MedicationCount::ThreeOrMore);
        assert_eq!(MedicationCount::from_count(7).untreated_adjustment(), 10.0);
    }
}
