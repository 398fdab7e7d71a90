//! Risk-factor inputs and the seven-domain scorer behind the Total Risk Burden Score.

pub mod brackets;
pub mod categorical;
pub mod domains;
pub mod factors;

pub use brackets::ClinicalReadings;
pub use categorical::{lenient, Categorical};
pub use domains::{DomainScore, DomainScoreSet, RiskDomain, TRBS_MAX, TRBS_MIN};
pub use factors::{
    AgeBracket, CornealThickness, CupDiscRatio, MeanDeviation, MedicationCount, Myopia,
    Notching, OcularFlags, PatientFlags, PerEyeFactors, Presence, SharedFactors,
    SystemicFlags,
};
