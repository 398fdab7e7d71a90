use chrono::{DateTime, TimeZone, Utc};

use crate::eye::EyePair;
use crate::risk::{
    AgeBracket, CornealThickness, CupDiscRatio, MeanDeviation, MedicationCount, Myopia,
    Notching, OcularFlags, PatientFlags, PerEyeFactors, Presence, SharedFactors,
    SystemicFlags,
};
use crate::targets::{CalculationMode, TargetProposal, TrbsRequest};

pub(super) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn minimal_request(od: f64, os: f64) -> TrbsRequest {
    TrbsRequest {
        baselines: EyePair::new(od, os),
        ..TrbsRequest::default()
    }
}

pub(super) fn high_risk_shared() -> SharedFactors {
    SharedFactors {
        age: AgeBracket::Under50,
        family_history: Presence::Present,
        medications: MedicationCount::ThreeOrMore,
        systemic: SystemicFlags {
            low_ocular_perfusion: true,
            migraine_vasospasm: true,
            raynauds: true,
            sleep_apnea: true,
            diabetes_mellitus: true,
        },
        patient: PatientFlags {
            one_eyed_or_advanced_fellow: true,
            poor_compliance: true,
        },
    }
}

pub(super) fn advanced_eye() -> PerEyeFactors {
    PerEyeFactors {
        cup_disc_ratio: CupDiscRatio::AtLeast09,
        notching: Notching::Bipolar,
        nerve_fiber_defect: Presence::Present,
        disc_hemorrhage: Presence::Present,
        mean_deviation: MeanDeviation::WorseThanMinus12,
        central_field: Presence::Present,
        corneal_thickness: CornealThickness::Thin,
        myopia: Myopia::ModerateToHigh,
        ocular: OcularFlags {
            angle_recession: true,
            pseudoexfoliation: true,
            pigment_dispersion: true,
            steroid_responder: true,
        },
    }
}

pub(super) fn proposal(od: f64, os: f64) -> TargetProposal {
    TargetProposal::new(CalculationMode::Trbs, EyePair::new(od, os))
}
