//! Properties of the scoring engine that must hold for any input.

use iop_target::assessment::{compute_composite_risk, CompositeInput};
use iop_target::monitoring::{
    assess_progression, evaluate_pressure_status, PressureStatus, ProgressionKind,
    ProgressionStatus,
};
use iop_target::risk::{
    AgeBracket, CupDiscRatio, MeanDeviation, MedicationCount, Notching, PerEyeFactors, Presence,
    SharedFactors, TRBS_MAX, TRBS_MIN,
};
use iop_target::targets::{compute_trbs, RiskTier, TrbsRequest};
use iop_target::EyePair;

fn profiles() -> Vec<(SharedFactors, PerEyeFactors)> {
    let ages = [AgeBracket::Under50, AgeBracket::From50To70, AgeBracket::Over70];
    let medications = [MedicationCount::None, MedicationCount::ThreeOrMore];
    let cups = [CupDiscRatio::UpTo05, CupDiscRatio::R07, CupDiscRatio::AtLeast09];
    let fields = [
        MeanDeviation::ZeroToMinus6,
        MeanDeviation::Minus6ToMinus12,
        MeanDeviation::NotPerformed,
    ];

    let mut profiles = Vec::new();
    for age in ages {
        for meds in medications {
            for cup in cups {
                for field in fields {
                    let shared = SharedFactors {
                        age,
                        medications: meds,
                        family_history: Presence::from(cup == CupDiscRatio::R07),
                        ..SharedFactors::default()
                    };
                    let eye = PerEyeFactors {
                        cup_disc_ratio: cup,
                        notching: if cup == CupDiscRatio::AtLeast09 {
                            Notching::Bipolar
                        } else {
                            Notching::Absent
                        },
                        mean_deviation: field,
                        central_field: Presence::from(field == MeanDeviation::NotPerformed),
                        ..PerEyeFactors::default()
                    };
                    profiles.push((shared, eye));
                }
            }
        }
    }
    profiles
}

#[test]
fn trbs_and_targets_stay_bounded_across_profiles() {
    for (shared, eye) in profiles() {
        for baseline in [-5.0, 0.0, 14.0, 21.0, 30.0, 31.0, 45.0, 90.0] {
            let request = TrbsRequest {
                baselines: EyePair::both(baseline),
                shared,
                per_eye: EyePair::both(eye),
                aggressive: baseline > 30.0,
                ..TrbsRequest::default()
            };
            let targets = compute_trbs(&request);
            let od = &targets.od;

            assert!((TRBS_MIN..=TRBS_MAX).contains(&od.trbs));
            assert!(od.target >= 0.0);
            assert!(od.target <= od.raw_target);
            if od.tier == RiskTier::VeryHigh {
                assert!(od.target <= 12.0);
            }
            if baseline > 30.0 {
                assert!(od.target <= 18.0);
            }
            let mut mirrored = targets.os.clone();
            mirrored.eye = od.eye;
            assert_eq!(&mirrored, od);
        }
    }
}

#[test]
fn pressure_severity_is_bounded_and_status_is_exclusive() {
    for target in [8.0, 12.0, 14.0, 18.0, 21.0, 35.0] {
        for step in 0..=80 {
            let measured = f64::from(step) * 0.5;
            let evaluation = evaluate_pressure_status(measured, target);
            match evaluation.status {
                PressureStatus::WithinTarget => assert_eq!(evaluation.severity, 0),
                PressureStatus::AboveTarget => {
                    assert!(measured > target);
                    assert!(evaluation.severity <= 30);
                }
                PressureStatus::BelowTarget => {
                    assert!(measured < target);
                    assert!(evaluation.severity <= 20);
                }
            }
        }
    }
}

#[test]
fn progression_needs_a_trend() {
    for kind in [ProgressionKind::Structural, ProgressionKind::Functional] {
        for value in [-20.0, 0.0, 95.0] {
            let assessment = assess_progression(value, &[value], 6, kind);
            assert_eq!(assessment.status, ProgressionStatus::Baseline);
            assert_eq!(assessment.severity, 0);
        }
    }
}

#[test]
fn composite_score_is_bounded() {
    for iop in [0u8, 15, 30] {
        for structural in [0u8, 10, 25] {
            for fluctuation in [0.0, 5.0, 5.1, 40.0] {
                let risk = compute_composite_risk(&CompositeInput {
                    iop_severity: iop,
                    structural_severity: structural,
                    functional_severity: structural,
                    fluctuation,
                    ..CompositeInput::default()
                });
                assert!(risk.score <= 100);
                assert!(!risk.reasons.is_empty());
            }
        }
    }
}
