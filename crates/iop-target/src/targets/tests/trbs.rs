use super::common::*;
use crate::eye::{Eye, EyePair};
use crate::risk::{CupDiscRatio, PerEyeFactors, RiskDomain, TRBS_MAX, TRBS_MIN};
use crate::targets::{
    compute_trbs, CalculationOutcome, CalculationRequest, CeilingSource, RiskTier, TrbsRequest,
};

#[test]
fn all_default_profile_is_low_tier_with_minimum_score() {
    let targets = compute_trbs(&minimal_request(18.0, 18.0));

    for eye in Eye::BOTH {
        let computation = targets.get(eye);
        assert_eq!(computation.trbs, TRBS_MIN);
        assert_eq!(computation.tier, RiskTier::Low);
        assert_eq!(computation.reduction_percent, 20);
        assert_eq!(computation.target, 14.4);
        for component in computation.domain_scores.components() {
            assert!(component.score <= component.max);
        }
    }
}

#[test]
fn high_baseline_with_large_cup_is_capped_at_fourteen() {
    let request = TrbsRequest {
        baselines: EyePair::new(32.0, 16.0),
        per_eye: EyePair::new(
            PerEyeFactors {
                cup_disc_ratio: CupDiscRatio::R08,
                ..PerEyeFactors::default()
            },
            PerEyeFactors::default(),
        ),
        ..TrbsRequest::default()
    };

    let targets = compute_trbs(&request);
    let od = &targets.od;

    assert_eq!(od.domain_scores.get(RiskDomain::BaselinePressure), 3);
    assert_eq!(od.domain_scores.get(RiskDomain::Structural), 3);
    assert_eq!(od.trbs, 7);
    assert_eq!(od.tier, RiskTier::Moderate);
    assert_eq!(od.raw_target, 22.4);
    assert_eq!(od.target, 14.0);
    assert!(od.cap_applied);
    let ceiling = od.ceiling.expect("ceiling recorded");
    assert_eq!(ceiling.source, CeilingSource::CupDiscRatio);

    assert!(!targets.os.cap_applied);
    assert!(targets.os.ceiling.is_none());
}

#[test]
fn very_high_tier_caps_target_even_below_threshold_baseline() {
    let request = TrbsRequest {
        baselines: EyePair::new(28.0, 28.0),
        shared: high_risk_shared(),
        per_eye: EyePair::both(advanced_eye()),
        aggressive: false,
        ..TrbsRequest::default()
    };

    let targets = compute_trbs(&request);

    for eye in Eye::BOTH {
        let computation = targets.get(eye);
        assert_eq!(computation.tier, RiskTier::VeryHigh);
        assert!(computation.trbs <= TRBS_MAX);
        assert_eq!(computation.raw_target, 14.0);
        assert!(computation.target <= 12.0);
        assert_eq!(
            computation.ceiling.map(|ceiling| ceiling.source),
            Some(CeilingSource::VeryHighTier)
        );
    }
}

#[test]
fn identical_inputs_produce_identical_outputs() {
    let request = TrbsRequest {
        baselines: EyePair::new(26.5, 24.0),
        shared: high_risk_shared(),
        per_eye: EyePair::new(advanced_eye(), PerEyeFactors::default()),
        aggressive: true,
        ..TrbsRequest::default()
    };

    assert_eq!(compute_trbs(&request), compute_trbs(&request));
}

#[test]
fn eyes_are_scored_independently_and_worse_eye_drives_combined_view() {
    let request = TrbsRequest {
        baselines: EyePair::new(22.0, 22.0),
        per_eye: EyePair::new(PerEyeFactors::default(), advanced_eye()),
        ..TrbsRequest::default()
    };

    let targets = compute_trbs(&request);

    assert!(targets.os.trbs > targets.od.trbs);
    assert_eq!(targets.worse_eye().eye, Eye::Os);
    assert!(targets.os.target < targets.od.target);
}

#[test]
fn tagged_request_dispatches_to_selected_calculator() {
    let request: CalculationRequest = serde_json::from_str(
        r#"{
            "mode": "trbs",
            "baselines": { "od": 32.0, "os": 20.0 },
            "per_eye": { "od": { "cup_disc_ratio": "0.8" }, "os": {} }
        }"#,
    )
    .expect("trbs request parses");

    let outcome = request.calculate();
    assert!(matches!(outcome, CalculationOutcome::Trbs(_)));
    assert_eq!(outcome.targets().od, 14.0);

    let proposal = outcome.proposal();
    assert_eq!(proposal.final_targets, proposal.calculated);
    assert!(!proposal.overridden().od);

    let grade: CalculationRequest = serde_json::from_str(
        r#"{ "mode": "grade_based", "baselines": { "od": 30.0, "os": 30.0 }, "stage": "moderate" }"#,
    )
    .expect("grade request parses");
    assert!(matches!(grade.calculate(), CalculationOutcome::GradeBased(_)));
}

#[test]
fn numeric_intake_values_score_like_their_brackets() {
    let numeric: TrbsRequest = serde_json::from_str(
        r#"{
            "baselines": { "od": 32.0, "os": 20.0 },
            "shared": { "medications": 0, "age": 75 },
            "per_eye": { "od": { "cup_disc_ratio": 0.8 }, "os": {} }
        }"#,
    )
    .expect("numeric request parses");
    let named: TrbsRequest = serde_json::from_str(
        r#"{
            "baselines": { "od": 32.0, "os": 20.0 },
            "shared": { "medications": "0", "age": "over_70" },
            "per_eye": { "od": { "cup_disc_ratio": "0.8" }, "os": {} }
        }"#,
    )
    .expect("named request parses");

    assert_eq!(numeric, named);
    let targets = compute_trbs(&numeric);
    assert_eq!(targets.od.target, 14.0);
    assert!(targets.od.cap_applied);
}

#[test]
fn raw_readings_replace_the_brackets_they_measure() {
    let charted: TrbsRequest = serde_json::from_str(
        r#"{
            "baselines": { "od": 32.0, "os": 20.0 },
            "per_eye": { "od": { "cup_disc_ratio": "0.5" }, "os": {} },
            "readings": {
                "age_years": 74,
                "cup_disc_ratio": { "od": 0.92, "os": null }
            }
        }"#,
    )
    .expect("request with readings parses");
    let bracketed: TrbsRequest = serde_json::from_str(
        r#"{
            "baselines": { "od": 32.0, "os": 20.0 },
            "shared": { "age": "over_70" },
            "per_eye": { "od": { "cup_disc_ratio": "0.9_or_more" }, "os": {} }
        }"#,
    )
    .expect("bracketed request parses");

    let targets = compute_trbs(&charted);
    assert_eq!(targets, compute_trbs(&bracketed));
    assert_eq!(targets.od.target, 12.0);
    assert_eq!(
        targets.od.ceiling.map(|ceiling| ceiling.source),
        Some(CeilingSource::CupDiscRatio)
    );
}
