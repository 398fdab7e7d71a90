use super::common::*;
use crate::eye::Eye;
use crate::targets::{HistoryEntry, TargetHistory, TargetRecordError};

#[test]
fn superseding_closes_previous_window() {
    let mut history = TargetHistory::new();
    history
        .supersede(proposal(18.0, 17.0).set_by("dr. okafor"), at(2024, 1, 10))
        .expect("first target");
    history
        .supersede(proposal(16.0, 15.5), at(2024, 6, 2))
        .expect("second target");

    let current = history.current().expect("current target");
    assert_eq!(current.version, 2);
    assert_eq!(current.final_targets.od, 16.0);

    let windows = history.windows();
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].valid_to, Some(at(2024, 6, 2)));
    assert_eq!(windows[1].valid_to, None);
    assert_eq!(
        windows.iter().filter(|window| window.valid_to.is_none()).count(),
        1
    );
}

#[test]
fn override_without_justification_is_rejected() {
    let mut history = TargetHistory::new();
    let error = history
        .supersede(proposal(18.0, 17.0).override_eye(Eye::Os, 15.0), at(2024, 1, 10))
        .expect_err("override needs a reason");

    assert_eq!(error, TargetRecordError::MissingJustification { eye: Eye::Os });
    assert!(history.is_empty());
}

#[test]
fn justified_override_is_flagged_per_eye() {
    let mut history = TargetHistory::new();
    let record = history
        .supersede(
            proposal(18.0, 17.0)
                .override_eye(Eye::Od, 15.0)
                .justification("progressing despite target")
                .rationale("tighten OD"),
            at(2024, 1, 10),
        )
        .expect("justified override");

    assert!(record.overridden.od);
    assert!(!record.overridden.os);
    assert_eq!(record.calculated.od, 18.0);
    assert_eq!(record.final_targets.od, 15.0);
    assert_eq!(
        record.override_reason.as_deref(),
        Some("progressing despite target")
    );
}

#[test]
fn tiny_adjustments_are_not_overrides() {
    let mut history = TargetHistory::new();
    let record = history
        .supersede(
            proposal(18.0, 17.0).override_eye(Eye::Od, 18.005),
            at(2024, 1, 10),
        )
        .expect("within tolerance");
    assert!(!record.overridden.od);
}

#[test]
fn changes_cannot_go_back_in_time() {
    let mut history = TargetHistory::new();
    history
        .supersede(proposal(18.0, 17.0), at(2024, 6, 1))
        .expect("first target");

    let error = history
        .supersede(proposal(16.0, 16.0), at(2024, 5, 1))
        .expect_err("earlier timestamp rejected");
    assert!(matches!(error, TargetRecordError::OutOfOrder { .. }));
    assert_eq!(history.len(), 1);
}

#[test]
fn retire_leaves_no_current_target() {
    let mut history = TargetHistory::new();
    assert_eq!(
        history.retire(at(2024, 1, 1)),
        Err(TargetRecordError::NoCurrentTarget)
    );

    history
        .supersede(proposal(18.0, 17.0), at(2024, 1, 10))
        .expect("target set");
    history.retire(at(2024, 3, 1)).expect("retired");

    assert!(history.current().is_none());
    assert!(matches!(
        history.entries().last(),
        Some(HistoryEntry::Retired { .. })
    ));
    assert_eq!(history.windows()[0].valid_to, Some(at(2024, 3, 1)));
}

#[test]
fn in_effect_at_resolves_historical_targets() {
    let mut history = TargetHistory::new();
    history
        .supersede(proposal(18.0, 17.0), at(2024, 1, 10))
        .expect("first");
    history
        .supersede(proposal(15.0, 15.0), at(2024, 4, 10))
        .expect("second");
    history.retire(at(2024, 9, 1)).expect("retired");

    assert!(history.in_effect_at(at(2023, 12, 31)).is_none());
    assert_eq!(
        history.in_effect_at(at(2024, 2, 1)).map(|record| record.version),
        Some(1)
    );
    assert_eq!(
        history.in_effect_at(at(2024, 4, 10)).map(|record| record.version),
        Some(2)
    );
    assert!(history.in_effect_at(at(2024, 10, 1)).is_none());
}

#[test]
fn non_positive_targets_are_rejected() {
    let mut history = TargetHistory::new();
    let error = history
        .supersede(
            proposal(18.0, 17.0)
                .override_eye(Eye::Od, -2.0)
                .justification("typo"),
            at(2024, 1, 10),
        )
        .expect_err("negative target");
    assert!(matches!(
        error,
        TargetRecordError::InvalidTarget { eye: Eye::Od, .. }
    ));
}
