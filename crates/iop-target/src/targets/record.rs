use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CalculationMode;
use crate::eye::{Eye, EyePair};

/// Finals further than this (mmHg) from the computed value count as an override.
pub const OVERRIDE_EPSILON: f64 = 0.01;

/// A target about to be set: computed values plus any clinician adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetProposal {
    pub mode: CalculationMode,
    pub calculated: EyePair<f64>,
    pub final_targets: EyePair<f64>,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub set_by: Option<String>,
}

impl TargetProposal {
    pub fn new(mode: CalculationMode, calculated: EyePair<f64>) -> Self {
        Self {
            mode,
            calculated,
            final_targets: calculated,
            justification: None,
            rationale: None,
            set_by: None,
        }
    }

    pub fn override_eye(mut self, eye: Eye, target: f64) -> Self {
        *self.final_targets.get_mut(eye) = target;
        self
    }

    pub fn justification(mut self, reason: impl Into<String>) -> Self {
        self.justification = Some(reason.into());
        self
    }

    pub fn rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn set_by(mut self, clinician: impl Into<String>) -> Self {
        self.set_by = Some(clinician.into());
        self
    }

    pub fn overridden(&self) -> EyePair<bool> {
        self.final_targets
            .map(|eye, target| (target - self.calculated.get(eye)).abs() > OVERRIDE_EPSILON)
    }

    fn validate(&self) -> Result<(), TargetRecordError> {
        for (eye, target) in self.final_targets.iter() {
            if !target.is_finite() || *target <= 0.0 {
                return Err(TargetRecordError::InvalidTarget { eye, value: *target });
            }
        }

        let has_reason = self
            .justification
            .as_deref()
            .is_some_and(|reason| !reason.trim().is_empty());
        if !has_reason {
            if let Some((eye, _)) = self.overridden().iter().find(|(_, flagged)| **flagged) {
                return Err(TargetRecordError::MissingJustification { eye });
            }
        }
        Ok(())
    }
}

/// A target as it was set. Validity bounds live in the owning [`TargetHistory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPressureRecord {
    pub version: u32,
    pub mode: CalculationMode,
    pub calculated: EyePair<f64>,
    pub final_targets: EyePair<f64>,
    pub overridden: EyePair<bool>,
    pub override_reason: Option<String>,
    pub rationale: Option<String>,
    pub set_by: Option<String>,
    pub valid_from: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryEntry {
    Set(TargetPressureRecord),
    Retired { at: DateTime<Utc> },
}

impl HistoryEntry {
    fn at(&self) -> DateTime<Utc> {
        match self {
            HistoryEntry::Set(record) => record.valid_from,
            HistoryEntry::Retired { at } => *at,
        }
    }
}

/// A record together with the window it was in force.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetWindow<'a> {
    pub record: &'a TargetPressureRecord,
    pub valid_from: DateTime<Utc>,
    /// `None` while the record is still current.
    pub valid_to: Option<DateTime<Utc>>,
}

impl TargetWindow<'_> {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.valid_from && self.valid_to.map_or(true, |end| at < end)
    }
}

/// Append-only target log for one patient. The latest entry decides what is
/// current, so setting a new target and closing the old window is one push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetHistory {
    entries: Vec<HistoryEntry>,
}

impl TargetHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn supersede(
        &mut self,
        proposal: TargetProposal,
        at: DateTime<Utc>,
    ) -> Result<&TargetPressureRecord, TargetRecordError> {
        proposal.validate()?;
        self.ensure_ordered(at)?;

        let overridden = proposal.overridden();
        let version = self.versions() + 1;
        let record = TargetPressureRecord {
            version,
            mode: proposal.mode,
            calculated: proposal.calculated,
            final_targets: proposal.final_targets,
            overridden,
            override_reason: proposal.justification,
            rationale: proposal.rationale,
            set_by: proposal.set_by,
            valid_from: at,
        };

        tracing::info!(
            version,
            od = record.final_targets.od,
            os = record.final_targets.os,
            overridden_od = overridden.od,
            overridden_os = overridden.os,
            "target superseded"
        );

        self.entries.push(HistoryEntry::Set(record));
        match self.entries.last() {
            Some(HistoryEntry::Set(record)) => Ok(record),
            _ => Err(TargetRecordError::NoCurrentTarget),
        }
    }

    /// Close the current window without a successor.
    pub fn retire(&mut self, at: DateTime<Utc>) -> Result<(), TargetRecordError> {
        if self.current().is_none() {
            return Err(TargetRecordError::NoCurrentTarget);
        }
        self.ensure_ordered(at)?;
        self.entries.push(HistoryEntry::Retired { at });
        Ok(())
    }

    pub fn current(&self) -> Option<&TargetPressureRecord> {
        match self.entries.last() {
            Some(HistoryEntry::Set(record)) => Some(record),
            _ => None,
        }
    }

    pub fn in_effect_at(&self, at: DateTime<Utc>) -> Option<&TargetPressureRecord> {
        self.windows()
            .into_iter()
            .rev()
            .find(|window| window.contains(at))
            .map(|window| window.record)
    }

    /// Every record, oldest first, with its derived validity window.
    pub fn windows(&self) -> Vec<TargetWindow<'_>> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                HistoryEntry::Set(record) => Some(TargetWindow {
                    record,
                    valid_from: record.valid_from,
                    valid_to: self.entries.get(index + 1).map(HistoryEntry::at),
                }),
                HistoryEntry::Retired { .. } => None,
            })
            .collect()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of records ever set.
    pub fn len(&self) -> usize {
        self.versions() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn versions(&self) -> u32 {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, HistoryEntry::Set(_)))
            .count() as u32
    }

    fn ensure_ordered(&self, at: DateTime<Utc>) -> Result<(), TargetRecordError> {
        match self.entries.last() {
            Some(latest) if at < latest.at() => Err(TargetRecordError::OutOfOrder {
                at,
                latest: latest.at(),
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TargetRecordError {
    #[error("target for {eye} differs from the calculated value; an override justification is required")]
    MissingJustification { eye: Eye },
    #[error("target for {eye} must be a positive pressure, got {value}")]
    InvalidTarget { eye: Eye, value: f64 },
    #[error("change at {at} precedes the latest history entry at {latest}")]
    OutOfOrder {
        at: DateTime<Utc>,
        latest: DateTime<Utc>,
    },
    #[error("no target is currently in effect")]
    NoCurrentTarget,
}
