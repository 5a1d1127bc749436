//! Recoverable failure kinds raised by the journey engine.
//!
//! None of these are fatal. Controller operations log them and leave the
//! session untouched, so a caller can ignore the `Err` and keep presenting.

use thiserror::Error;

use crate::dataset::EntityKind;
use crate::history::HistoryKind;
use crate::journey::Step;

/// Soft failures surfaced by controller operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JourneyError {
    #[error("unknown {kind} '{id}'")]
    UnknownEntity { kind: EntityKind, id: String },
    #[error("{action} is not allowed at {}", step_label(.from))]
    InvalidTransition {
        action: &'static str,
        from: Option<Step>,
    },
    #[error("{stack} history is empty")]
    EmptyHistory { stack: HistoryKind },
}

impl JourneyError {
    pub fn unknown(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::UnknownEntity {
            kind,
            id: id.into(),
        }
    }

    #[must_use]
    pub const fn invalid(action: &'static str, from: Option<Step>) -> Self {
        Self::InvalidTransition { action, from }
    }
}

fn step_label(step: &Option<Step>) -> &'static str {
    step.map_or("idle session", Step::label)
}

/// Errors raised when the dataset is internally inconsistent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: EntityKind, id: String },
    #[error("{owner} references unknown evidence group '{group}'")]
    DanglingEvidence { owner: String, group: String },
    #[error("evidence group '{group}' has no items")]
    EmptyEvidenceGroup { group: String },
}

/// Errors raised when journey configuration invariants are violated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must not exceed {max} ms (got {value})")]
    DelayTooLong {
        field: &'static str,
        max: u64,
        value: u64,
    },
    #[error("{field} must be between {min} and {max} (got {value})")]
    ZoomOutOfRange {
        field: &'static str,
        min: u8,
        max: u8,
        value: u8,
    },
    #[error("at least one explore item is required")]
    NoExploreItems,
    #[error("explore item '{id}' is listed more than once")]
    DuplicateExploreItem { id: String },
    #[error("explore item '{id}' is not a known resource")]
    UnknownExploreItem { id: String },
    #[error("history capacity must be at least 1")]
    ZeroHistoryCapacity,
    #[error("dataset is inconsistent: {0}")]
    Dataset(#[from] DatasetError),
}

/// Failure to produce a usable dataset from a loader.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("dataset is inconsistent: {0}")]
    Invalid(#[from] DatasetError),
}
