use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{House, StudentId};

use super::store::Change;

/// Why a role toggle was refused. Refusals leave the roster untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("{house} already has a prefect of the same gender ({other})")]
    SameGenderConflict { house: House, other: StudentId },

    #[error("{house} already has two prefects")]
    QuotaExceeded { house: House },

    #[error("Only Slytherins and pure-bloods can join the inquisitorial squad")]
    NotEligible,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("No student with id {0}")]
    UnknownStudent(StudentId),
}

impl RuleViolation {
    pub fn code(&self) -> ResultCode {
        match self {
            RuleViolation::SameGenderConflict { .. } => ResultCode::SameGenderConflict,
            RuleViolation::QuotaExceeded { .. } => ResultCode::QuotaExceeded,
            RuleViolation::NotEligible => ResultCode::NotEligible,
            // Ids are only minted by the store, so a stranger's id is treated
            // like any other forbidden action.
            RuleViolation::PermissionDenied | RuleViolation::UnknownStudent(_) => {
                ResultCode::PermissionDenied
            }
        }
    }
}

/// Outcome of a role toggle as reflected in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum ResultCode {
    Applied,
    SameGenderConflict,
    QuotaExceeded,
    NotEligible,
    PermissionDenied,
}

impl From<&Result<Change, RuleViolation>> for ResultCode {
    fn from(result: &Result<Change, RuleViolation>) -> Self {
        match result {
            Ok(_) => ResultCode::Applied,
            Err(violation) => violation.code(),
        }
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultCode::Applied => write!(f, "Applied"),
            ResultCode::SameGenderConflict => write!(f, "SameGenderConflict"),
            ResultCode::QuotaExceeded => write!(f, "QuotaExceeded"),
            ResultCode::NotEligible => write!(f, "NotEligible"),
            ResultCode::PermissionDenied => write!(f, "PermissionDenied"),
        }
    }
}
