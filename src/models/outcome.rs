//! Validation outcome model

use serde::{Deserialize, Serialize};
use std::fmt;

use super::LocationSample;

/// Why a check-in was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// At least one sample lies outside the geofence radius
    OutOfGeofence,
    /// Samples are individually inside the fence but mutually too far apart
    InconsistentSpread,
    /// Mean reported accuracy is too coarse
    LowAccuracy,
}

impl RejectionReason {
    /// Stable machine-readable code
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            RejectionReason::OutOfGeofence => "out_of_geofence",
            RejectionReason::InconsistentSpread => "inconsistent_spread",
            RejectionReason::LowAccuracy => "low_accuracy",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Result of validating a completed sample set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    Accepted {
        samples: Vec<LocationSample>,
    },
    Rejected {
        reason: RejectionReason,
        detail: String,
    },
}

impl ValidationOutcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted { .. })
    }

    /// The rejection reason, if any
    #[must_use]
    pub fn reason(&self) -> Option<RejectionReason> {
        match self {
            ValidationOutcome::Accepted { .. } => None,
            ValidationOutcome::Rejected { reason, .. } => Some(*reason),
        }
    }

    pub(crate) fn rejected<S: Into<String>>(reason: RejectionReason, detail: S) -> Self {
        ValidationOutcome::Rejected {
            reason,
            detail: detail.into(),
        }
    }
}
