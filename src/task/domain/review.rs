//! Manager verdicts on submitted proof.

use super::ParseReviewDecisionError;
use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a proof review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// The proof is accepted and the task becomes verified.
    Approved,
    /// The proof is refused; the submitter may try again.
    Rejected,
}

impl ReviewDecision {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for ReviewDecision {
    type Error = ParseReviewDecisionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseReviewDecisionError(value.to_owned())),
        }
    }
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded manager verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerReview {
    /// Reviewing manager.
    pub reviewed_by: UserId,
    /// Time the decision was recorded.
    pub reviewed_at: DateTime<Utc>,
    /// The verdict.
    pub decision: ReviewDecision,
    /// Reviewer feedback; empty when none was given.
    pub comment: String,
}
