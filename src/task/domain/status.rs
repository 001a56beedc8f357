//! Task status and urgency vocabularies.

use super::{ParseTaskStatusError, ParseUrgencyColorError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task status.
///
/// The first four values are set freely by editors. The verification
/// sub-flow (`AwaitingVerification`, `Verified`, `Rejected`) is driven by
/// proof submission and manager review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not started.
    #[default]
    NotStarted,
    /// Work is under way.
    InProgress,
    /// Work is reported complete.
    Completed,
    /// The due date has passed.
    Overdue,
    /// Proof has been submitted and awaits a manager decision.
    AwaitingVerification,
    /// A manager approved the submitted proof.
    Verified,
    /// A manager rejected the submitted proof; resubmission is allowed.
    Rejected,
}

impl TaskStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Completed,
        Self::Overdue,
        Self::AwaitingVerification,
        Self::Verified,
        Self::Rejected,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
            Self::AwaitingVerification => "awaiting_verification",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }

    /// Returns `true` for states that belong to the verification sub-flow.
    #[must_use]
    pub const fn is_verification_state(self) -> bool {
        matches!(
            self,
            Self::AwaitingVerification | Self::Verified | Self::Rejected
        )
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseTaskStatusError(value.to_owned()))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency marker shown alongside a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyColor {
    /// Urgent.
    Red,
    /// Default urgency for newly created tasks.
    Yellow,
    /// Low urgency.
    Green,
}

impl UrgencyColor {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }
}

impl TryFrom<&str> for UrgencyColor {
    type Error = ParseUrgencyColorError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "yellow" => Ok(Self::Yellow),
            "green" => Ok(Self::Green),
            _ => Err(ParseUrgencyColorError(value.to_owned())),
        }
    }
}

impl fmt::Display for UrgencyColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
