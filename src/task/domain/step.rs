//! Ordered task decomposition steps and progress calculation.

use super::{StepNumber, TaskDomainError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single, independently completable sub-item of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    number: StepNumber,
    description: String,
    is_completed: bool,
}

impl Step {
    /// Creates an incomplete step.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyStepDescription`] when the description
    /// is blank.
    pub fn new(number: StepNumber, description: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = description.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyStepDescription);
        }
        Ok(Self {
            number,
            description: trimmed.to_owned(),
            is_completed: false,
        })
    }

    /// Returns the step number.
    #[must_use]
    pub const fn number(&self) -> StepNumber {
        self.number
    }

    /// Returns the step description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns whether the step is done.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub(super) const fn set_completed(&mut self, is_completed: bool) {
        self.is_completed = is_completed;
    }
}

/// Numbers the given descriptions `1..=n`.
///
/// # Errors
///
/// Returns [`TaskDomainError`] when a description is blank.
pub fn number_steps<I, S>(descriptions: I) -> Result<Vec<Step>, TaskDomainError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    descriptions
        .into_iter()
        .zip(1_u32..)
        .map(|(description, number)| Step::new(StepNumber::new(number)?, description))
        .collect()
}

/// Rejects step lists that reuse a step number.
pub(super) fn ensure_unique_numbers(steps: &[Step]) -> Result<(), TaskDomainError> {
    let mut seen = HashSet::with_capacity(steps.len());
    for step in steps {
        if !seen.insert(step.number()) {
            return Err(TaskDomainError::DuplicateStepNumber(step.number()));
        }
    }
    Ok(())
}

/// Completion percentage, rounded half up; `0` when there are no steps.
#[must_use]
pub fn progress_percent(steps: &[Step]) -> u8 {
    let total = steps.len() as u64;
    let completed = steps.iter().filter(|step| step.is_completed()).count() as u64;
    // round(100 * c / t) == floor((200 * c + t) / (2 * t))
    let rounded = (200 * completed + total)
        .checked_div(2 * total)
        .unwrap_or_default();
    u8::try_from(rounded).unwrap_or(100)
}
