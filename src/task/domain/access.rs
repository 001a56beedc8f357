//! Authorization rules for task access.
//!
//! All predicates are pure functions over a [`Principal`] and a [`Task`].
//! Organization scoping is applied before these rules: a task outside the
//! caller's organization is never passed to them.

use super::{Task, TaskStatus};
use crate::identity::domain::{OrganizationId, Principal, Role, UserId};

/// Returns `true` when the principal may submit proof for the task.
///
/// Managers always may; everyone else must be the task's creator or
/// assignee.
#[must_use]
pub fn can_access_task(principal: &Principal, task: &Task) -> bool {
    if principal.is_manager() {
        return true;
    }
    task.created_by() == principal.id() || task.assigned_to() == Some(principal.id())
}

/// Per-role visibility filter used for listing, reading and editing tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// Every task in the organization.
    Organization,
    /// Tasks assigned to the user.
    AssignedTo(UserId),
    /// Tasks created by the user.
    CreatedBy(UserId),
}

impl TaskScope {
    /// Returns the scope that applies to the principal's role.
    #[must_use]
    pub const fn for_principal(principal: &Principal) -> Self {
        match principal.role() {
            Role::Manager => Self::Organization,
            Role::Employee => Self::AssignedTo(principal.id()),
            Role::Regular => Self::CreatedBy(principal.id()),
        }
    }

    /// Returns `true` when the task is visible under this scope.
    #[must_use]
    pub fn permits(self, task: &Task) -> bool {
        match self {
            Self::Organization => true,
            Self::AssignedTo(user) => task.assigned_to() == Some(user),
            Self::CreatedBy(user) => task.created_by() == user,
        }
    }
}

/// Filter for task listings, always bounded by one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskQuery {
    /// Organization the listing is confined to.
    pub organization_id: OrganizationId,
    /// Per-role visibility.
    pub scope: TaskScope,
    /// Restricts the listing to one status.
    pub status: Option<TaskStatus>,
}

impl TaskQuery {
    /// Creates a query for all tasks the principal may see in `organization_id`.
    #[must_use]
    pub const fn visible_to(principal: &Principal, organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            scope: TaskScope::for_principal(principal),
            status: None,
        }
    }

    /// Creates a query for every task in the organization with `status`.
    #[must_use]
    pub const fn with_status(organization_id: OrganizationId, status: TaskStatus) -> Self {
        Self {
            organization_id,
            scope: TaskScope::Organization,
            status: Some(status),
        }
    }

    /// Returns `true` when the task matches the query.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        task.organization_id() == self.organization_id
            && self.scope.permits(task)
            && self.status.is_none_or(|status| task.status() == status)
    }
}
