//! Contracts of the collaborators the board talks to.
//!
//! Implementations own the authoritative records; the board only holds
//! local copies. Errors follow the `BoardError` taxonomy so callers can
//! pick a recovery policy from `BoardError::kind`.

use async_trait::async_trait;
use sprintboard_core::BoardResult;

use crate::{
    Issue, IssueId, IssueStatus, NewIssue, NewSprint, ProjectId, Role, Sprint, SprintId,
    SprintStatus,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueGateway: Send + Sync {
    /// All issues of a sprint. `NotFound` if the sprint is unknown.
    async fn load_issues(&self, sprint_id: &SprintId) -> BoardResult<Vec<Issue>>;

    /// Persist a status change. `NotFound` if the issue is unknown or
    /// belongs to another project.
    async fn update_issue_status(
        &self,
        issue_id: &IssueId,
        status: IssueStatus,
        project_id: &ProjectId,
    ) -> BoardResult<Issue>;

    async fn create_issue(&self, new: NewIssue) -> BoardResult<Issue>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SprintGateway: Send + Sync {
    async fn list_sprints(&self, project_id: &ProjectId) -> BoardResult<Vec<Sprint>>;

    /// `InvalidTransition` if the lifecycle forbids the change.
    async fn change_sprint_status(
        &self,
        sprint_id: &SprintId,
        project_id: &ProjectId,
        status: SprintStatus,
    ) -> BoardResult<Sprint>;

    async fn create_sprint(&self, new: NewSprint) -> BoardResult<Sprint>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    async fn current_membership_role(&self) -> BoardResult<Role>;
}
