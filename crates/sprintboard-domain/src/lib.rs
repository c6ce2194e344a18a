pub mod board;
pub mod column;
pub mod gateway;
pub mod issue;
pub mod membership;
pub mod notify;
pub mod project;
pub mod sprint;
pub mod sprint_lifecycle;

pub use board::{
    BoardContext, BoardSession, DragCoordinator, IssueStore, MoveIntent, SprintSelector,
    StatusTransitionOrchestrator, TransitionOutcome, TransitionState,
};
pub use column::{columns_from_config, default_columns, layout_issues, BoardLayout, Column};
pub use gateway::{IssueGateway, MembershipProvider, SprintGateway};
pub use issue::{Issue, IssueId, IssuePriority, IssueStatus, NewIssue};
pub use membership::{can_create_project, ensure_can_create_project, Role, StaticMembership};
pub use notify::{Notification, NotificationLevel, NotificationLog, Notifier, TracingNotifier};
pub use project::{OrganizationId, Project, ProjectId};
pub use sprint::{NewSprint, Sprint, SprintId, SprintStatus};
pub use sprint_lifecycle::SprintEligibility;
