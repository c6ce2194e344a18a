use serde::Serialize;
use sprintboard_core::BoardError;
use sprintboard_domain::{
    Issue, IssueGateway, IssuePriority, IssueStatus, MoveIntent, NewIssue, Notification,
    TransitionOutcome,
};

use crate::cli::{IssueAction, IssueCreateArgs};
use crate::context::CliContext;
use crate::output;

#[derive(Serialize)]
struct MoveReport {
    outcome: &'static str,
    issue: Option<Issue>,
    notifications: Vec<Notification>,
}

pub async fn handle(ctx: &CliContext, action: IssueAction) -> anyhow::Result<()> {
    match action {
        IssueAction::Create(args) => handle_create(ctx, args).await,
        IssueAction::List { sprint } => {
            let issues = ctx.repo.load_issues(&sprint).await?;
            output::output_list(issues)
        }
        IssueAction::Move { id, to } => handle_move(ctx, &id, &to).await,
    }
}

async fn handle_create(ctx: &CliContext, args: IssueCreateArgs) -> anyhow::Result<()> {
    let sprint = ctx.repo.find_sprint(&args.sprint).await?;
    let mut new = NewIssue::new(sprint.project_id.clone(), sprint.id.clone(), args.title);
    new.description = args.description;
    new.assignee = args.assignee;
    new.reporter = args.reporter;
    if let Some(priority) = args.priority {
        new.priority = priority.parse::<IssuePriority>()?;
    }

    let (session, _log) = ctx.session(&sprint.project_id);
    session.mount().await?;
    session.select_sprint(&sprint.id).await?;
    let issue = session.create_issue(new).await?;
    output::output_success(&issue)
}

/// Replays a drop of the issue onto the `to` column through a board session.
async fn handle_move(ctx: &CliContext, id: &str, to: &str) -> anyhow::Result<()> {
    let target: IssueStatus = to.parse()?;
    let issue = ctx
        .repo
        .snapshot()
        .await
        .issues
        .into_iter()
        .find(|i| i.id == id)
        .ok_or_else(|| BoardError::NotFound(format!("Issue {}", id)))?;

    let (session, log) = ctx.session(&issue.project_id);
    session.mount().await?;
    session.select_sprint(&issue.sprint_id).await?;

    let outcome = session
        .handle_drag_end(Some(MoveIntent::new(issue.id.clone(), target)))
        .await;
    let label = match outcome {
        TransitionOutcome::Moved { .. } => "moved",
        TransitionOutcome::Unchanged => "unchanged",
        TransitionOutcome::RolledBack { error, .. } => {
            return output::output_error(&format!("Failed to update issue status: {}", error));
        }
    };

    let current = session.issues().into_iter().find(|i| i.id == issue.id);
    output::output_success(MoveReport {
        outcome: label,
        issue: current,
        notifications: log.drain(),
    })
}
