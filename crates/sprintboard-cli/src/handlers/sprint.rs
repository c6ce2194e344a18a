use chrono::{DateTime, Utc};
use serde::Serialize;
use sprintboard_domain::sprint_lifecycle::{self, SprintEligibility};
use sprintboard_domain::{NewSprint, Notification, Sprint, SprintGateway, SprintStatus};

use super::parse_datetime;
use crate::cli::SprintAction;
use crate::context::CliContext;
use crate::output;

#[derive(Serialize)]
struct SprintStatusView<'a> {
    sprint: &'a Sprint,
    at: DateTime<Utc>,
    #[serde(flatten)]
    eligibility: SprintEligibility,
}

#[derive(Serialize)]
struct SprintChangeView {
    sprint: Sprint,
    notifications: Vec<Notification>,
}

pub async fn handle(ctx: &CliContext, action: SprintAction) -> anyhow::Result<()> {
    match action {
        SprintAction::Create {
            project,
            name,
            start,
            end,
        } => {
            let project = ctx.repo.find_project(&project).await?;
            let start = match start {
                Some(s) => parse_datetime(&s)?,
                None => Utc::now(),
            };
            let sequence = ctx.repo.next_sprint_sequence(&project.id).await;
            let mut new = NewSprint::with_defaults(
                project.id.clone(),
                &project.key,
                sequence,
                start,
                ctx.config.effective_sprint_length_days(),
            )?;
            if let Some(name) = name {
                new.name = name;
            }
            if let Some(end) = end {
                new.end_date = parse_datetime(&end)?;
            }
            let sprint = ctx.repo.create_sprint(new).await?;
            output::output_success(&sprint)
        }
        SprintAction::List { project } => {
            let project = ctx.repo.find_project(&project).await?;
            let sprints = ctx.repo.list_sprints(&project.id).await?;
            output::output_list(sprints)
        }
        SprintAction::Status { id, at } => {
            let sprint = ctx.repo.find_sprint(&id).await?;
            let at = match at {
                Some(s) => parse_datetime(&s)?,
                None => Utc::now(),
            };
            output::output_success(SprintStatusView {
                sprint: &sprint,
                at,
                eligibility: sprint_lifecycle::evaluate(&sprint, at),
            })
        }
        SprintAction::Start { id } => change_status(ctx, &id, SprintStatus::Active).await,
        SprintAction::End { id } => change_status(ctx, &id, SprintStatus::Completed).await,
    }
}

/// Start or end a sprint the way the board's buttons do: refuse what the
/// lifecycle evaluator does not offer, then let the session persist it.
async fn change_status(ctx: &CliContext, id: &str, status: SprintStatus) -> anyhow::Result<()> {
    let sprint = ctx.repo.find_sprint(id).await?;
    let eligibility = sprint_lifecycle::evaluate(&sprint, Utc::now());
    let offered = match status {
        SprintStatus::Active => eligibility.can_start,
        SprintStatus::Completed => eligibility.can_end,
        SprintStatus::Planned => false,
    };
    if !offered {
        anyhow::bail!(
            "Sprint {} ({}) cannot move to {} now",
            sprint.name,
            sprint.status,
            status
        );
    }

    let (session, log) = ctx.session(&sprint.project_id);
    session.mount().await?;
    let sprint = session.change_sprint_status(&sprint.id, status).await?;
    output::output_success(SprintChangeView {
        sprint,
        notifications: log.drain(),
    })
}
