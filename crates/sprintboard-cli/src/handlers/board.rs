use chrono::Utc;
use serde::Serialize;
use sprintboard_core::BoardError;
use sprintboard_domain::{layout_issues, BoardLayout, Sprint, SprintEligibility};

use crate::cli::BoardAction;
use crate::context::CliContext;
use crate::output;

#[derive(Serialize)]
struct BoardView<'a> {
    sprint: Option<Sprint>,
    eligibility: SprintEligibility,
    #[serde(flatten)]
    layout: BoardLayout<'a>,
}

pub async fn handle(ctx: &CliContext, action: BoardAction) -> anyhow::Result<()> {
    match action {
        BoardAction::Show { project, sprint } => {
            let project = ctx.repo.find_project(&project).await?;
            let (session, _log) = ctx.session(&project.id);
            session.mount().await?;
            if let Some(sprint_id) = sprint {
                if !session.select_sprint(&sprint_id).await? {
                    return Err(BoardError::NotFound(format!(
                        "Sprint {} in project {}",
                        sprint_id, project.key
                    ))
                    .into());
                }
            }

            let columns = ctx.columns()?;
            let issues = session.issues();
            output::output_success(BoardView {
                sprint: session.current_sprint(),
                eligibility: session.eligibility(Utc::now()),
                layout: layout_issues(&columns, &issues),
            })
        }
    }
}
