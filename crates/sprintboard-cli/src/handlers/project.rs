use crate::cli::ProjectAction;
use crate::context::CliContext;
use crate::output;

pub async fn handle(ctx: &CliContext, action: ProjectAction) -> anyhow::Result<()> {
    match action {
        ProjectAction::Create { key, name } => {
            let project = ctx
                .repo
                .create_project(ctx.membership(), &ctx.organization_id, &key, &name)
                .await?;
            output::output_success(&project)
        }
        ProjectAction::List => {
            let projects = ctx.repo.list_projects(Some(&ctx.organization_id)).await;
            output::output_list(projects)
        }
    }
}
