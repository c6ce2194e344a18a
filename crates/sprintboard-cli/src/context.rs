use sprintboard_core::{AppConfig, BoardResult};
use sprintboard_domain::{
    columns_from_config, BoardContext, BoardSession, Column, NotificationLog, ProjectId, Role,
    StaticMembership,
};
use sprintboard_persistence::JsonBoardRepository;
use std::path::Path;
use std::sync::Arc;

/// Everything a command needs: the data file, the config and who is asking.
pub struct CliContext {
    pub repo: Arc<JsonBoardRepository>,
    pub config: AppConfig,
    pub organization_id: String,
    membership: StaticMembership,
}

impl CliContext {
    pub async fn load(
        file_path: &Path,
        config_path: Option<&Path>,
        organization_id: String,
    ) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => AppConfig::load_from(path)?,
            None => AppConfig::load(),
        };
        let role: Role = config.effective_role().parse()?;
        let repo = JsonBoardRepository::open_path(file_path).await?;
        tracing::debug!(%organization_id, %role, "CLI context loaded");

        Ok(Self {
            repo: Arc::new(repo),
            config,
            organization_id,
            membership: StaticMembership::new(role),
        })
    }

    pub fn membership(&self) -> &StaticMembership {
        &self.membership
    }

    pub fn columns(&self) -> BoardResult<Vec<Column>> {
        columns_from_config(&self.config.effective_columns())
    }

    /// A board session on `project_id` whose notifications land in the returned log.
    pub fn session(&self, project_id: &ProjectId) -> (BoardSession, Arc<NotificationLog>) {
        let log = Arc::new(NotificationLog::new());
        let session = BoardSession::new(
            BoardContext::new(self.organization_id.clone(), project_id.clone()),
            self.repo.clone(),
            self.repo.clone(),
            log.clone(),
        );
        (session, log)
    }
}
