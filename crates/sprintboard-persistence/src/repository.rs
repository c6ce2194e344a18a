//! Board data kept as one snapshot in a [`PersistenceStore`] and served
//! through the domain's collaborator traits.
//!
//! Every write works on a copy of the data set and only replaces the
//! in-memory state once the snapshot is on disk, so a failed save leaves
//! both untouched.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sprintboard_core::{BoardError, BoardResult};
use sprintboard_domain::{
    ensure_can_create_project, Issue, IssueGateway, IssueId, IssueStatus, MembershipProvider,
    NewIssue, NewSprint, Project, ProjectId, Sprint, SprintGateway, SprintId, SprintStatus,
};
use std::path::Path;
use tokio::sync::Mutex;

use crate::store::{JsonFileStore, FORMAT_VERSION};
use crate::traits::{PersistenceMetadata, PersistenceStore, StoreSnapshot};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardData {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub sprints: Vec<Sprint>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl BoardData {
    pub fn project(&self, project_id: &str) -> BoardResult<&Project> {
        self.projects
            .iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| BoardError::NotFound(format!("Project {}", project_id)))
    }

    pub fn sprint(&self, sprint_id: &str) -> BoardResult<&Sprint> {
        self.sprints
            .iter()
            .find(|s| s.id == sprint_id)
            .ok_or_else(|| BoardError::NotFound(format!("Sprint {}", sprint_id)))
    }

    /// Issues of a sprint, oldest first.
    pub fn sprint_issues(&self, sprint_id: &str) -> BoardResult<Vec<Issue>> {
        self.sprint(sprint_id)?;
        let mut issues: Vec<Issue> = self
            .issues
            .iter()
            .filter(|i| i.sprint_id == sprint_id)
            .cloned()
            .collect();
        issues.sort_by_key(|i| i.created_at);
        Ok(issues)
    }

    pub fn project_sprints(&self, project_id: &str) -> BoardResult<Vec<Sprint>> {
        self.project(project_id)?;
        Ok(self
            .sprints
            .iter()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect())
    }
}

pub struct JsonBoardRepository {
    store: Box<dyn PersistenceStore>,
    data: Mutex<BoardData>,
}

impl JsonBoardRepository {
    /// Read the store's current snapshot; a missing file is an empty board.
    pub async fn open(store: impl PersistenceStore + 'static) -> BoardResult<Self> {
        let data = if store.exists().await {
            let (snapshot, _metadata) = store.load().await?;
            serde_json::from_slice(&snapshot.data)
                .map_err(|e| BoardError::Serialization(e.to_string()))?
        } else {
            tracing::info!("No data at {}, starting empty", store.path().display());
            BoardData::default()
        };
        Ok(Self {
            store: Box::new(store),
            data: Mutex::new(data),
        })
    }

    pub async fn open_path(path: impl AsRef<Path>) -> BoardResult<Self> {
        Self::open(JsonFileStore::new(path)).await
    }

    pub async fn snapshot(&self) -> BoardData {
        self.data.lock().await.clone()
    }

    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut BoardData) -> BoardResult<T>,
    ) -> BoardResult<T> {
        let mut data = self.data.lock().await;
        let mut draft = data.clone();
        let value = change(&mut draft)?;
        self.persist(&draft).await?;
        *data = draft;
        Ok(value)
    }

    async fn persist(&self, data: &BoardData) -> BoardResult<()> {
        let bytes =
            serde_json::to_vec(data).map_err(|e| BoardError::Serialization(e.to_string()))?;
        let snapshot = StoreSnapshot {
            data: bytes,
            metadata: PersistenceMetadata::new(FORMAT_VERSION, self.store.instance_id()),
        };
        self.store.save(snapshot).await?;
        Ok(())
    }

    /// Create a project after checking the caller's membership role.
    /// Keys are unique within an organization.
    pub async fn create_project(
        &self,
        membership: &dyn MembershipProvider,
        organization_id: &str,
        key: &str,
        name: &str,
    ) -> BoardResult<Project> {
        ensure_can_create_project(membership).await?;
        let project = Project::new(organization_id, key, name)?;
        self.commit(|data| {
            let taken = data
                .projects
                .iter()
                .any(|p| p.organization_id == project.organization_id && p.key == project.key);
            if taken {
                return Err(BoardError::Validation(format!(
                    "Project key '{}' is already used",
                    project.key
                )));
            }
            data.projects.push(project.clone());
            Ok(())
        })
        .await?;
        tracing::info!(project_id = %project.id, key = %project.key, "Project created");
        Ok(project)
    }

    pub async fn list_projects(&self, organization_id: Option<&str>) -> Vec<Project> {
        self.data
            .lock()
            .await
            .projects
            .iter()
            .filter(|p| organization_id.map_or(true, |org| p.organization_id == org))
            .cloned()
            .collect()
    }

    /// Look a project up by id or by key.
    pub async fn find_project(&self, id_or_key: &str) -> BoardResult<Project> {
        let key = id_or_key.to_ascii_uppercase();
        self.data
            .lock()
            .await
            .projects
            .iter()
            .find(|p| p.id == id_or_key || p.key == key)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(format!("Project {}", id_or_key)))
    }

    pub async fn find_sprint(&self, sprint_id: &str) -> BoardResult<Sprint> {
        self.data.lock().await.sprint(sprint_id).cloned()
    }

    /// Sequence number the project's next sprint is named after.
    pub async fn next_sprint_sequence(&self, project_id: &str) -> usize {
        let data = self.data.lock().await;
        data.sprints
            .iter()
            .filter(|s| s.project_id == project_id)
            .count()
            + 1
    }
}

#[async_trait]
impl IssueGateway for JsonBoardRepository {
    async fn load_issues(&self, sprint_id: &SprintId) -> BoardResult<Vec<Issue>> {
        self.data.lock().await.sprint_issues(sprint_id)
    }

    async fn update_issue_status(
        &self,
        issue_id: &IssueId,
        status: IssueStatus,
        project_id: &ProjectId,
    ) -> BoardResult<Issue> {
        let issue = self
            .commit(|data| {
                let issue = data
                    .issues
                    .iter_mut()
                    .find(|i| &i.id == issue_id && &i.project_id == project_id)
                    .ok_or_else(|| {
                        BoardError::NotFound(format!(
                            "Issue {} in project {}",
                            issue_id, project_id
                        ))
                    })?;
                issue.update_status(status);
                Ok(issue.clone())
            })
            .await?;
        tracing::info!(%issue_id, %status, "Issue status persisted");
        Ok(issue)
    }

    async fn create_issue(&self, new: NewIssue) -> BoardResult<Issue> {
        new.validate()?;
        self.commit(|data| {
            data.project(&new.project_id)?;
            let sprint = data.sprint(&new.sprint_id)?;
            if sprint.project_id != new.project_id {
                return Err(BoardError::NotFound(format!(
                    "Sprint {} in project {}",
                    new.sprint_id, new.project_id
                )));
            }
            let issue = Issue::create(new);
            data.issues.push(issue.clone());
            Ok(issue)
        })
        .await
    }
}

#[async_trait]
impl SprintGateway for JsonBoardRepository {
    async fn list_sprints(&self, project_id: &ProjectId) -> BoardResult<Vec<Sprint>> {
        self.data.lock().await.project_sprints(project_id)
    }

    async fn change_sprint_status(
        &self,
        sprint_id: &SprintId,
        project_id: &ProjectId,
        status: SprintStatus,
    ) -> BoardResult<Sprint> {
        let sprint = self
            .commit(|data| {
                if status == SprintStatus::Active {
                    let other_active = data.sprints.iter().find(|s| {
                        &s.project_id == project_id && &s.id != sprint_id && s.is_active()
                    });
                    if let Some(active) = other_active {
                        return Err(BoardError::InvalidTransition(format!(
                            "Sprint {} is already active in project {}",
                            active.name, project_id
                        )));
                    }
                }
                let sprint = data
                    .sprints
                    .iter_mut()
                    .find(|s| &s.id == sprint_id && &s.project_id == project_id)
                    .ok_or_else(|| {
                        BoardError::NotFound(format!(
                            "Sprint {} in project {}",
                            sprint_id, project_id
                        ))
                    })?;
                sprint.transition_to(status)?;
                Ok(sprint.clone())
            })
            .await?;
        tracing::info!(%sprint_id, %status, "Sprint status persisted");
        Ok(sprint)
    }

    async fn create_sprint(&self, new: NewSprint) -> BoardResult<Sprint> {
        self.commit(|data| {
            data.project(&new.project_id)?;
            let sprint = Sprint::create(new)?;
            data.sprints.push(sprint.clone());
            Ok(sprint)
        })
        .await
    }
}
