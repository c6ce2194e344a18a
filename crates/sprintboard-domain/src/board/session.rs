//! The board as one project sees it: sprint selection, the issue store,
//! drag handling and sprint lifecycle actions behind a single handle.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sprintboard_core::{BoardError, BoardResult};
use std::sync::Arc;

use super::dnd::MoveIntent;
use super::orchestrator::{StatusTransitionOrchestrator, TransitionOutcome};
use super::selector::SprintSelector;
use super::store::{IssueStore, LoadOutcome, LoadState, SharedIssueStore};
use crate::gateway::{IssueGateway, SprintGateway};
use crate::notify::Notifier;
use crate::sprint_lifecycle::{self, SprintEligibility};
use crate::{Issue, NewIssue, OrganizationId, ProjectId, Sprint, SprintStatus};

/// Organization and project the board is opened on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardContext {
    pub organization_id: OrganizationId,
    pub project_id: ProjectId,
}

impl BoardContext {
    pub fn new(organization_id: impl Into<OrganizationId>, project_id: impl Into<ProjectId>) -> Self {
        Self {
            organization_id: organization_id.into(),
            project_id: project_id.into(),
        }
    }
}

pub struct BoardSession {
    context: BoardContext,
    selector: Mutex<SprintSelector>,
    store: SharedIssueStore,
    orchestrator: StatusTransitionOrchestrator,
    issues: Arc<dyn IssueGateway>,
    sprints: Arc<dyn SprintGateway>,
    notifier: Arc<dyn Notifier>,
}

impl BoardSession {
    pub fn new(
        context: BoardContext,
        issues: Arc<dyn IssueGateway>,
        sprints: Arc<dyn SprintGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let store = SharedIssueStore::default();
        let orchestrator = StatusTransitionOrchestrator::new(
            context.project_id.clone(),
            store.clone(),
            issues.clone(),
            notifier.clone(),
        );
        Self {
            context,
            selector: Mutex::new(SprintSelector::default()),
            store,
            orchestrator,
            issues,
            sprints,
            notifier,
        }
    }

    pub fn context(&self) -> &BoardContext {
        &self.context
    }

    /// Fetch the project's sprints, pick the initial one and load its issues.
    pub async fn mount(&self) -> BoardResult<Option<Sprint>> {
        let sprints = self.sprints.list_sprints(&self.context.project_id).await?;
        let current = {
            let mut selector = self.selector.lock();
            *selector = SprintSelector::new(sprints);
            selector.current().cloned()
        };
        match &current {
            Some(sprint) => {
                tracing::info!(sprint_id = %sprint.id, "Board mounted");
                IssueStore::load(&self.store, self.issues.as_ref(), &sprint.id).await?;
            }
            None => tracing::info!(project_id = %self.context.project_id, "Project has no sprints"),
        }
        Ok(current)
    }

    pub fn sprints(&self) -> Vec<Sprint> {
        self.selector.lock().sprints().to_vec()
    }

    pub fn current_sprint(&self) -> Option<Sprint> {
        self.selector.lock().current().cloned()
    }

    pub fn issues(&self) -> Vec<Issue> {
        self.store.lock().issues().to_vec()
    }

    pub fn load_state(&self) -> LoadState {
        self.store.lock().state().clone()
    }

    pub fn is_updating(&self) -> bool {
        self.orchestrator.is_updating()
    }

    pub fn orchestrator(&self) -> &StatusTransitionOrchestrator {
        &self.orchestrator
    }

    /// Switch to `sprint_id` and reload. Returns `false` for unknown ids,
    /// which leave the board as it was.
    pub async fn select_sprint(&self, sprint_id: &str) -> BoardResult<bool> {
        let selected = self.selector.lock().select(sprint_id).map(|s| s.id.clone());
        let Some(sprint_id) = selected else {
            tracing::debug!(sprint_id, "Ignoring selection of unknown sprint");
            return Ok(false);
        };
        IssueStore::load(&self.store, self.issues.as_ref(), &sprint_id).await?;
        Ok(true)
    }

    /// Reload the selected sprint's issues. `None` when nothing is selected.
    pub async fn reload(&self) -> BoardResult<Option<LoadOutcome>> {
        let Some(sprint_id) = self.selector.lock().current_id().cloned() else {
            return Ok(None);
        };
        IssueStore::load(&self.store, self.issues.as_ref(), &sprint_id)
            .await
            .map(Some)
    }

    /// Lifecycle gating for the selected sprint; all false without one.
    pub fn eligibility(&self, now: DateTime<Utc>) -> SprintEligibility {
        self.selector
            .lock()
            .current()
            .map(|sprint| sprint_lifecycle::evaluate(sprint, now))
            .unwrap_or_default()
    }

    pub async fn change_sprint_status(
        &self,
        sprint_id: &str,
        status: SprintStatus,
    ) -> BoardResult<Sprint> {
        let requested = sprint_id.to_string();
        let result = self
            .sprints
            .change_sprint_status(&requested, &self.context.project_id, status)
            .await
            .and_then(|sprint| {
                if sprint.id != requested {
                    return Err(BoardError::Validation(format!(
                        "Status change of sprint {} answered with sprint {}",
                        requested, sprint.id
                    )));
                }
                Ok(sprint)
            });

        match result {
            Ok(sprint) => {
                self.selector.lock().replace(sprint.clone());
                tracing::info!(sprint_id = %sprint.id, status = %sprint.status, "Sprint status changed");
                self.notifier
                    .success("Sprint status updated successfully".to_string());
                Ok(sprint)
            }
            Err(err) => {
                tracing::warn!(%sprint_id, %status, "Sprint status change failed: {}", err);
                self.notifier
                    .error("Failed to update sprint status".to_string());
                Err(err)
            }
        }
    }

    /// Entry point for a finished drag. A drag released outside every
    /// column arrives as `None` and changes nothing.
    pub async fn handle_drag_end(&self, intent: Option<MoveIntent>) -> TransitionOutcome {
        match intent {
            Some(intent) => self.orchestrator.move_issue(intent).await,
            None => TransitionOutcome::Unchanged,
        }
    }

    /// Persist a new issue, then refresh the selected sprint.
    pub async fn create_issue(&self, new: NewIssue) -> BoardResult<Issue> {
        new.validate()?;
        let issue = self.issues.create_issue(new).await?;
        tracing::info!(issue_id = %issue.id, sprint_id = %issue.sprint_id, "Issue created");
        if let Err(err) = self.reload().await {
            tracing::warn!("Reload after issue creation failed: {}", err);
        }
        Ok(issue)
    }
}
