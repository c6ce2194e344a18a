//! Local cache of the issues of the sprint in view.
//!
//! Every load hands out a ticket; only the newest ticket may install its
//! result, so a slow response never overwrites a fresher one.

use parking_lot::Mutex;
use sprintboard_core::BoardResult;
use std::sync::Arc;

use crate::gateway::IssueGateway;
use crate::{Issue, IssueId, IssueStatus, SprintId};

/// The board's single store, shared by the session and the orchestrator.
pub type SharedIssueStore = Arc<Mutex<IssueStore>>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    sprint_id: SprintId,
}

impl LoadTicket {
    pub fn sprint_id(&self) -> &SprintId {
        &self.sprint_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { count: usize },
    /// A newer load or a sprint switch superseded this one.
    Stale,
}

#[derive(Debug, Default)]
pub struct IssueStore {
    sprint_id: Option<SprintId>,
    issues: Vec<Issue>,
    state: LoadState,
    generation: u64,
}

impl IssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sprint_id(&self) -> Option<&SprintId> {
        self.sprint_id.as_ref()
    }

    pub fn is_viewing(&self, sprint_id: &SprintId) -> bool {
        self.sprint_id.as_ref() == Some(sprint_id)
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn get(&self, issue_id: &str) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == issue_id)
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Start loading `sprint_id`. Switching sprints drops the old issues
    /// right away; reloading the same sprint keeps them until the result lands.
    pub fn begin_load(&mut self, sprint_id: &SprintId) -> LoadTicket {
        if !self.is_viewing(sprint_id) {
            self.sprint_id = Some(sprint_id.clone());
            self.issues.clear();
        }
        self.generation += 1;
        self.state = LoadState::Loading;
        LoadTicket {
            generation: self.generation,
            sprint_id: sprint_id.clone(),
        }
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: BoardResult<Vec<Issue>>,
    ) -> BoardResult<LoadOutcome> {
        if ticket.generation != self.generation {
            tracing::debug!(
                sprint_id = %ticket.sprint_id,
                "Discarding superseded issue load"
            );
            return Ok(LoadOutcome::Stale);
        }

        match result {
            Ok(issues) => {
                let (issues, foreign): (Vec<_>, Vec<_>) = issues
                    .into_iter()
                    .partition(|issue| issue.sprint_id == ticket.sprint_id);
                if !foreign.is_empty() {
                    tracing::warn!(
                        sprint_id = %ticket.sprint_id,
                        dropped = foreign.len(),
                        "Load returned issues of another sprint"
                    );
                }
                let count = issues.len();
                self.issues = issues;
                self.state = LoadState::Ready;
                tracing::debug!(sprint_id = %ticket.sprint_id, count, "Loaded issues");
                Ok(LoadOutcome::Applied { count })
            }
            Err(err) => {
                self.state = LoadState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Fetch `sprint_id` from the gateway into the shared store.
    pub async fn load(
        store: &Mutex<Self>,
        gateway: &dyn IssueGateway,
        sprint_id: &SprintId,
    ) -> BoardResult<LoadOutcome> {
        let ticket = store.lock().begin_load(sprint_id);
        let result = gateway.load_issues(sprint_id).await;
        store.lock().finish_load(ticket, result)
    }

    /// Rewrite an issue's status locally and return the previous one.
    ///
    /// Returns `None` without touching anything when the issue is unknown
    /// or already has `new_status`.
    pub fn apply_optimistic(
        &mut self,
        issue_id: &IssueId,
        new_status: IssueStatus,
    ) -> Option<IssueStatus> {
        let issue = self.issues.iter_mut().find(|i| &i.id == issue_id)?;
        if issue.status == new_status {
            return None;
        }
        let previous = issue.status;
        issue.status = new_status;
        Some(previous)
    }

    pub fn rollback(&mut self, issue_id: &IssueId, previous: IssueStatus) -> bool {
        match self.issues.iter_mut().find(|i| &i.id == issue_id) {
            Some(issue) => {
                issue.status = previous;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockIssueGateway;
    use crate::NewIssue;
    use sprintboard_core::BoardError;

    fn issue(id: &str, sprint: &str, status: IssueStatus) -> Issue {
        let mut issue = Issue::create(NewIssue::new("p1", sprint, id));
        issue.id = id.to_string();
        issue.status = status;
        issue
    }

    fn loaded(issues: Vec<Issue>) -> IssueStore {
        let mut store = IssueStore::new();
        let ticket = store.begin_load(&"s1".to_string());
        store.finish_load(ticket, Ok(issues)).unwrap();
        store
    }

    #[test]
    fn test_load_replaces_issues() {
        let mut store = loaded(vec![issue("I1", "s1", IssueStatus::Todo)]);
        let ticket = store.begin_load(&"s1".to_string());
        assert!(store.is_loading());
        assert_eq!(store.issues().len(), 1);

        let outcome = store
            .finish_load(
                ticket,
                Ok(vec![
                    issue("I2", "s1", IssueStatus::Done),
                    issue("I3", "s1", IssueStatus::Todo),
                ]),
            )
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Applied { count: 2 });
        assert!(store.get("I1").is_none());
        assert_eq!(store.state(), &LoadState::Ready);
    }

    #[test]
    fn test_failed_load_keeps_previous_issues() {
        let mut store = loaded(vec![issue("I1", "s1", IssueStatus::Todo)]);
        let ticket = store.begin_load(&"s1".to_string());
        let err = store
            .finish_load(ticket, Err(BoardError::Transport("offline".into())))
            .unwrap_err();

        assert!(matches!(err, BoardError::Transport(_)));
        assert!(matches!(store.state(), LoadState::Failed(_)));
        assert_eq!(store.issues().len(), 1);
    }

    #[test]
    fn test_switching_sprint_clears_issues() {
        let mut store = loaded(vec![issue("I1", "s1", IssueStatus::Todo)]);
        store.begin_load(&"s2".to_string());
        assert!(store.issues().is_empty());
        assert!(store.is_viewing(&"s2".to_string()));
    }

    #[test]
    fn test_superseded_load_is_discarded() {
        let mut store = IssueStore::new();
        let first = store.begin_load(&"s1".to_string());
        let second = store.begin_load(&"s2".to_string());

        let stale = store
            .finish_load(first, Ok(vec![issue("I1", "s1", IssueStatus::Todo)]))
            .unwrap();
        assert_eq!(stale, LoadOutcome::Stale);
        assert!(store.issues().is_empty());

        store
            .finish_load(second, Ok(vec![issue("I9", "s2", IssueStatus::Done)]))
            .unwrap();
        assert!(store.get("I9").is_some());
    }

    #[test]
    fn test_foreign_issues_are_dropped() {
        let store = loaded(vec![
            issue("I1", "s1", IssueStatus::Todo),
            issue("X1", "other", IssueStatus::Todo),
        ]);
        assert_eq!(store.issues().len(), 1);
        assert!(store.get("X1").is_none());
    }

    #[test]
    fn test_apply_optimistic_returns_previous_status() {
        let mut store = loaded(vec![issue("I1", "s1", IssueStatus::Todo)]);
        let previous = store.apply_optimistic(&"I1".to_string(), IssueStatus::InProgress);

        assert_eq!(previous, Some(IssueStatus::Todo));
        assert_eq!(store.get("I1").unwrap().status, IssueStatus::InProgress);
    }

    #[test]
    fn test_apply_optimistic_no_change_is_noop() {
        let mut store = loaded(vec![issue("I1", "s1", IssueStatus::Todo)]);
        let before = store.issues().to_vec();

        assert_eq!(store.apply_optimistic(&"I1".to_string(), IssueStatus::Todo), None);
        assert_eq!(store.apply_optimistic(&"nope".to_string(), IssueStatus::Done), None);
        assert_eq!(store.issues(), before.as_slice());
    }

    #[test]
    fn test_rollback_restores_status() {
        let mut store = loaded(vec![issue("I1", "s1", IssueStatus::Todo)]);
        let id = "I1".to_string();
        let previous = store.apply_optimistic(&id, IssueStatus::Done).unwrap();

        assert!(store.rollback(&id, previous));
        assert_eq!(store.get("I1").unwrap().status, IssueStatus::Todo);
        assert!(!store.rollback(&"missing".to_string(), IssueStatus::Todo));
    }

    #[tokio::test]
    async fn test_load_through_gateway() {
        let mut gateway = MockIssueGateway::new();
        gateway
            .expect_load_issues()
            .withf(|sprint_id| sprint_id == "s1")
            .times(1)
            .returning(|_| Ok(vec![issue("I1", "s1", IssueStatus::InReview)]));

        let store = Mutex::new(IssueStore::new());
        let outcome = IssueStore::load(&store, &gateway, &"s1".to_string())
            .await
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Applied { count: 1 });
        assert_eq!(
            store.lock().get("I1").map(|i| i.status),
            Some(IssueStatus::InReview)
        );
    }
}
