//! Optimistic issue status transitions.
//!
//! Each move runs Idle -> OptimisticApplied -> Persisting and ends in
//! Reconciled (persisted, store reloaded) or RolledBack (persist failed,
//! previous status restored). Moves of the same issue are serialized by a
//! per-issue async mutex; moves of different issues run side by side.

use parking_lot::Mutex;
use serde::Serialize;
use sprintboard_core::{BoardError, BoardResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::dnd::MoveIntent;
use super::store::{IssueStore, LoadOutcome, SharedIssueStore};
use crate::gateway::IssueGateway;
use crate::notify::Notifier;
use crate::{Issue, IssueId, IssueStatus, ProjectId, SprintId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TransitionState {
    #[default]
    Idle,
    OptimisticApplied,
    Persisting,
    Reconciled,
    RolledBack,
}

impl TransitionState {
    pub fn can_advance_to(self, next: TransitionState) -> bool {
        use TransitionState::*;
        matches!(
            (self, next),
            (Idle | Reconciled | RolledBack, OptimisticApplied)
                | (OptimisticApplied, Persisting)
                | (Persisting, Reconciled | RolledBack)
        )
    }
}

#[derive(Debug)]
pub enum TransitionOutcome {
    /// Issue not on the board or already in the target column.
    Unchanged,
    Moved {
        issue_id: IssueId,
        status: IssueStatus,
        /// False when the follow-up reload was skipped or failed.
        reconciled: bool,
    },
    RolledBack {
        issue_id: IssueId,
        restored: IssueStatus,
        error: BoardError,
    },
}

impl TransitionOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

type IssueLocks = Mutex<HashMap<IssueId, Arc<tokio::sync::Mutex<()>>>>;

/// A handle on one issue's serial lock. The map entry goes away with the
/// last handle, so idle issues hold no lock.
struct IssueLease<'a> {
    locks: &'a IssueLocks,
    issue_id: IssueId,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for IssueLease<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock();
        // One reference in the map, one here: nobody else is queued.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.issue_id);
        }
    }
}

pub struct StatusTransitionOrchestrator {
    project_id: ProjectId,
    store: SharedIssueStore,
    gateway: Arc<dyn IssueGateway>,
    notifier: Arc<dyn Notifier>,
    issue_locks: IssueLocks,
    states: Mutex<HashMap<IssueId, TransitionState>>,
    in_flight: AtomicUsize,
}

impl StatusTransitionOrchestrator {
    pub fn new(
        project_id: ProjectId,
        store: SharedIssueStore,
        gateway: Arc<dyn IssueGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            project_id,
            store,
            gateway,
            notifier,
            issue_locks: Mutex::new(HashMap::new()),
            states: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// True while any move is between its optimistic apply and its end.
    pub fn is_updating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn state_of(&self, issue_id: &str) -> TransitionState {
        self.states
            .lock()
            .get(issue_id)
            .copied()
            .unwrap_or_default()
    }

    pub async fn move_issue(&self, intent: MoveIntent) -> TransitionOutcome {
        let lease = self.lease(&intent.issue_id);
        let outcome = {
            let _serial = lease.lock.lock().await;
            self.run_move(intent).await
        };
        self.prune_states();
        outcome
    }

    async fn run_move(&self, intent: MoveIntent) -> TransitionOutcome {
        let applied = {
            let mut store = self.store.lock();
            let sprint_id = store.sprint_id().cloned();
            store
                .apply_optimistic(&intent.issue_id, intent.target)
                .zip(sprint_id)
        };
        let Some((previous, sprint_id)) = applied else {
            tracing::debug!(issue_id = %intent.issue_id, target = %intent.target, "Move discarded");
            return TransitionOutcome::Unchanged;
        };

        let _in_flight = InFlight::enter(&self.in_flight);
        self.advance(&intent.issue_id, TransitionState::OptimisticApplied);
        self.advance(&intent.issue_id, TransitionState::Persisting);

        let persisted = self
            .gateway
            .update_issue_status(&intent.issue_id, intent.target, &self.project_id)
            .await
            .and_then(|issue| check_response(issue, &intent));

        match persisted {
            Ok(_) => {
                let reconciled = self.reconcile(&sprint_id).await;
                self.advance(&intent.issue_id, TransitionState::Reconciled);
                self.notifier
                    .success(format!("Issue moved to {}", intent.target));
                TransitionOutcome::Moved {
                    issue_id: intent.issue_id,
                    status: intent.target,
                    reconciled,
                }
            }
            Err(error) => {
                tracing::warn!(issue_id = %intent.issue_id, "Status update failed: {}", error);
                {
                    let mut store = self.store.lock();
                    if store.is_viewing(&sprint_id) {
                        store.rollback(&intent.issue_id, previous);
                    }
                }
                if error.is_not_found() {
                    self.reconcile(&sprint_id).await;
                }
                self.advance(&intent.issue_id, TransitionState::RolledBack);
                self.notifier
                    .error("Failed to update issue status".to_string());
                TransitionOutcome::RolledBack {
                    issue_id: intent.issue_id,
                    restored: previous,
                    error,
                }
            }
        }
    }

    /// Reload `sprint_id` unless the board moved on to another sprint.
    async fn reconcile(&self, sprint_id: &SprintId) -> bool {
        if !self.store.lock().is_viewing(sprint_id) {
            tracing::debug!(%sprint_id, "Discarding reconciliation for a sprint no longer in view");
            return false;
        }
        match IssueStore::load(&self.store, self.gateway.as_ref(), sprint_id).await {
            Ok(LoadOutcome::Applied { .. }) => true,
            Ok(LoadOutcome::Stale) => false,
            Err(err) => {
                tracing::warn!(%sprint_id, "Reload after move failed: {}", err);
                false
            }
        }
    }

    fn lease(&self, issue_id: &IssueId) -> IssueLease<'_> {
        let lock = self
            .issue_locks
            .lock()
            .entry(issue_id.clone())
            .or_default()
            .clone();
        IssueLease {
            locks: &self.issue_locks,
            issue_id: issue_id.clone(),
            lock,
        }
    }

    /// Keep transition states only for issues still on the board.
    fn prune_states(&self) {
        let store = self.store.lock();
        self.states
            .lock()
            .retain(|issue_id, _| store.get(issue_id).is_some());
    }

    fn advance(&self, issue_id: &IssueId, next: TransitionState) {
        let mut states = self.states.lock();
        let state = states.entry(issue_id.clone()).or_default();
        debug_assert!(
            state.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            state,
            next
        );
        tracing::debug!(%issue_id, from = ?*state, to = ?next, "Issue transition");
        *state = next;
    }
}

/// The persisted issue must be the one we asked for, in the status we asked for.
fn check_response(issue: Issue, intent: &MoveIntent) -> BoardResult<Issue> {
    if issue.id != intent.issue_id || issue.status != intent.target {
        return Err(BoardError::Validation(format!(
            "Update of {} to {} answered with {} in {}",
            intent.issue_id, intent.target, issue.id, issue.status
        )));
    }
    Ok(issue)
}
