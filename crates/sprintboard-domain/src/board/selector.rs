use crate::{Sprint, SprintId, SprintStatus};

/// Which of a project's sprints is in view.
#[derive(Debug, Clone, Default)]
pub struct SprintSelector {
    sprints: Vec<Sprint>,
    current: Option<SprintId>,
}

impl SprintSelector {
    /// Starts on the first ACTIVE sprint, else the first sprint, else nothing.
    pub fn new(sprints: Vec<Sprint>) -> Self {
        let current = sprints
            .iter()
            .find(|s| s.status == SprintStatus::Active)
            .or_else(|| sprints.first())
            .map(|s| s.id.clone());
        Self { sprints, current }
    }

    pub fn sprints(&self) -> &[Sprint] {
        &self.sprints
    }

    pub fn current(&self) -> Option<&Sprint> {
        let id = self.current.as_ref()?;
        self.sprints.iter().find(|s| &s.id == id)
    }

    pub fn current_id(&self) -> Option<&SprintId> {
        self.current.as_ref()
    }

    /// Switch to `sprint_id`. Unknown ids leave the selection untouched.
    pub fn select(&mut self, sprint_id: &str) -> Option<&Sprint> {
        let sprint = self.sprints.iter().find(|s| s.id == sprint_id)?;
        self.current = Some(sprint.id.clone());
        Some(sprint)
    }

    /// Replace the local copy of a sprint with a fresher one.
    pub fn replace(&mut self, sprint: Sprint) -> bool {
        match self.sprints.iter_mut().find(|s| s.id == sprint.id) {
            Some(existing) => {
                *existing = sprint;
                true
            }
            None => false,
        }
    }
}
