use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sprintboard_core::{BoardError, BoardResult};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::project::ProjectId;

pub type SprintId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SprintStatus {
    Planned,
    Active,
    Completed,
}

impl SprintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "PLANNED",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
        }
    }

    /// Lifecycle is strictly forward: PLANNED -> ACTIVE -> COMPLETED.
    pub fn can_transition_to(self, next: SprintStatus) -> bool {
        matches!(
            (self, next),
            (Self::Planned, Self::Active) | (Self::Active, Self::Completed)
        )
    }
}

impl fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SprintStatus {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PLANNED" => Ok(Self::Planned),
            "ACTIVE" => Ok(Self::Active),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(BoardError::Validation(format!("Unknown sprint status '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: SprintId,
    pub project_id: ProjectId,
    pub name: String,
    pub status: SprintStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sprint {
    pub fn create(new: NewSprint) -> BoardResult<Self> {
        new.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            project_id: new.project_id,
            name: new.name,
            status: SprintStatus::Planned,
            start_date: new.start_date,
            end_date: new.end_date,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == SprintStatus::Active
    }

    /// Moves the sprint one step along its lifecycle.
    pub fn transition_to(&mut self, next: SprintStatus) -> BoardResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(BoardError::InvalidTransition(format!(
                "Sprint {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Input for creating a sprint; new sprints always start PLANNED.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSprint {
    pub project_id: ProjectId,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl NewSprint {
    /// `{PROJECT_KEY}-{sequence}` running `length_days` from `now`.
    /// `Validation` when the end falls outside the representable dates.
    pub fn with_defaults(
        project_id: impl Into<ProjectId>,
        project_key: &str,
        sequence: usize,
        now: DateTime<Utc>,
        length_days: u32,
    ) -> BoardResult<Self> {
        let end_date = now
            .checked_add_signed(Duration::days(i64::from(length_days)))
            .ok_or_else(|| {
                BoardError::Validation(format!(
                    "Sprint of {} days starting {} ends past the last supported date",
                    length_days, now
                ))
            })?;
        Ok(Self {
            project_id: project_id.into(),
            name: format!("{}-{}", project_key, sequence),
            start_date: now,
            end_date,
        })
    }

    pub fn validate(&self) -> BoardResult<()> {
        if self.name.trim().is_empty() {
            return Err(BoardError::Validation("Sprint name must not be empty".into()));
        }
        if self.end_date <= self.start_date {
            return Err(BoardError::Validation(format!(
                "Sprint '{}' must end after it starts",
                self.name
            )));
        }
        Ok(())
    }
}
