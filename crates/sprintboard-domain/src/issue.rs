use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sprintboard_core::BoardError;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::project::ProjectId;
use crate::sprint::SprintId;

pub type IssueId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssuePriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl IssuePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }
}

impl fmt::Display for IssuePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssuePriority {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "URGENT" => Ok(Self::Urgent),
            _ => Err(BoardError::Validation(format!("Unknown priority '{}'", s))),
        }
    }
}

/// Status of an issue. Each value is the key of one board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    Todo,
    InProgress,
    InReview,
    Done,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 4] = [
        IssueStatus::Todo,
        IssueStatus::InProgress,
        IssueStatus::InReview,
        IssueStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::InReview => "IN_REVIEW",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| BoardError::Validation(format!("Unknown issue status '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub project_id: ProjectId,
    pub sprint_id: SprintId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub reporter: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub fn create(new: NewIssue) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: new.project_id,
            sprint_id: new.sprint_id,
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            assignee: new.assignee,
            reporter: new.reporter,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, status: IssueStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

/// Input for creating an issue inside a sprint.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub project_id: ProjectId,
    pub sprint_id: SprintId,
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
}

impl NewIssue {
    /// New issues start in TODO with MEDIUM priority.
    pub fn new(
        project_id: impl Into<ProjectId>,
        sprint_id: impl Into<SprintId>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            sprint_id: sprint_id.into(),
            title: title.into(),
            description: None,
            status: IssueStatus::Todo,
            priority: IssuePriority::Medium,
            assignee: None,
            reporter: None,
        }
    }

    pub fn validate(&self) -> Result<(), BoardError> {
        if self.title.trim().is_empty() {
            return Err(BoardError::Validation("Issue title must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&IssueStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let parsed: IssueStatus = serde_json::from_str("\"IN_REVIEW\"").unwrap();
        assert_eq!(parsed, IssueStatus::InReview);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("todo".parse::<IssueStatus>().unwrap(), IssueStatus::Todo);
        assert_eq!(
            "in-progress".parse::<IssueStatus>().unwrap(),
            IssueStatus::InProgress
        );
        assert_eq!("DONE".parse::<IssueStatus>().unwrap(), IssueStatus::Done);

        let err = "BLOCKED".parse::<IssueStatus>().unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("urgent".parse::<IssuePriority>().unwrap(), IssuePriority::Urgent);
        assert!("critical".parse::<IssuePriority>().is_err());
    }

    #[test]
    fn test_new_issue_defaults() {
        let new = NewIssue::new("p1", "s1", "Wire up login");
        assert_eq!(new.status, IssueStatus::Todo);
        assert_eq!(new.priority, IssuePriority::Medium);

        let issue = Issue::create(new);
        assert_eq!(issue.sprint_id, "s1");
        assert_eq!(issue.created_at, issue.updated_at);
        assert!(!issue.id.is_empty());
    }

    #[test]
    fn test_blank_title_rejected() {
        let new = NewIssue::new("p1", "s1", "   ");
        assert!(matches!(new.validate(), Err(BoardError::Validation(_))));
    }
}
