use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sprintboard_core::{BoardError, BoardResult};
use uuid::Uuid;

pub type ProjectId = String;
pub type OrganizationId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub organization_id: OrganizationId,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(
        organization_id: impl Into<OrganizationId>,
        key: &str,
        name: impl Into<String>,
    ) -> BoardResult<Self> {
        let key = Self::normalize_key(key)?;
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BoardError::Validation("Project name must not be empty".into()));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            organization_id: organization_id.into(),
            key,
            name,
            description: None,
            created_at: Utc::now(),
        })
    }

    /// Project keys are 2-10 upper-case alphanumerics, e.g. `WEB` or `API2`.
    pub fn normalize_key(key: &str) -> BoardResult<String> {
        let key = key.trim().to_ascii_uppercase();
        let valid_len = (2..=10).contains(&key.len());
        if !valid_len || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(BoardError::Validation(format!(
                "Invalid project key '{}': expected 2-10 letters or digits",
                key
            )));
        }
        Ok(key)
    }
}
