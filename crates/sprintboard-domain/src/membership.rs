use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sprintboard_core::{BoardError, BoardResult};
use std::fmt;
use std::str::FromStr;

use crate::gateway::MembershipProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Hosted providers prefix roles, e.g. `org:admin`.
        let bare = s.trim().rsplit(':').next().unwrap_or_default();
        match bare.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(BoardError::Validation(format!("Unknown role '{}'", s))),
        }
    }
}

/// Only organization admins may create projects.
pub fn can_create_project(role: Role) -> bool {
    role == Role::Admin
}

pub async fn ensure_can_create_project(provider: &dyn MembershipProvider) -> BoardResult<()> {
    let role = provider.current_membership_role().await?;
    if !can_create_project(role) {
        return Err(BoardError::Validation(format!(
            "Role '{}' cannot create projects",
            role
        )));
    }
    Ok(())
}

/// Membership provider answering with a fixed role.
#[derive(Debug, Clone, Copy)]
pub struct StaticMembership {
    role: Role,
}

impl StaticMembership {
    pub fn new(role: Role) -> Self {
        Self { role }
    }
}

#[async_trait]
impl MembershipProvider for StaticMembership {
    async fn current_membership_role(&self) -> BoardResult<Role> {
        Ok(self.role)
    }
}
