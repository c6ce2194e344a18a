//! Sprint lifecycle business rules.
//!
//! Pure functions deciding which lifecycle actions a sprint offers at a
//! given instant. They only advise: the persistence layer has the final
//! word on whether a transition is accepted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Sprint, SprintStatus};

/// Which lifecycle actions are currently available for a sprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SprintEligibility {
    pub can_start: bool,
    pub can_end: bool,
}

/// A PLANNED sprint can start while `start_date <= now < end_date`.
pub fn can_start(sprint: &Sprint, now: DateTime<Utc>) -> bool {
    sprint.status == SprintStatus::Planned && sprint.start_date <= now && now < sprint.end_date
}

/// An ACTIVE sprint can be ended at any time, early or late.
pub fn can_end(sprint: &Sprint) -> bool {
    sprint.status == SprintStatus::Active
}

pub fn evaluate(sprint: &Sprint, now: DateTime<Utc>) -> SprintEligibility {
    SprintEligibility {
        can_start: can_start(sprint, now),
        can_end: can_end(sprint),
    }
}
