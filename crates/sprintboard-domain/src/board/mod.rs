//! Board state machine: which sprint is in view, its issues, and how
//! dragged issues change status.

pub mod dnd;
pub mod orchestrator;
pub mod selector;
pub mod session;
pub mod store;

pub use dnd::{closest_corners, DragCoordinator, DropZone, MoveIntent, Point, Rect};
pub use orchestrator::{StatusTransitionOrchestrator, TransitionOutcome, TransitionState};
pub use selector::SprintSelector;
pub use session::{BoardContext, BoardSession};
pub use store::{IssueStore, LoadOutcome, LoadState, LoadTicket, SharedIssueStore};
