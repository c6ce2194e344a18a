//! Pointer drag tracking over the status columns.
//!
//! Issues are the draggables, columns the drop zones. Releasing a drag
//! over a zone produces a [`MoveIntent`]; releasing it anywhere else is a
//! cancelled drag.

use serde::{Deserialize, Serialize};

use crate::{IssueId, IssueStatus};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right(), self.top),
            Point::new(self.left, self.bottom()),
            Point::new(self.right(), self.bottom()),
        ]
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.width, self.height)
    }

    /// True when the two rectangles share a region of positive area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    /// Mean distance between matching corners of the two rectangles.
    pub fn corner_distance(&self, other: &Rect) -> f64 {
        let total: f64 = self
            .corners()
            .iter()
            .zip(other.corners().iter())
            .map(|(a, b)| a.distance_to(*b))
            .sum();
        total / 4.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropZone {
    pub key: IssueStatus,
    pub rect: Rect,
}

/// Request to move an issue into another column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub issue_id: IssueId,
    pub target: IssueStatus,
}

impl MoveIntent {
    pub fn new(issue_id: impl Into<IssueId>, target: IssueStatus) -> Self {
        Self {
            issue_id: issue_id.into(),
            target,
        }
    }
}

/// Pick the overlapping zone whose corners sit closest to the dragged
/// rectangle's corners. Equal distances resolve to the earlier zone.
pub fn closest_corners(dragged: &Rect, zones: &[DropZone]) -> Option<IssueStatus> {
    zones
        .iter()
        .filter(|zone| zone.rect.intersects(dragged))
        .map(|zone| (zone.key, zone.rect.corner_distance(dragged)))
        .fold(None, |best: Option<(IssueStatus, f64)>, candidate| match best {
            Some(current) if current.1 <= candidate.1 => Some(current),
            _ => Some(candidate),
        })
        .map(|(key, _)| key)
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    issue_id: IssueId,
    origin: Rect,
    pointer_start: Point,
    pointer: Point,
}

impl ActiveDrag {
    fn dragged_rect(&self) -> Rect {
        self.origin.translate(
            self.pointer.x - self.pointer_start.x,
            self.pointer.y - self.pointer_start.y,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct DragCoordinator {
    zones: Vec<DropZone>,
    active: Option<ActiveDrag>,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or move the drop zone of a column.
    pub fn register_zone(&mut self, key: IssueStatus, rect: Rect) {
        match self.zones.iter_mut().find(|zone| zone.key == key) {
            Some(zone) => zone.rect = rect,
            None => self.zones.push(DropZone { key, rect }),
        }
    }

    pub fn remove_zone(&mut self, key: IssueStatus) {
        self.zones.retain(|zone| zone.key != key);
    }

    pub fn zones(&self) -> &[DropZone] {
        &self.zones
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_issue(&self) -> Option<&IssueId> {
        self.active.as_ref().map(|drag| &drag.issue_id)
    }

    /// Begin dragging `issue_id`, whose card occupies `item` on screen.
    /// A drag already in progress is abandoned.
    pub fn start(&mut self, issue_id: impl Into<IssueId>, item: Rect, pointer: Point) {
        self.active = Some(ActiveDrag {
            issue_id: issue_id.into(),
            origin: item,
            pointer_start: pointer,
            pointer,
        });
    }

    pub fn move_to(&mut self, pointer: Point) {
        if let Some(drag) = self.active.as_mut() {
            drag.pointer = pointer;
        }
    }

    pub fn dragged_rect(&self) -> Option<Rect> {
        self.active.as_ref().map(ActiveDrag::dragged_rect)
    }

    /// Column currently under the dragged card, for hover highlighting.
    pub fn over(&self) -> Option<IssueStatus> {
        closest_corners(&self.dragged_rect()?, &self.zones)
    }

    /// Finish the drag at `pointer`.
    pub fn release(&mut self, pointer: Point) -> Option<MoveIntent> {
        let mut drag = self.active.take()?;
        drag.pointer = pointer;
        match closest_corners(&drag.dragged_rect(), &self.zones) {
            Some(target) => {
                tracing::debug!(issue_id = %drag.issue_id, %target, "Drop resolved");
                Some(MoveIntent {
                    issue_id: drag.issue_id,
                    target,
                })
            }
            None => {
                tracing::debug!(issue_id = %drag.issue_id, "Drop outside every column");
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }
}
