//! Route buffer - ordered, append-only sequence of accepted fixes

use crate::domain::walk::WalkPoint;

/// Buffer of accepted route points for the active session.
///
/// Owned exclusively by the session engine: appends happen only while
/// Tracking, and the buffer is cleared only by an explicit `reset` after a
/// walk has been committed.
#[derive(Debug, Default)]
pub struct RouteBuffer {
    points: Vec<WalkPoint>,
}

impl RouteBuffer {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn append(&mut self, point: WalkPoint) {
        self.points.push(point);
    }

    /// Last accepted point, the validator's ordering reference
    pub fn last(&self) -> Option<&WalkPoint> {
        self.points.last()
    }

    /// Defensive copy of the route so far
    pub fn snapshot(&self) -> Vec<WalkPoint> {
        self.points.clone()
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
