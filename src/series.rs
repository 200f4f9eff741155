//! Bounded rolling temperature series feeding the chart.

use std::collections::VecDeque;

use crate::model::SeriesPoint;

/// Default maximum number of points kept for the chart.
pub const DEFAULT_MAX_POINTS: usize = 20;

/// Insertion-ordered series holding at most `capacity` points.
///
/// When a new point would exceed the capacity the oldest point is evicted.
/// There is no other way to remove or reorder points.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    points: VecDeque<SeriesPoint>,
    capacity: usize,
}

impl Default for SeriesBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POINTS)
    }
}

impl SeriesBuffer {
    /// Create an empty buffer. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn append(&mut self, point: SeriesPoint) {
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Ordered copy of the current points, oldest first.
    pub fn snapshot(&self) -> Vec<SeriesPoint> {
        self.points.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.points.back()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
