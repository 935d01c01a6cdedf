//! Double-ended worklist driving the adaptive scheduler

use std::collections::VecDeque;

/// Ordered worklist of pending items
///
/// Drains front to back. Split children go back in at the front so they are
/// processed before any later sibling, keeping document order intact.
#[derive(Debug, Clone)]
pub struct WorkQueue<T> {
    items: VecDeque<T>,
}

impl<T> WorkQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Append an item at the back
    pub fn push_back(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Re-insert a split pair at the front, `first` ahead of `second`
    pub fn push_front_pair(&mut self, first: T, second: T) {
        self.items.push_front(second);
        self.items.push_front(first);
    }

    /// Take the next item
    pub fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Number of pending items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Best-effort total for progress reporting, called right after a pop
    ///
    /// Counts finished items, the one in hand and those still queued. Splits
    /// change the real total, so this is advisory only.
    pub fn estimated_total(&self, processed: usize) -> usize {
        processed + 1 + self.items.len()
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
