//! # Undo/Redo Stack
//!
//! History over a single value (the section order list), independent of the
//! rest of the document.
//!
//! ## Design
//!
//! - `past` holds earlier values (most recent last), `future` holds undone
//!   values (most recent last), `present` is the current value
//! - Pushing a new present clears the future
//! - Undo moves present → future and pops past → present; redo mirrors it
//! - `past` is capped; the oldest entries are dropped first
//! - Pushing a value equal to the present is a no-op

use std::collections::VecDeque;

/// Bounded undo/redo history
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    past: VecDeque<T>,
    present: T,
    future: Vec<T>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl<T: Clone + PartialEq> HistoryStack<T> {
    pub const DEFAULT_MAX_LEVELS: usize = 50;

    /// Create a history with default max levels (50)
    pub fn new(present: T) -> Self {
        Self::with_max_levels(present, Self::DEFAULT_MAX_LEVELS)
    }

    pub fn with_max_levels(present: T, max_levels: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: Vec::new(),
            max_levels,
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Record a new present value. Returns `false` if it equals the present.
    pub fn push(&mut self, entry: T) -> bool {
        if entry == self.present {
            return false;
        }

        let previous = std::mem::replace(&mut self.present, entry);
        self.past.push_back(previous);

        if self.max_levels > 0 && self.past.len() > self.max_levels {
            self.past.pop_front();
        }

        // New action invalidates the future
        self.future.clear();
        true
    }

    /// Step back. Returns the new present, or `None` if nothing to undo.
    pub fn undo(&mut self) -> Option<&T> {
        let previous = self.past.pop_back()?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        Some(&self.present)
    }

    /// Step forward. Returns the new present, or `None` if nothing to redo.
    pub fn redo(&mut self) -> Option<&T> {
        let next = self.future.pop()?;
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        Some(&self.present)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.past.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    /// Drop all history and start over from `present`
    pub fn reset(&mut self, present: T) {
        self.past.clear();
        self.future.clear();
        self.present = present;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_history_creation() {
        let stack = HistoryStack::new(order(&["a", "b"]));
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_push_undo_redo() {
        let mut stack = HistoryStack::new(order(&["a", "b", "c"]));
        assert!(stack.push(order(&["b", "a", "c"])));

        assert_eq!(stack.undo(), Some(&order(&["a", "b", "c"])));
        assert!(stack.can_redo());
        assert_eq!(stack.redo(), Some(&order(&["b", "a", "c"])));
        assert!(!stack.can_redo());
        assert_eq!(stack.undo_levels(), 1);
    }

    #[test]
    fn test_undo_on_empty_is_none() {
        let mut stack = HistoryStack::new(1);
        assert_eq!(stack.undo(), None);
        assert_eq!(stack.redo(), None);
        assert_eq!(*stack.present(), 1);
    }

    #[test]
    fn test_new_push_clears_redo() {
        let mut stack = HistoryStack::new(0);
        stack.push(1);
        stack.push(2);
        stack.undo();
        assert_eq!(stack.redo_levels(), 1);

        stack.push(3);
        assert_eq!(stack.redo_levels(), 0);
        assert_eq!(stack.undo(), Some(&1));
    }

    #[test]
    fn test_duplicate_push_ignored() {
        let mut stack = HistoryStack::new(order(&["a"]));
        assert!(!stack.push(order(&["a"])));
        assert_eq!(stack.undo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut stack = HistoryStack::with_max_levels(0, 2);
        for i in 1..=3 {
            stack.push(i);
        }

        // Should only keep 2 (max levels), oldest dropped
        assert_eq!(stack.undo_levels(), 2);
        assert_eq!(stack.undo(), Some(&2));
        assert_eq!(stack.undo(), Some(&1));
        assert_eq!(stack.undo(), None);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut stack = HistoryStack::new(0);
        stack.push(1);
        stack.undo();
        stack.reset(9);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert_eq!(*stack.present(), 9);
    }
}
