//! Bounded undo/redo history of full graph snapshots.
//!
//! Every structural edit pushes the state it is about to replace. Drags are
//! the exception: the pre-drag state is held from drag start and committed
//! once when the drag ends, so intermediate moves never reach the stack.

use std::collections::VecDeque;

/// Undo/redo stacks over snapshots of type `T`.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    future: VecDeque<T>,
    pending_drag: Option<T>,
    capacity: usize,
}

impl<T: Clone> History<T> {
    /// Creates an empty history holding at most `capacity` undo entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(capacity.min(64)),
            future: VecDeque::new(),
            pending_drag: None,
            capacity: capacity.max(1),
        }
    }

    /// Records the state a committed mutation is about to replace.
    ///
    /// Evicts the oldest entry past capacity and clears the redo stack.
    pub fn snapshot(&mut self, state: T) {
        self.push_past(state);
        self.future.clear();
    }

    /// Steps back one entry.
    ///
    /// Returns the state to apply, or `None` when there is nothing to undo.
    /// `current` moves to the front of the redo stack.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.past.pop_back()?;
        self.future.push_front(current);
        Some(previous)
    }

    /// Steps forward one entry. Symmetric to [`History::undo`].
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.future.pop_front()?;
        self.push_past(current);
        Some(next)
    }

    /// Holds the pre-drag state until [`History::end_drag`].
    ///
    /// A second call before the drag ends keeps the first state.
    pub fn begin_drag(&mut self, state: T) {
        if self.pending_drag.is_none() {
            self.pending_drag = Some(state);
        }
    }

    /// Commits the held pre-drag state. Returns false if no drag was pending.
    pub fn end_drag(&mut self) -> bool {
        match self.pending_drag.take() {
            Some(state) => {
                self.snapshot(state);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.pending_drag.is_some()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry, including a pending drag.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.pending_drag = None;
    }

    fn push_past(&mut self, state: T) {
        self.past.push_back(state);
        while self.past.len() > self.capacity {
            self.past.pop_front();
        }
    }
}
