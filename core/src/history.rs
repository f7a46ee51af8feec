use crate::{Document, Selection};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub doc: Document,
    pub selection: Selection,
}

/// Linear undo history of whole-document snapshots.
///
/// `index` points at the snapshot matching the live document; entries
/// after it are the redo tail and are discarded by the next `record`.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    snapshots: VecDeque<Snapshot>,
    index: usize,
    max_depth: usize,
}

impl CommandHistory {
    pub fn new(initial: Snapshot, max_depth: usize) -> Self {
        let mut snapshots = VecDeque::new();
        snapshots.push_back(initial);
        Self {
            snapshots,
            index: 0,
            max_depth: max_depth.max(1),
        }
    }

    pub fn record(&mut self, snapshot: Snapshot) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push_back(snapshot);
        // max_depth undo steps need max_depth + 1 snapshots
        while self.snapshots.len() > self.max_depth + 1 {
            self.snapshots.pop_front();
        }
        self.index = self.snapshots.len() - 1;
        tracing::trace!(index = self.index, len = self.snapshots.len(), "history recorded");
    }

    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        tracing::trace!(index = self.index, "history undo");
        self.snapshots.get(self.index)
    }

    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        tracing::trace!(index = self.index, "history redo");
        self.snapshots.get(self.index)
    }

    /// Snapshot the live document is expected to match.
    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.index]
    }

    /// Replaces the selection stored with the current snapshot, so undoing
    /// back to it later restores where the caret last was.
    pub fn update_selection(&mut self, selection: Selection) {
        if let Some(snapshot) = self.snapshots.get_mut(self.index) {
            snapshot.selection = selection;
        }
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Forgets everything and starts over from `initial`.
    pub fn reset(&mut self, initial: Snapshot) {
        self.snapshots.clear();
        self.snapshots.push_back(initial);
        self.index = 0;
    }

    /// Drops every undo and redo step, keeping the current snapshot.
    pub fn clear(&mut self) {
        if let Some(current) = self.snapshots.remove(self.index) {
            self.reset(current);
        }
    }
}
