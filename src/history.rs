//! Linear undo/redo log of image snapshots.
//!
//! A classic "discard the future on a new branch" history, not a tree. The
//! stack is a `Vec` of [`PixelBuffer`] snapshots plus a cursor pointing at
//! the snapshot that matches what the user currently sees:
//!
//! ```text
//!   push s0, s1, s2          undo                 push s3'
//!   [s0, s1, s2]             [s0, s1, s2]         [s0, s1, s3']
//!            ^                    ^                        ^
//! ```
//!
//! Entries past the cursor are redo-able; pushing while the cursor is not at
//! the end drops them. Position 0 is the oldest state, so undo stops there.
//!
//! Snapshots are full images, not deltas. Because [`PixelBuffer`] shares its
//! pixels through an `Arc`, keeping a snapshot of the session's current image
//! costs a reference count, not a copy.

use crate::imaging::PixelBuffer;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Nothing to redo")]
    NothingToRedo,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    entries: Vec<PixelBuffer>,
    cursor: Option<usize>,
    max_depth: Option<usize>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stack that keeps at most `max_depth` snapshots, evicting the oldest.
    /// Limits below 2 are raised to 2 so a single step can always be undone.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth.max(2)),
            ..Self::default()
        }
    }

    /// Drop everything after the cursor, append `snapshot`, and move the
    /// cursor onto it. Returns how many of the oldest snapshots were evicted
    /// to honour the depth limit.
    pub fn push(&mut self, snapshot: PixelBuffer) -> usize {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(snapshot);
        self.cursor = Some(self.entries.len() - 1);
        self.enforce_limit()
    }

    /// Step back one snapshot and return it.
    pub fn undo(&mut self) -> Result<PixelBuffer, HistoryError> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                Ok(self.entries[c - 1].clone())
            }
            _ => Err(HistoryError::NothingToUndo),
        }
    }

    /// Step forward one snapshot and return it.
    pub fn redo(&mut self) -> Result<PixelBuffer, HistoryError> {
        match self.cursor {
            Some(c) if c + 1 < self.entries.len() => {
                self.cursor = Some(c + 1);
                Ok(self.entries[c + 1].clone())
            }
            _ => Err(HistoryError::NothingToRedo),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current snapshot, `None` when empty.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn can_undo(&self) -> bool {
        self.undo_depth() > 0
    }

    pub fn can_redo(&self) -> bool {
        self.redo_depth() > 0
    }

    /// How many undo steps are available.
    pub fn undo_depth(&self) -> usize {
        self.cursor.unwrap_or(0)
    }

    /// How many redo steps are available.
    pub fn redo_depth(&self) -> usize {
        self.cursor.map_or(0, |c| self.entries.len() - 1 - c)
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> Option<&PixelBuffer> {
        self.cursor.map(|c| &self.entries[c])
    }

    /// All snapshots, oldest first, flagged with whether each is current.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &PixelBuffer, bool)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, e, self.cursor == Some(i)))
    }

    fn enforce_limit(&mut self) -> usize {
        let Some(max) = self.max_depth else {
            return 0;
        };
        let excess = self.entries.len().saturating_sub(max);
        if excess > 0 {
            self.entries.drain(..excess);
            self.cursor = self.cursor.map(|c| c.saturating_sub(excess));
            log::warn!("History limit of {max} reached, dropped {excess} oldest snapshot(s)");
        }
        excess
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(v: u8) -> PixelBuffer {
        PixelBuffer::filled(1, 1, [v, v, v]).unwrap()
    }

    fn stack_of(values: &[u8]) -> HistoryStack {
        let mut h = HistoryStack::new();
        for &v in values {
            h.push(snap(v));
        }
        h
    }

    #[test]
    fn new_stack_is_empty() {
        let h = HistoryStack::new();
        assert!(h.is_empty());
        assert_eq!(h.cursor(), None);
        assert!(!h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn push_moves_cursor_to_end() {
        let h = stack_of(&[1, 2, 3]);
        assert_eq!(h.len(), 3);
        assert_eq!(h.cursor(), Some(2));
        assert_eq!(h.current(), Some(&snap(3)));
    }

    #[test]
    fn undo_walks_back_to_first_entry() {
        let mut h = stack_of(&[1, 2, 3]);
        assert_eq!(h.undo().unwrap(), snap(2));
        assert_eq!(h.undo().unwrap(), snap(1));
        assert_eq!(h.undo(), Err(HistoryError::NothingToUndo));
        assert_eq!(h.cursor(), Some(0));
    }

    #[test]
    fn undo_on_empty_fails() {
        let mut h = HistoryStack::new();
        assert_eq!(h.undo(), Err(HistoryError::NothingToUndo));
        assert_eq!(h.redo(), Err(HistoryError::NothingToRedo));
    }

    #[test]
    fn single_entry_cannot_undo() {
        let mut h = stack_of(&[1]);
        assert_eq!(h.undo(), Err(HistoryError::NothingToUndo));
    }

    #[test]
    fn redo_replays_forward() {
        let mut h = stack_of(&[1, 2, 3]);
        h.undo().unwrap();
        h.undo().unwrap();
        assert_eq!(h.redo().unwrap(), snap(2));
        assert_eq!(h.redo().unwrap(), snap(3));
        assert_eq!(h.redo(), Err(HistoryError::NothingToRedo));
    }

    #[test]
    fn push_after_undo_discards_future() {
        let mut h = stack_of(&[1, 2, 3]);
        h.undo().unwrap();
        h.push(snap(9));
        assert_eq!(h.len(), 3);
        assert_eq!(h.current(), Some(&snap(9)));
        assert_eq!(h.redo(), Err(HistoryError::NothingToRedo));
        assert_eq!(h.undo().unwrap(), snap(2));
    }

    #[test]
    fn depths_track_cursor() {
        let mut h = stack_of(&[1, 2, 3, 4]);
        assert_eq!((h.undo_depth(), h.redo_depth()), (3, 0));
        h.undo().unwrap();
        assert_eq!((h.undo_depth(), h.redo_depth()), (2, 1));
    }

    #[test]
    fn clear_resets_cursor() {
        let mut h = stack_of(&[1, 2]);
        h.clear();
        assert!(h.is_empty());
        assert_eq!(h.cursor(), None);
        assert_eq!(h.undo(), Err(HistoryError::NothingToUndo));
    }

    #[test]
    fn depth_limit_evicts_oldest() {
        let mut h = HistoryStack::with_max_depth(3);
        for v in 1..=3 {
            assert_eq!(h.push(snap(v)), 0);
        }
        assert_eq!(h.push(snap(4)), 1);
        assert_eq!(h.len(), 3);
        assert_eq!(h.cursor(), Some(2));
        assert_eq!(h.undo().unwrap(), snap(3));
        assert_eq!(h.undo().unwrap(), snap(2));
        assert!(h.undo().is_err());
    }

    #[test]
    fn depth_limit_has_floor_of_two() {
        assert_eq!(HistoryStack::with_max_depth(0).max_depth(), Some(2));
    }

    #[test]
    fn entries_flag_current() {
        let mut h = stack_of(&[1, 2, 3]);
        h.undo().unwrap();
        let flags: Vec<bool> = h.entries().map(|(_, _, current)| current).collect();
        assert_eq!(flags, vec![false, true, false]);
    }
}
