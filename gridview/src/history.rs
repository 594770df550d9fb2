// history.rs - Frame history and playback cursor

use log::debug;

use crate::error::GridError;
use crate::grid::{GridStateStore, StateSequence};

/// Ordered snapshots plus a 1-based cursor.
///
/// A cursor of 0 (or an empty history) means no frame is applied. Moving the
/// cursor re-applies a snapshot to the grid but never edits the history.
#[derive(Debug, Clone, Default)]
pub struct FrameHistory {
    frames: Vec<StateSequence>,
    cursor: usize,
}

impl FrameHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[StateSequence] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The snapshot under the cursor, if any.
    pub fn current(&self) -> Option<&StateSequence> {
        self.cursor.checked_sub(1).and_then(|i| self.frames.get(i))
    }

    /// Replaces the history with a single frame and points the cursor at it.
    pub fn reset(&mut self, snapshot: StateSequence) {
        self.frames.clear();
        self.frames.push(snapshot);
        self.cursor = 1;
    }

    pub fn append(&mut self, snapshot: StateSequence) {
        self.frames.push(snapshot);
    }

    /// Detaches the cursor without touching the frames.
    pub fn park(&mut self) {
        self.cursor = 0;
    }

    /// Moves the cursor to frame `n` (1-based) and applies it to `grid`.
    ///
    /// Out-of-range values are ignored. If the frame no longer fits the grid the
    /// cursor still moves and the shape error is returned.
    pub fn set_cursor(&mut self, n: usize, grid: &mut GridStateStore) -> Result<(), GridError> {
        if n == 0 || n > self.frames.len() {
            debug!("Ignoring frame {} (history has {})", n, self.frames.len());
            return Err(GridError::FrameOutOfRange { requested: n, len: self.frames.len() });
        }

        self.cursor = n;
        grid.update_cell_states(&self.frames[n - 1])
    }

    /// `"{cursor} / {len}"`, as shown next to the frame slider.
    pub fn label(&self) -> String {
        format!("{} / {}", self.cursor, self.frames.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn history_of(frames: &[StateSequence]) -> FrameHistory {
        let mut history = FrameHistory::new();
        let (first, rest) = frames.split_first().unwrap();
        history.reset(first.clone());
        for frame in rest {
            history.append(frame.clone());
        }
        history
    }

    #[test]
    fn reset_holds_exactly_one_frame() {
        let mut history = history_of(&[vec![1, 1], vec![0, 1], vec![1, 0]]);
        history.reset(vec![0, 0]);
        assert_eq!(history.frames(), [vec![0u8, 0]].as_slice());
        assert_eq!(history.cursor(), 1);
    }

    #[test]
    fn append_does_not_move_cursor() {
        let mut history = history_of(&[vec![0, 0]]);
        history.append(vec![1, 0]);
        history.append(vec![1, 1]);
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 1);
    }

    #[test]
    fn set_cursor_applies_selected_frame() {
        let frames = vec![vec![0, 0, 0, 0], vec![1, 0, 0, 0], vec![1, 1, 0, 1]];
        let mut history = history_of(&frames);
        let mut grid = GridStateStore::with_size(2, 2).unwrap();

        for k in 1..=frames.len() {
            history.set_cursor(k, &mut grid).unwrap();
            assert_eq!(grid.get_cell_states(), frames[k - 1]);
            assert_eq!(history.cursor(), k);
            assert_eq!(history.current(), Some(&frames[k - 1]));
        }
        assert_eq!(history.frames(), frames.as_slice());
    }

    #[test]
    fn out_of_range_cursor_is_rejected() {
        let mut history = history_of(&[vec![1, 0, 0, 0], vec![0, 1, 0, 0]]);
        let mut grid = GridStateStore::with_size(2, 2).unwrap();
        history.set_cursor(2, &mut grid).unwrap();

        assert_eq!(
            history.set_cursor(0, &mut grid),
            Err(GridError::FrameOutOfRange { requested: 0, len: 2 })
        );
        assert_eq!(
            history.set_cursor(3, &mut grid),
            Err(GridError::FrameOutOfRange { requested: 3, len: 2 })
        );
        assert_eq!(history.cursor(), 2);
        assert_eq!(grid.get_cell_states(), vec![0, 1, 0, 0]);
    }

    #[test]
    fn empty_history_applies_nothing() {
        let mut history = FrameHistory::new();
        let mut grid = GridStateStore::with_size(1, 1).unwrap();
        assert!(history.set_cursor(1, &mut grid).is_err());
        assert_eq!(history.current(), None);
        assert_eq!(history.label(), "0 / 0");
    }

    #[test]
    fn parked_cursor_has_no_current_frame() {
        let mut history = history_of(&[vec![1]]);
        history.park();
        assert_eq!(history.current(), None);
        assert_eq!(history.len(), 1);
    }
}
