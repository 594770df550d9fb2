// grid.rs - Cell grid state store for the visualizer

use std::fmt;
use std::str::FromStr;

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::error::GridError;

pub const DEFAULT_ROWS: usize = 10;                   // Grid created before any parameters arrive
pub const DEFAULT_COLS: usize = 10;

/// Flattened 0/1 states in canonical order (column-major outer, row-major inner).
pub type StateSequence = Vec<u8>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum CellState {
    #[default]
    Dead,
    Alive,
}

impl CellState {
    pub fn is_alive(self) -> bool {
        self == CellState::Alive
    }

    pub fn flipped(self) -> Self {
        match self {
            CellState::Dead => CellState::Alive,
            CellState::Alive => CellState::Dead,
        }
    }
}

// Hosts send plain integers; anything non-zero counts as alive.
impl From<u8> for CellState {
    fn from(value: u8) -> Self {
        if value == 0 { CellState::Dead } else { CellState::Alive }
    }
}

impl From<CellState> for u8 {
    fn from(state: CellState) -> Self {
        match state {
            CellState::Dead => 0,
            CellState::Alive => 1,
        }
    }
}

/// Composite `"{row}-{col}"` key, unique within a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    pub row: usize,
    pub col: usize,
}

impl CellId {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCellIdError(String);

impl fmt::Display for ParseCellIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a `row-col` cell id", self.0)
    }
}

impl std::error::Error for ParseCellIdError {}

impl FromStr for CellId {
    type Err = ParseCellIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCellIdError(s.to_string());
        let (row, col) = s.split_once('-').ok_or_else(err)?;
        Ok(CellId {
            row: row.parse().map_err(|_| err())?,
            col: col.parse().map_err(|_| err())?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub id: CellId,
    pub row: usize,
    pub col: usize,
    pub state: CellState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub total_cells: usize,
    pub alive_cells: usize,
}

/// Owns the rectangular cell grid and its derived statistics.
///
/// `epoch` changes every time the cell collection is replaced; renderers
/// compare it against the last value they saw to decide when to rebuild.
#[derive(Debug, Clone)]
pub struct GridStateStore {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    stats: Stats,
    epoch: u64,
}

impl Default for GridStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GridStateStore {
    /// An empty store; call [`create_grid`](Self::create_grid) to populate it.
    pub fn new() -> Self {
        Self {
            rows: 0,
            cols: 0,
            cells: Vec::new(),
            stats: Stats::default(),
            epoch: 0,
        }
    }

    pub fn with_size(rows: usize, cols: usize) -> Result<Self, GridError> {
        let mut store = Self::new();
        store.create_grid(rows, cols)?;
        Ok(store)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Position of `(row, col)` in canonical order.
    pub fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| col * self.rows + row)
    }

    pub fn cell(&self, id: &CellId) -> Option<&Cell> {
        self.index_of(id.row, id.col).map(|i| &self.cells[i])
    }

    /// Rebuilds the grid in canonical order with every cell dead.
    pub fn create_grid(&mut self, rows: usize, cols: usize) -> Result<(), GridError> {
        if rows == 0 || cols == 0 {
            warn!("Rejecting grid of {}x{}; keeping {}x{}", rows, cols, self.rows, self.cols);
            return Err(GridError::InvalidDimensions { rows, cols });
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for col in 0..cols {
            for row in 0..rows {
                cells.push(Cell {
                    id: CellId::new(row, col),
                    row,
                    col,
                    state: CellState::Dead,
                });
            }
        }

        self.rows = rows;
        self.cols = cols;
        self.cells = cells;
        self.stats = Stats { total_cells: rows * cols, alive_cells: 0 };
        self.bump();
        debug!("Created {}x{} grid", rows, cols);
        Ok(())
    }

    pub fn clear_grid(&mut self) {
        for cell in &mut self.cells {
            cell.state = CellState::Dead;
        }
        self.stats.alive_cells = 0;
        self.bump();
    }

    /// Removes every cell.
    pub fn empty_grid(&mut self) {
        self.rows = 0;
        self.cols = 0;
        self.cells.clear();
        self.stats = Stats::default();
        self.bump();
    }

    /// Flips one cell. The alive count is re-derived from the grid after the flip.
    pub fn toggle_cell(&mut self, id: &CellId) -> Result<CellState, GridError> {
        let index = self
            .index_of(id.row, id.col)
            .ok_or(GridError::UnknownCell(*id))?;

        let cell = &mut self.cells[index];
        cell.state = cell.state.flipped();
        let state = cell.state;

        self.recount();
        self.bump();
        Ok(state)
    }

    /// Id/state pairs in canonical order.
    pub fn get_all_states(&self) -> Vec<(CellId, CellState)> {
        self.cells.iter().map(|c| (c.id, c.state)).collect()
    }

    pub fn get_cell_states(&self) -> StateSequence {
        self.cells.iter().map(|c| u8::from(c.state)).collect()
    }

    /// Replaces every state from a same-length canonical sequence.
    pub fn update_cell_states(&mut self, new_states: &[u8]) -> Result<(), GridError> {
        debug!("Length cells: {} - new states: {}", self.cells.len(), new_states.len());
        if new_states.len() != self.cells.len() {
            error!(
                "New states length {} does not match the number of cells {}",
                new_states.len(),
                self.cells.len()
            );
            return Err(GridError::ShapeMismatch {
                expected: self.cells.len(),
                actual: new_states.len(),
            });
        }

        for (cell, &state) in self.cells.iter_mut().zip(new_states) {
            cell.state = CellState::from(state);
        }
        self.recount();
        self.bump();
        Ok(())
    }

    fn recount(&mut self) {
        self.stats.alive_cells = self.cells.iter().filter(|c| c.state.is_alive()).count();
    }

    fn bump(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> CellId {
        s.parse().unwrap()
    }

    fn alive_count(grid: &GridStateStore) -> usize {
        grid.cells().iter().filter(|c| c.state.is_alive()).count()
    }

    #[test]
    fn create_grid_sizes_and_resets() {
        for (rows, cols) in [(1, 1), (1, 100), (100, 1), (7, 13), (100, 100)] {
            let grid = GridStateStore::with_size(rows, cols).unwrap();
            assert_eq!(grid.cells().len(), rows * cols);
            assert!(grid.cells().iter().all(|c| c.state == CellState::Dead));
            assert_eq!(grid.stats(), Stats { total_cells: rows * cols, alive_cells: 0 });
        }
    }

    #[test]
    fn canonical_order_is_column_major_outer() {
        let grid = GridStateStore::with_size(2, 2).unwrap();
        let ids: Vec<String> = grid.cells().iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["0-0", "1-0", "0-1", "1-1"]);
        assert_eq!(grid.cells()[1].row, 1);
        assert_eq!(grid.cells()[1].col, 0);
        assert_eq!(grid.index_of(1, 1), Some(3));
        assert_eq!(grid.index_of(2, 0), None);
    }

    #[test]
    fn toggle_scenario_matches_flattened_states() {
        let mut grid = GridStateStore::with_size(2, 2).unwrap();
        grid.toggle_cell(&id("1-1")).unwrap();
        assert_eq!(grid.get_cell_states(), vec![0, 0, 0, 1]);
    }

    #[test]
    fn double_toggle_restores_state_and_count_tracks_grid() {
        let mut grid = GridStateStore::with_size(3, 4).unwrap();
        let target = id("2-3");

        assert_eq!(grid.toggle_cell(&target).unwrap(), CellState::Alive);
        assert_eq!(grid.stats().alive_cells, 1);
        assert_eq!(grid.stats().alive_cells, alive_count(&grid));

        grid.toggle_cell(&id("0-0")).unwrap();
        assert_eq!(grid.stats().alive_cells, 2);

        assert_eq!(grid.toggle_cell(&target).unwrap(), CellState::Dead);
        assert_eq!(grid.stats().alive_cells, 1);
        assert_eq!(grid.stats().alive_cells, alive_count(&grid));
        assert_eq!(grid.cell(&target).unwrap().state, CellState::Dead);
    }

    #[test]
    fn toggle_unknown_cell_is_rejected_without_change() {
        let mut grid = GridStateStore::with_size(2, 2).unwrap();
        let epoch = grid.epoch();
        assert_eq!(
            grid.toggle_cell(&id("5-0")),
            Err(GridError::UnknownCell(CellId::new(5, 0)))
        );
        assert_eq!(grid.epoch(), epoch);
        assert_eq!(grid.get_cell_states(), vec![0; 4]);
    }

    #[test]
    fn invalid_dimensions_keep_previous_grid() {
        let mut grid = GridStateStore::with_size(3, 3).unwrap();
        grid.toggle_cell(&id("1-1")).unwrap();

        assert!(grid.create_grid(0, 5).is_err());
        assert!(grid.create_grid(5, 0).is_err());
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.stats().alive_cells, 1);
    }

    #[test]
    fn clear_after_toggles_kills_everything() {
        let mut grid = GridStateStore::with_size(4, 4).unwrap();
        for s in ["0-0", "1-2", "3-3", "1-2", "2-1"] {
            grid.toggle_cell(&id(s)).unwrap();
        }
        let ids_before: Vec<CellId> = grid.cells().iter().map(|c| c.id).collect();

        grid.clear_grid();

        assert!(grid.cells().iter().all(|c| c.state == CellState::Dead));
        assert_eq!(grid.stats().alive_cells, 0);
        let ids_after: Vec<CellId> = grid.cells().iter().map(|c| c.id).collect();
        assert_eq!(ids_before, ids_after);
    }

    #[test]
    fn mismatched_update_leaves_grid_unchanged() {
        let mut grid = GridStateStore::with_size(2, 2).unwrap();
        grid.toggle_cell(&id("0-1")).unwrap();
        let before = grid.get_cell_states();
        let epoch = grid.epoch();

        let err = grid.update_cell_states(&[1, 1, 1]).unwrap_err();
        assert_eq!(err, GridError::ShapeMismatch { expected: 4, actual: 3 });
        assert_eq!(grid.get_cell_states(), before);
        assert_eq!(grid.cells().len(), 4);
        assert_eq!(grid.epoch(), epoch);
    }

    #[test]
    fn applying_own_states_is_idempotent() {
        let mut grid = GridStateStore::with_size(3, 2).unwrap();
        grid.toggle_cell(&id("2-0")).unwrap();
        grid.toggle_cell(&id("0-1")).unwrap();

        let snapshot = grid.get_cell_states();
        grid.update_cell_states(&snapshot).unwrap();
        assert_eq!(grid.get_cell_states(), snapshot);
        assert_eq!(grid.stats().alive_cells, 2);
    }

    #[test]
    fn snapshot_is_independent_of_later_mutation() {
        let mut grid = GridStateStore::with_size(2, 2).unwrap();
        let snapshot = grid.get_cell_states();
        grid.toggle_cell(&id("0-0")).unwrap();
        assert_eq!(snapshot, vec![0, 0, 0, 0]);
    }

    #[test]
    fn bulk_update_treats_nonzero_as_alive() {
        let mut grid = GridStateStore::with_size(2, 2).unwrap();
        grid.update_cell_states(&[0, 2, 1, 0]).unwrap();
        assert_eq!(grid.get_cell_states(), vec![0, 1, 1, 0]);
        assert_eq!(grid.stats().alive_cells, 2);
    }

    #[test]
    fn empty_grid_removes_cells() {
        let mut grid = GridStateStore::with_size(2, 3).unwrap();
        grid.empty_grid();
        assert!(grid.cells().is_empty());
        assert_eq!((grid.rows(), grid.cols()), (0, 0));
        assert_eq!(grid.stats(), Stats::default());
    }

    #[test]
    fn every_replacement_bumps_epoch() {
        let mut grid = GridStateStore::with_size(2, 2).unwrap();
        let mut last = grid.epoch();
        grid.toggle_cell(&id("0-0")).unwrap();
        assert_ne!(grid.epoch(), last);
        last = grid.epoch();
        grid.clear_grid();
        assert_ne!(grid.epoch(), last);
        last = grid.epoch();
        grid.update_cell_states(&[1, 1, 1, 1]).unwrap();
        assert_ne!(grid.epoch(), last);
    }

    #[test]
    fn get_all_states_pairs_ids_with_states() {
        let mut grid = GridStateStore::with_size(1, 2).unwrap();
        grid.toggle_cell(&id("0-1")).unwrap();
        assert_eq!(
            grid.get_all_states(),
            vec![
                (CellId::new(0, 0), CellState::Dead),
                (CellId::new(0, 1), CellState::Alive),
            ]
        );
    }

    #[test]
    fn cell_id_parsing() {
        assert_eq!("12-7".parse::<CellId>(), Ok(CellId::new(12, 7)));
        assert!("12".parse::<CellId>().is_err());
        assert!("a-1".parse::<CellId>().is_err());
        assert_eq!(CellId::new(3, 4).to_string(), "3-4");
    }
}
