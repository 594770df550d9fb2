// session.rs - Visualizer session: grid, history and parameters behind the UI and the host
//
// Inbound host messages arrive through the `InboundHandler` impl; user actions
// arrive through the public methods. Outbound messages are only produced by
// user actions and go to whatever `HostSink` the caller passes in.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::bridge::{HostSink, InboundHandler};
use crate::config::ViewerConfig;
use crate::error::{GridError, SessionError};
use crate::grid::{CellId, CellState, GridStateStore, StateSequence};
use crate::history::FrameHistory;
use crate::params::Parameters;
use crate::protocol::{ExportedParameter, OutboundMessage};

#[derive(Debug, Clone)]
pub struct Session {
    grid: GridStateStore,
    history: FrameHistory,
    params: Parameters,
    running: bool,
    pending_import: Option<StateSequence>,
}

impl Session {
    pub fn new(config: &ViewerConfig) -> Self {
        let params = Parameters::new(
            config.grid.default_rows as u32,
            config.grid.default_cols as u32,
            config.parameters,
        );
        let mut session = Self {
            grid: GridStateStore::new(),
            history: FrameHistory::new(),
            params,
            running: false,
            pending_import: None,
        };
        session.sync_dimensions();
        session
    }

    pub fn grid(&self) -> &GridStateStore {
        &self.grid
    }

    /// Direct grid access for the pointer layer.
    pub fn grid_mut(&mut self) -> &mut GridStateStore {
        &mut self.grid
    }

    pub fn history(&self) -> &FrameHistory {
        &self.history
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending_import(&self) -> Option<&StateSequence> {
        self.pending_import.as_ref()
    }

    pub fn toggle_cell(&mut self, id: &CellId) -> Result<CellState, GridError> {
        self.grid.toggle_cell(id)
    }

    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.grid.clear_grid();
        Ok(())
    }

    /// Moves the frame slider.
    pub fn set_frame(&mut self, n: usize) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.history.set_cursor(n, &mut self.grid)?;
        Ok(())
    }

    /// Applies text typed into a parameter field; `width`/`height` edits resize the grid.
    pub fn edit_parameter(&mut self, name: &str, raw: &str) -> Result<Option<u32>, SessionError> {
        self.ensure_idle()?;
        let stored = self.params.apply_input(name, raw);
        if stored.is_some() {
            self.sync_dimensions();
            self.settle_pending_import();
        }
        Ok(stored)
    }

    pub fn export(&self, sink: &mut impl HostSink) -> Result<(), SessionError> {
        self.ensure_idle()?;
        let parameters = self
            .params
            .iter()
            .map(|(name, value)| (name.to_string(), ExportedParameter::number(value)))
            .collect();
        sink.send_to_host(OutboundMessage::Export {
            table: self.grid.get_cell_states(),
            parameters,
        });
        Ok(())
    }

    pub fn request_import(&self, sink: &mut impl HostSink) -> Result<(), SessionError> {
        self.ensure_idle()?;
        sink.send_to_host(OutboundMessage::Import);
        Ok(())
    }

    /// Starts host-side simulation from the current grid; history restarts at this frame.
    pub fn play(&mut self, sink: &mut impl HostSink) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.running = true;

        let table = self.grid.get_cell_states();
        self.history.reset(table.clone());
        info!("Playing from {} cells", table.len());
        sink.send_to_host(OutboundMessage::PlaySimulation {
            parameters: self.params.to_map(),
            table,
        });
        Ok(())
    }

    pub fn pause(&mut self, sink: &mut impl HostSink) -> Result<(), SessionError> {
        if !self.running {
            return Err(SessionError::NotRunning);
        }
        self.running = false;
        info!("Paused after {} frames", self.history.len());
        sink.send_to_host(OutboundMessage::PauseSimulation);
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.running { Err(SessionError::Running) } else { Ok(()) }
    }

    // width maps to rows and height to cols.
    fn sync_dimensions(&mut self) {
        let rows = self.params.width() as usize;
        let cols = self.params.height() as usize;
        if rows == self.grid.rows() && cols == self.grid.cols() {
            return;
        }
        if let Err(e) = self.grid.create_grid(rows, cols) {
            debug!("Grid not resized: {}", e);
        }
    }

    fn settle_pending_import(&mut self) {
        let Some(table) = self.pending_import.take() else {
            return;
        };
        if table.is_empty() {
            return;
        }
        if table.len() != self.grid.cells().len() {
            debug!(
                "Import of {} cells waiting for a grid of that size (have {})",
                table.len(),
                self.grid.cells().len()
            );
            self.pending_import = Some(table);
            return;
        }

        match self.grid.update_cell_states(&table) {
            Ok(()) => {
                self.history.reset(table);
                info!("Imported {} cells", self.grid.cells().len());
            }
            Err(e) => warn!("Import rejected: {}", e),
        }
    }
}

impl InboundHandler for Session {
    fn on_update_table(&mut self, table: StateSequence) {
        self.history.append(table);
        // Cursor follows the newest frame, which applies it.
        let latest = self.history.len();
        if let Err(e) = self.history.set_cursor(latest, &mut self.grid) {
            debug!("Frame {} not applied: {}", latest, e);
        }
    }

    fn on_parameters(&mut self, parameters: BTreeMap<String, f64>) {
        self.params.merge(&parameters);
        self.sync_dimensions();
        self.settle_pending_import();
    }

    fn on_imported_data(&mut self, table: StateSequence, parameters: BTreeMap<String, f64>) {
        self.params.merge_known(&parameters);
        self.history.park();
        self.pending_import = Some(table);
        self.sync_dimensions();
        self.settle_pending_import();
    }
}
