// surface.rs - Render surface: one square visual per cell inside a pan/zoom viewport
//
// The surface is inert until `bootstrap` has run. Visuals live in an arena
// indexed by cell id and are rebuilt wholesale whenever the grid's epoch
// changes; there is no incremental diffing.

use std::collections::HashMap;

use egui::{Color32, Pos2, Rect, Vec2, pos2, vec2};
use log::{debug, info};

use crate::config::{LayoutConfig, PaletteConfig, ViewerConfig, ViewportConfig, rgb};
use crate::grid::{CellId, CellState, GridStateStore};
use crate::viewport::{Viewport, grid_centroid, world_bounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    /// Waiting for the windowing layer to hand over a drawable area.
    Pending,
    Ready,
    TornDown,
}

/// Two-color fill keyed by cell state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub alive: Color32,
    pub dead: Color32,
    pub background: Color32,
}

impl Palette {
    pub fn fill(&self, state: CellState) -> Color32 {
        match state {
            CellState::Alive => self.alive,
            CellState::Dead => self.dead,
        }
    }
}

impl From<&PaletteConfig> for Palette {
    fn from(config: &PaletteConfig) -> Self {
        Self {
            alive: rgb(config.alive),
            dead: rgb(config.dead),
            background: rgb(config.background),
        }
    }
}

/// Rendering primitive for one cell, in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellVisual {
    pub id: CellId,
    pub rect: Rect,
    pub fill: Color32,
    pub alpha: f32,
}

impl CellVisual {
    pub fn color(&self) -> Color32 {
        self.fill.gamma_multiply(self.alpha)
    }
}

pub struct RenderSurface {
    state: SurfaceState,
    layout: LayoutConfig,
    palette: Palette,
    viewport_config: ViewportConfig,
    hover_alpha: f32,
    viewport: Option<Viewport>,
    visuals: Vec<CellVisual>,
    index: HashMap<CellId, usize>,
    rows: usize,
    cols: usize,
    seen_epoch: Option<u64>,
    rebuilds: u64,
}

impl RenderSurface {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            state: SurfaceState::Pending,
            layout: config.layout,
            palette: Palette::from(&config.palette),
            viewport_config: config.viewport,
            hover_alpha: config.interaction.hover_alpha,
            viewport: None,
            visuals: Vec::new(),
            index: HashMap::new(),
            rows: 0,
            cols: 0,
            seen_epoch: None,
            rebuilds: 0,
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SurfaceState::Ready
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn viewport_mut(&mut self) -> Option<&mut Viewport> {
        self.viewport.as_mut()
    }

    pub fn visuals(&self) -> &[CellVisual] {
        &self.visuals
    }

    pub fn visual(&self, id: &CellId) -> Option<&CellVisual> {
        self.index.get(id).map(|&i| &self.visuals[i])
    }

    /// How many full rebuilds have run since bootstrap.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Opens the gate: builds the viewport for `screen` and centers it on the grid.
    /// Runs once; later calls are ignored.
    pub fn bootstrap(&mut self, screen: Vec2, grid: &GridStateStore) {
        if self.state != SurfaceState::Pending {
            return;
        }

        let pitch = self.layout.pitch();
        let mut viewport = Viewport::new(
            screen,
            world_bounds(grid.rows(), grid.cols(), pitch),
            &self.viewport_config,
        );
        viewport.clamp_zoom(self.viewport_config.min_zoom, self.viewport_config.max_zoom);
        viewport.set_zoom(self.viewport_config.initial_zoom);
        let center = grid_centroid(grid.rows(), grid.cols(), pitch);
        viewport.move_center(center.x, center.y);

        self.viewport = Some(viewport);
        self.state = SurfaceState::Ready;
        info!("Render surface ready ({}x{} px)", screen.x, screen.y);
    }

    /// Rebuilds if the grid's cell collection changed since the last sync.
    /// Returns true when a rebuild ran. Does nothing before bootstrap.
    pub fn sync(&mut self, grid: &GridStateStore) -> bool {
        if !self.is_ready() || self.seen_epoch == Some(grid.epoch()) {
            return false;
        }
        self.rebuild(grid);
        true
    }

    /// Destroys every visual and creates one per cell.
    pub fn rebuild(&mut self, grid: &GridStateStore) {
        if !self.is_ready() {
            return;
        }

        let destroyed = self.visuals.len();
        self.visuals.clear();
        self.index.clear();

        let pitch = self.layout.pitch();
        let size = vec2(self.layout.cell_size, self.layout.cell_size);
        self.visuals.reserve(grid.cells().len());
        for cell in grid.cells() {
            // Rows run along x and columns along y.
            let origin = pos2(cell.row as f32 * pitch, cell.col as f32 * pitch);
            self.index.insert(cell.id, self.visuals.len());
            self.visuals.push(CellVisual {
                id: cell.id,
                rect: Rect::from_min_size(origin, size),
                fill: self.palette.fill(cell.state),
                alpha: 1.0,
            });
        }

        self.rows = grid.rows();
        self.cols = grid.cols();
        self.seen_epoch = Some(grid.epoch());
        self.rebuilds += 1;
        debug!("Rebuilt surface: destroyed {}, created {}", destroyed, self.visuals.len());
    }

    /// Resizes the viewport and recenters on the grid centroid.
    pub fn resize(&mut self, screen: Vec2, grid: &GridStateStore) {
        let pitch = self.layout.pitch();
        let Some(viewport) = self.viewport.as_mut() else {
            return;
        };
        viewport.resize(screen, world_bounds(grid.rows(), grid.cols(), pitch));
        let center = grid_centroid(grid.rows(), grid.cols(), pitch);
        viewport.move_center(center.x, center.y);
    }

    /// Hover highlight; has no effect on cell state.
    pub fn set_hover(&mut self, id: &CellId, hovered: bool) {
        let alpha = if hovered { self.hover_alpha } else { 1.0 };
        if let Some(&i) = self.index.get(id) {
            self.visuals[i].alpha = alpha;
        }
    }

    /// The cell whose square contains `world`; gutters hit nothing.
    pub fn hit_test(&self, world: Pos2) -> Option<CellId> {
        if world.x < 0.0 || world.y < 0.0 {
            return None;
        }
        let pitch = self.layout.pitch();
        let row = (world.x / pitch).floor() as usize;
        let col = (world.y / pitch).floor() as usize;
        if row >= self.rows || col >= self.cols {
            return None;
        }

        let id = CellId::new(row, col);
        self.visual(&id)
            .filter(|visual| visual.rect.contains(world))
            .map(|visual| visual.id)
    }

    pub fn hit_test_screen(&self, screen: Pos2) -> Option<CellId> {
        let viewport = self.viewport.as_ref()?;
        self.hit_test(viewport.screen_to_world(screen))
    }

    /// Releases the viewport and every visual. The surface stays inert afterwards.
    pub fn teardown(&mut self) {
        if self.state == SurfaceState::TornDown {
            return;
        }
        self.visuals.clear();
        self.index.clear();
        self.viewport = None;
        self.seen_epoch = None;
        self.state = SurfaceState::TornDown;
        info!("Render surface torn down");
    }
}
