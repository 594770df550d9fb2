// interaction.rs - Click-toggle and drag-paint over the render surface
//
// Idle --Down(cell)--> Dragging{touched}
// Dragging --Over(cell)--> toggles cell once per gesture
// Dragging --Up--> Idle
//
// Hover highlighting runs in both states and never touches cell state.

use std::collections::HashSet;

use log::{debug, trace};

use crate::grid::{CellId, GridStateStore};
use crate::surface::RenderSurface;
use crate::viewport::Plugin;

const PAINT_SUSPENDS: [Plugin; 3] = [Plugin::Drag, Plugin::Pinch, Plugin::Wheel];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down(CellId),
    Over(CellId),
    Out(CellId),
    /// Window-level release, wherever the pointer is.
    Up,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { touched: HashSet<CellId> },
}

#[derive(Debug, Default)]
pub struct InteractionController {
    state: DragState,
    hovered: Option<CellId>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn hovered(&self) -> Option<CellId> {
        self.hovered
    }

    /// Feeds one event through the state machine. Returns how many cells were toggled.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        grid: &mut GridStateStore,
        surface: &mut RenderSurface,
    ) -> usize {
        match event {
            PointerEvent::Down(id) => match &mut self.state {
                DragState::Idle => {
                    let mut touched = HashSet::new();
                    let toggled = paint(&id, &mut touched, grid);
                    self.state = DragState::Dragging { touched };
                    if let Some(viewport) = surface.viewport_mut() {
                        for plugin in PAINT_SUSPENDS {
                            viewport.pause(plugin);
                        }
                    }
                    debug!("Paint gesture started at {}", id);
                    toggled
                }
                // A second contact joins the gesture in progress.
                DragState::Dragging { touched } => paint(&id, touched, grid),
            },
            PointerEvent::Over(id) => {
                self.hovered = Some(id);
                surface.set_hover(&id, true);
                match &mut self.state {
                    DragState::Dragging { touched } => paint(&id, touched, grid),
                    DragState::Idle => 0,
                }
            }
            PointerEvent::Out(id) => {
                if self.hovered == Some(id) {
                    self.hovered = None;
                }
                surface.set_hover(&id, false);
                0
            }
            PointerEvent::Up => {
                if let DragState::Dragging { touched } = &self.state {
                    debug!("Paint gesture ended after {} cells", touched.len());
                    self.state = DragState::Idle;
                    if let Some(viewport) = surface.viewport_mut() {
                        for plugin in PAINT_SUSPENDS {
                            viewport.resume(plugin);
                        }
                    }
                }
                0
            }
        }
    }

    /// Turns a hit-test result into the `Out`/`Over` pair for a changed hover target.
    pub fn track_hover(&self, hit: Option<CellId>) -> Vec<PointerEvent> {
        if hit == self.hovered {
            return Vec::new();
        }
        self.hovered
            .map(PointerEvent::Out)
            .into_iter()
            .chain(hit.map(PointerEvent::Over))
            .collect()
    }

    /// Re-applies the hover highlight after the surface rebuilt its visuals.
    pub fn restore_hover(&self, surface: &mut RenderSurface) {
        if let Some(id) = self.hovered {
            surface.set_hover(&id, true);
        }
    }

    /// Drops any gesture in progress without touching the surface.
    pub fn detach(&mut self) {
        self.state = DragState::Idle;
        self.hovered = None;
    }
}

// Toggles `id` unless this gesture already touched it.
fn paint(id: &CellId, touched: &mut HashSet<CellId>, grid: &mut GridStateStore) -> usize {
    if !touched.insert(*id) {
        return 0;
    }
    match grid.toggle_cell(id) {
        Ok(state) => {
            trace!("Painted {} -> {:?}", id, state);
            1
        }
        Err(e) => {
            debug!("Paint skipped: {}", e);
            0
        }
    }
}
