// lib.rs - Interactive cell-grid visualizer core
//
// Owns presentation and interaction state for a cell automaton whose rule runs
// in an external host. The host pushes generations in; the user paints,
// scrubs history and asks the host to play, pause, export or import.

pub mod bridge;       // Host message routing and the send capability
pub mod config;       // Viewer configuration
pub mod error;        // Error types
pub mod grid;         // Cell grid state store
pub mod history;      // Frame history and playback cursor
pub mod interaction;  // Click-toggle / drag-paint state machine
pub mod params;       // Simulation parameters
pub mod protocol;     // Wire messages
pub mod session;      // Grid + history + parameters behind the UI
pub mod surface;      // Cell visuals inside a pan/zoom viewport
pub mod transport;    // Stdio and channel transports
pub mod viewport;     // Pan/zoom camera

pub use bridge::{HostBridge, HostSink, InboundHandler};
pub use config::ViewerConfig;
pub use error::{ConfigError, GridError, ProtocolError, SessionError};
pub use grid::{Cell, CellId, CellState, GridStateStore, StateSequence, Stats};
pub use history::FrameHistory;
pub use interaction::{DragState, InteractionController, PointerEvent};
pub use params::Parameters;
pub use protocol::{InboundMessage, OutboundMessage};
pub use session::Session;
pub use surface::{CellVisual, Palette, RenderSurface, SurfaceState};
pub use viewport::{Plugin, Viewport};
