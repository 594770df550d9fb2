// main.rs - Cell grid visualizer window, driven by a host over stdio
//
// The host writes one JSON message per line to our stdin and reads our
// messages from stdout. Logs go to stderr.

use anyhow::Context;
use eframe::egui;
use log::info;

mod ui;        // eframe::App impl: panels and canvas

use gridview::transport::{StdoutSink, spawn_stdin_reader};
use gridview::{HostBridge, InteractionController, RenderSurface, Session, ViewerConfig};

fn main() -> anyhow::Result<()> {
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting grid visualizer...");
    let config = ViewerConfig::load_or_default();
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the tokio runtime")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Cell Grid Visualizer",
        options,
        Box::new(move |_cc| Box::new(GridViewer::new(&config, runtime))),
    )
    .map_err(|e| anyhow::anyhow!("Window closed with an error: {e}"))
}

pub struct GridViewer {
    session: Session,
    bridge: HostBridge<StdoutSink>,
    surface: RenderSurface,
    controller: InteractionController,

    param_inputs: Vec<(String, String)>,  // Text currently shown in each parameter field
    frame_slider: usize,
    last_screen: Option<egui::Vec2>,
    last_dims: (usize, usize),

    runtime: Option<tokio::runtime::Runtime>,
}

impl GridViewer {
    pub fn new(config: &ViewerConfig, runtime: tokio::runtime::Runtime) -> Self {
        let session = Session::new(config);

        let mut bridge = HostBridge::new(StdoutSink);
        bridge.attach(spawn_stdin_reader(runtime.handle()));

        let last_dims = (session.grid().rows(), session.grid().cols());
        let mut viewer = Self {
            session,
            bridge,
            surface: RenderSurface::new(config),
            controller: InteractionController::new(),
            param_inputs: Vec::new(),
            frame_slider: 0,
            last_screen: None,
            last_dims,
            runtime: Some(runtime),
        };
        viewer.refresh_inputs();
        viewer
    }

    /// Re-reads every parameter field and the slider from the session.
    fn refresh_inputs(&mut self) {
        self.param_inputs = self
            .session
            .parameters()
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        self.frame_slider = self.session.history().cursor();
    }
}

impl Drop for GridViewer {
    fn drop(&mut self) {
        self.bridge.detach();
        self.controller.detach();
        self.surface.teardown();
        // The stdin reader blocks in a worker thread; don't wait for it.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
        info!("Grid visualizer closed");
    }
}
