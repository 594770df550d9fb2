// host_protocol.rs - End-to-end: host messages, painting and outbound actions

use egui::{pos2, vec2};
use gridview::{
    CellId, HostBridge, InteractionController, OutboundMessage, PointerEvent, RenderSurface,
    Session, ViewerConfig,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::mpsc;

struct Harness {
    session: Session,
    bridge: HostBridge<Vec<OutboundMessage>>,
    surface: RenderSurface,
    controller: InteractionController,
    host: mpsc::UnboundedSender<String>,
}

impl Harness {
    fn new() -> Self {
        let config = ViewerConfig::default();
        let (host, rx) = mpsc::unbounded_channel();
        let mut bridge = HostBridge::new(Vec::new());
        bridge.attach(rx);

        let session = Session::new(&config);
        let mut surface = RenderSurface::new(&config);
        surface.bootstrap(vec2(1280.0, 720.0), session.grid());
        surface.sync(session.grid());

        Self {
            session,
            bridge,
            surface,
            controller: InteractionController::new(),
            host,
        }
    }

    fn push(&mut self, message: serde_json::Value) {
        self.host.send(message.to_string()).unwrap();
        self.bridge.pump(&mut self.session);
        self.surface.sync(self.session.grid());
    }

    fn pointer(&mut self, event: PointerEvent) -> usize {
        let toggled = self.controller.handle(event, self.session.grid_mut(), &mut self.surface);
        self.surface.sync(self.session.grid());
        toggled
    }

    fn sent(&self) -> Vec<serde_json::Value> {
        self.bridge
            .sink()
            .iter()
            .map(|m| serde_json::to_value(m).unwrap())
            .collect()
    }
}

#[test_log::test]
fn imported_data_on_a_matching_grid() {
    let mut h = Harness::new();
    h.push(json!({ "action": "PARAMETERS", "data": { "parameters": { "width": 2, "height": 2 } } }));
    h.push(json!({
        "action": "IMPORTED_DATA",
        "data": { "table": [0, 1, 1, 0], "parameters": { "width": 2, "height": 2 } }
    }));

    assert_eq!(h.session.grid().get_cell_states(), vec![0, 1, 1, 0]);
    assert_eq!(h.session.history().frames(), [vec![0u8, 1, 1, 0]].as_slice());
    assert_eq!(h.session.history().cursor(), 1);

    let palette = *h.surface.palette();
    assert_eq!(h.surface.visual(&CellId::new(1, 0)).unwrap().fill, palette.alive);
    assert_eq!(h.surface.visual(&CellId::new(0, 0)).unwrap().fill, palette.dead);
}

#[test]
fn simulation_round_trip() {
    let mut h = Harness::new();
    h.push(json!({ "action": "PARAMETERS", "data": { "parameters": { "width": 2, "height": 2 } } }));

    h.pointer(PointerEvent::Down(CellId::new(1, 1)));
    h.pointer(PointerEvent::Up);
    assert_eq!(h.session.grid().get_cell_states(), vec![0, 0, 0, 1]);

    let mut outbox: Vec<OutboundMessage> = Vec::new();
    h.session.play(&mut outbox).unwrap();
    for message in outbox {
        h.bridge.send(message);
    }

    h.push(json!({ "action": "UPDATE_TABLE", "data": { "table": [1, 0, 0, 0] } }));
    h.push(json!({ "action": "UPDATE_TABLE", "data": { "table": [1, 1, 0, 0] } }));
    assert_eq!(h.session.history().len(), 3);
    assert_eq!(h.session.grid().get_cell_states(), vec![1, 1, 0, 0]);

    h.session.pause(h.bridge.sink_mut()).unwrap();
    h.session.set_frame(1).unwrap();
    assert_eq!(h.session.grid().get_cell_states(), vec![0, 0, 0, 1]);

    assert_eq!(
        h.sent(),
        vec![
            json!({
                "action": "PLAY_SIMULATION",
                "data": { "parameters": { "width": 2, "height": 2 }, "table": [0, 0, 0, 1] }
            }),
            json!({ "action": "PAUSE_SIMULATION" }),
        ]
    );
}

#[test]
fn drag_paint_over_the_surface() {
    let mut h = Harness::new();
    h.push(json!({ "action": "PARAMETERS", "data": { "parameters": { "width": 4, "height": 3 } } }));

    // Walk the pointer across world space in small steps, the way a toolkit
    // reports positions, and feed the resulting per-cell events through.
    let mut toggled = 0;
    let first = h.surface.hit_test(pos2(50.0, 50.0)).unwrap();
    toggled += h.pointer(PointerEvent::Down(first));
    for x in (50..=380).step_by(5) {
        let hit = h.surface.hit_test(pos2(x as f32, 50.0));
        for event in h.controller.track_hover(hit) {
            toggled += h.pointer(event);
        }
    }
    for x in (50..=380).rev().step_by(5) {
        let hit = h.surface.hit_test(pos2(x as f32, 50.0));
        for event in h.controller.track_hover(hit) {
            toggled += h.pointer(event);
        }
    }
    h.pointer(PointerEvent::Up);

    assert_eq!(toggled, 4);
    assert_eq!(h.session.grid().stats().alive_cells, 4);
    for row in 0..4 {
        assert!(h.session.grid().cell(&CellId::new(row, 0)).unwrap().state.is_alive());
    }
}

#[test]
fn export_and_import_requests() {
    let mut h = Harness::new();
    h.push(json!({
        "action": "IMPORTED_DATA",
        "data": { "table": [1, 0, 1, 0], "parameters": { "width": 2, "height": 2 } }
    }));

    h.session.export(h.bridge.sink_mut()).unwrap();
    h.session.request_import(h.bridge.sink_mut()).unwrap();

    assert_eq!(
        h.sent(),
        vec![
            json!({
                "action": "EXPORT",
                "data": {
                    "table": [1, 0, 1, 0],
                    "parameters": {
                        "width": { "value": 2, "type": "number" },
                        "height": { "value": 2, "type": "number" }
                    }
                }
            }),
            json!({ "action": "IMPORT" }),
        ]
    );
}

#[test]
fn malformed_messages_leave_state_alone() {
    let mut h = Harness::new();
    let before = h.session.grid().get_cell_states();
    let rebuilds = h.surface.rebuild_count();

    h.host.send("{\"action\":\"UPDATE_TABLE\"".to_string()).unwrap();
    h.host.send(json!({ "action": "EXPLODE", "data": {} }).to_string()).unwrap();
    h.bridge.pump(&mut h.session);
    h.surface.sync(h.session.grid());

    assert_eq!(h.session.grid().get_cell_states(), before);
    assert_eq!(h.surface.rebuild_count(), rebuilds);
    assert_eq!(h.bridge.rejected(), 2);
}
