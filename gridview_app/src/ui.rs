// ui.rs - Parameter panel, player panel and the painted cell canvas

use std::time::Duration;

use eframe::egui;
use egui::{Pos2, Rect, Sense};
use log::debug;

use gridview::{PointerEvent, SessionError};

use crate::GridViewer;

const HOST_POLL: Duration = Duration::from_millis(50);  // Host messages arrive without user input

impl eframe::App for GridViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply host messages first so this frame draws their effect
        if self.bridge.pump(&mut self.session) > 0 {
            self.refresh_inputs();
        }

        self.parameter_panel(ctx);
        self.player_panel(ctx);

        let background = self.surface.palette().background;
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(background))
            .show(ctx, |ui| self.canvas(ui, ctx));

        ctx.request_repaint_after(HOST_POLL);
    }
}

impl GridViewer {
    fn parameter_panel(&mut self, ctx: &egui::Context) {
        let running = self.session.is_running();
        let mut edits = Vec::new();
        let mut clear = false;
        let mut export = false;
        let mut import = false;

        egui::SidePanel::right("parameters").min_width(220.0).show(ctx, |ui| {
            ui.heading("Parameters");
            ui.separator();

            ui.add_enabled_ui(!running, |ui| {
                for (name, text) in &mut self.param_inputs {
                    ui.horizontal(|ui| {
                        ui.label(capitalize(name));
                        if ui.text_edit_singleline(text).changed() {
                            edits.push((name.clone(), text.clone()));
                        }
                    });
                }

                ui.separator();

                clear = ui.button("⏹ Clear").clicked();
                ui.horizontal(|ui| {
                    export = ui.button("Export Data").clicked();
                    import = ui.button("Import Data").clicked();
                });
            });

            ui.separator();

            let stats = self.session.grid().stats();
            ui.label(format!("Live cells: {}", stats.alive_cells));
            ui.label(format!("Dead cells: {}", stats.total_cells - stats.alive_cells));
            if stats.total_cells > 0 {
                ui.label(format!(
                    "Population: {:.1}%",
                    stats.alive_cells as f32 / stats.total_cells as f32 * 100.0
                ));
            }
        });

        for (name, text) in edits {
            match self.session.edit_parameter(&name, &text) {
                // Show the sanitised value, or roll back text that wasn't a number
                Ok(_) => self.refresh_inputs(),
                Err(e) => debug!("Edit of {} ignored: {}", name, e),
            }
        }
        if clear {
            report(self.session.clear());
        }
        if export {
            report(self.session.export(self.bridge.sink_mut()));
        }
        if import {
            report(self.session.request_import(self.bridge.sink_mut()));
        }
    }

    fn player_panel(&mut self, ctx: &egui::Context) {
        let running = self.session.is_running();
        let frames = self.session.history().len();
        let mut play = false;
        let mut pause = false;
        let mut scrub = None;

        egui::TopBottomPanel::bottom("player").show(ctx, |ui| {
            ui.horizontal(|ui| {
                play = ui.add_enabled(!running, egui::Button::new("▶ Play")).clicked();
                pause = ui.add_enabled(running, egui::Button::new("⏸ Pause")).clicked();

                ui.separator();

                ui.label("Frames");
                if frames > 0 {
                    let slider = egui::Slider::new(&mut self.frame_slider, 1..=frames);
                    if ui.add_enabled(!running, slider).changed() {
                        scrub = Some(self.frame_slider);
                    }
                }
                ui.label(self.session.history().label());
            });
        });

        if play {
            report(self.session.play(self.bridge.sink_mut()));
            self.refresh_inputs();
        }
        if pause {
            report(self.session.pause(self.bridge.sink_mut()));
        }
        if let Some(n) = scrub {
            report(self.session.set_frame(n));
            self.frame_slider = self.session.history().cursor();
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let area = response.rect;

        // One-time bootstrap: the surface needs a drawable area before any cell visuals exist
        if !self.surface.is_ready() {
            self.surface.bootstrap(area.size(), self.session.grid());
        }

        let dims = (self.session.grid().rows(), self.session.grid().cols());
        if self.last_screen != Some(area.size()) || self.last_dims != dims {
            self.surface.resize(area.size(), self.session.grid());
            self.last_screen = Some(area.size());
            self.last_dims = dims;
        }
        if self.surface.sync(self.session.grid()) {
            self.controller.restore_hover(&mut self.surface);
        }

        self.handle_pointer(ui, &response, area);

        if self.surface.sync(self.session.grid()) {
            self.controller.restore_hover(&mut self.surface);
        }

        let moving = self
            .surface
            .viewport_mut()
            .map(|vp| vp.update(ui.input(|i| i.stable_dt) * 1000.0))
            .unwrap_or(false);
        if moving {
            ctx.request_repaint();
        }

        // Fill background
        painter.rect_filled(area, 0.0, self.surface.palette().background);

        let Some(viewport) = self.surface.viewport() else {
            return;
        };
        let scale = viewport.scale();
        for visual in self.surface.visuals() {
            let min = area.min + viewport.world_to_screen(visual.rect.min).to_vec2();
            let rect = Rect::from_min_size(min, visual.rect.size() * scale);
            if !area.intersects(rect) {
                continue;
            }
            painter.rect_filled(rect, 0.0, visual.color());
        }
    }

    fn handle_pointer(&mut self, ui: &egui::Ui, response: &egui::Response, area: Rect) {
        let (hover, pressed, released, scroll, zoom, velocity) = ui.input(|i| {
            (
                i.pointer.hover_pos(),
                i.pointer.primary_pressed(),
                i.pointer.any_released(),
                i.scroll_delta.y,
                i.zoom_delta(),
                i.pointer.velocity(),
            )
        });

        let local = canvas_local(hover, area);
        let hit = local.and_then(|p| self.surface.hit_test_screen(p));

        for event in self.controller.track_hover(hit) {
            self.pointer(event);
        }
        if pressed {
            if let Some(id) = hit {
                self.pointer(PointerEvent::Down(id));
            }
        }

        if let Some(viewport) = self.surface.viewport_mut() {
            if response.dragged() && !self.controller.is_dragging() {
                viewport.drag(response.drag_delta());
            }
            if let Some(anchor) = local {
                if scroll != 0.0 {
                    viewport.wheel(scroll, anchor);
                }
                if zoom != 1.0 {
                    viewport.pinch(zoom, anchor);
                }
            }
        }

        // Release anywhere in the window ends a paint gesture
        if released {
            if self.controller.is_dragging() {
                self.pointer(PointerEvent::Up);
            } else if response.drag_released() {
                if let Some(viewport) = self.surface.viewport_mut() {
                    viewport.release(velocity / 1000.0);
                }
            }
        }
    }

    fn pointer(&mut self, event: PointerEvent) {
        self.controller.handle(event, self.session.grid_mut(), &mut self.surface);
    }
}

/// Pointer position relative to the canvas origin, if it is over the canvas.
fn canvas_local(pointer: Option<Pos2>, area: Rect) -> Option<Pos2> {
    pointer
        .filter(|p| area.contains(*p))
        .map(|p| Pos2::ZERO + (p - area.min))
}

fn report<T>(result: Result<T, SessionError>) {
    if let Err(e) = result {
        debug!("Action ignored: {}", e);
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Vec2, pos2};

    #[test]
    fn capitalizes_field_labels() {
        assert_eq!(capitalize("width"), "Width");
        assert_eq!(capitalize("gridLineWidth"), "GridLineWidth");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn pointer_is_made_canvas_local() {
        let area = Rect::from_min_size(pos2(30.0, 40.0), Vec2::splat(100.0));
        assert_eq!(canvas_local(Some(pos2(35.0, 50.0)), area), Some(pos2(5.0, 10.0)));
        assert_eq!(canvas_local(Some(pos2(30.0, 40.0)), area), Some(Pos2::ZERO));
    }

    #[test]
    fn pointer_off_canvas_is_ignored() {
        let area = Rect::from_min_size(pos2(30.0, 40.0), Vec2::splat(100.0));
        assert_eq!(canvas_local(Some(pos2(10.0, 50.0)), area), None);
        assert_eq!(canvas_local(Some(pos2(35.0, 200.0)), area), None);
        assert_eq!(canvas_local(None, area), None);
    }
}
