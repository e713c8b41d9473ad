//! egui layer drawn on top of the sprite pass: scene labels, the UI shell and
//! the F3 debug window.
//!
//! egui needs a split render because `egui_wgpu::Renderer::render()` takes a
//! `RenderPass<'static>` while `begin_render_pass` borrows the encoder:
//!
//!   1. `prepare()` -- run UI logic, tessellate primitives
//!   2. `upload()`  -- upload textures and buffers (borrows the encoder)
//!   3. `paint()`   -- render into a pass created with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references

use crate::shell::{ShellActions, ShellView, UiShell};
use ow_core::time::TimeState;
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub draw_calls: u32,
    pub texture_binds: u32,
    pub quad_count: u32,
    pub texture_count: u32,
    /// Estimated GPU memory usage in megabytes
    pub memory_estimate_mb: f32,
    pub scene_label: String,
    pub player_position: Option<(f32, f32)>,
    pub facing: Option<String>,
    pub is_moving: bool,
    pub zoom: Option<f32>,
    pub terrain_label: Option<String>,
    pub wall_count: usize,
    pub contacts: usize,
}

/// Text placed by a scene, already converted to window points.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLabel {
    pub text: String,
    pub position: [f32; 2],
    pub size: f32,
    pub color: [u8; 4],
}

pub struct UiFrame<'a> {
    pub view: ShellView,
    pub labels: &'a [ScreenLabel],
    pub stats: Option<OverlayStats>,
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub shell: UiShell,
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            shell: UiShell::new(),
            visible: false,
        }
    }

    /// Returns true when egui wants the event for itself (e.g. a focused widget).
    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay: {}", if self.visible { "ON" } else { "OFF" });
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        time: &TimeState,
        frame: UiFrame<'_>,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        ShellActions,
    ) {
        let mut actions = ShellActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let shell = &mut self.shell;
        let visible = self.visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            paint_labels(ctx, frame.labels);
            actions = shell.show(ctx, &frame.view);
            if visible {
                debug_window(ctx, time, frame.stats.as_ref());
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn paint_labels(ctx: &egui::Context, labels: &[ScreenLabel]) {
    if labels.is_empty() {
        return;
    }
    let painter = ctx.layer_painter(egui::LayerId::background());
    for label in labels {
        let [r, g, b, a] = label.color;
        painter.text(
            egui::pos2(label.position[0], label.position[1]),
            egui::Align2::CENTER_CENTER,
            &label.text,
            egui::FontId::proportional(label.size),
            egui::Color32::from_rgba_unmultiplied(r, g, b, a),
        );
    }
}

fn debug_window(ctx: &egui::Context, time: &TimeState, stats: Option<&OverlayStats>) {
    egui::Window::new("Debug")
        .default_pos([10.0, 60.0])
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.1}", time.smoothed_fps));
            ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
            ui.label(format!("Steps this frame: {}", time.steps_this_frame));
            ui.label(format!("Total steps: {}", time.fixed_step_count));
            let Some(stats) = stats else {
                return;
            };

            ui.separator();
            ui.label(format!("Draw calls: {}", stats.draw_calls));
            ui.label(format!("Texture binds: {}", stats.texture_binds));
            ui.label(format!("Quads: {}", stats.quad_count));
            ui.label(format!(
                "Textures: {} ({:.1} MB)",
                stats.texture_count, stats.memory_estimate_mb
            ));

            ui.separator();
            ui.label(format!("Scene: {}", stats.scene_label));
            if let Some(terrain) = &stats.terrain_label {
                ui.label(format!("Terrain: {terrain} ({} walls)", stats.wall_count));
            }
            if let Some((x, y)) = stats.player_position {
                ui.label(format!("Player: ({x:.1}, {y:.1})"));
                ui.label(format!(
                    "Facing: {} {}",
                    stats.facing.as_deref().unwrap_or("-"),
                    if stats.is_moving { "(moving)" } else { "(idle)" }
                ));
                ui.label(format!("Touching walls: {}", stats.contacts));
            }
            if let Some(zoom) = stats.zoom {
                ui.label(format!("Zoom: {zoom:.2}x"));
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_debug_window_tessellate() {
        let ctx = egui::Context::default();
        let labels = vec![ScreenLabel {
            text: "Loading Game...".to_string(),
            position: [640.0, 320.0],
            size: 24.0,
            color: [255, 255, 255, 255],
        }];
        let stats = OverlayStats {
            scene_label: "World".to_string(),
            player_position: Some((640.0, 360.0)),
            zoom: Some(1.5),
            ..Default::default()
        };
        let time = TimeState::new();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            paint_labels(ctx, &labels);
            debug_window(ctx, &time, Some(&stats));
        });
        assert!(!output.shapes.is_empty());
    }
}
