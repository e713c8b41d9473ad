//! Overworld demo: main loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. Simulation runs inside
//! `RedrawRequested` on a fixed timestep (see `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- global keys, then one scene update per slice
//!   3. Draw the active scene into a `Canvas`, batch it into one sprite mesh
//!   4. Upload camera uniform, issue draw calls, composite the egui layer
//!
//! Until the player starts the adventure no scene exists; the start screen is
//! pure egui. Starting mounts a `SceneSequencer` at Boot, leaving drops it.

mod assets;
mod audio;
mod batch;
mod camera_rig;
mod canvas;
mod collision;
mod config;
mod movement;
#[cfg(test)]
mod replay;
mod scenes;
mod session;
mod terrain;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use glam::Vec2;
use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use assets::{AssetKind, AssetStore};
use audio::{AudioSystem, SoundCue};
use batch::{build_mesh, count_texture_binds, view_for, world_to_screen, DrawCall};
use canvas::{circle_rgba, to_srgba8, Canvas, CIRCLE_TEXTURE, WHITE_TEXTURE};
use config::{load_config_or_default, GameConfig};
use ow_core::input::{InputState, Key};
use ow_core::time::TimeState;
use ow_devtools::{DebugOverlay, HudStats, OverlayStats, ScreenLabel, ShellView, UiFrame};
use ow_platform::window::PlatformConfig;
use ow_render::{Camera2D, GpuContext, GpuError, SpritePipeline, SpriteVertex, Texture};
use scenes::{SceneContext, SceneId, SceneSequencer};
use session::AppState;

const CONFIG_PATH: &str = "assets/config/game.json";
const CIRCLE_TEXTURE_SIZE: u32 = 64;
const START_SCREEN_COLOR: u32 = 0x181820;

struct GpuSpriteTexture {
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// All mutable engine state. Constructed lazily in `ApplicationHandler::resumed`
/// once the window and GPU surface are available.
///
///  - **Core systems** (time, input, camera, audio) -- updated every frame
///  - **Game** (app state, assets, scene sequencer) -- owned here, lent to scenes
///  - **GPU resources** (textures, buffers, draw calls) -- rebuilt from the canvas
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    camera: Camera2D,
    sprite_pipeline: SpritePipeline,
    overlay: DebugOverlay,
    audio: AudioSystem,

    // --- Game ----------------------------------------------------------------
    config: GameConfig,
    app: AppState,
    assets: AssetStore,
    sequencer: Option<SceneSequencer>,
    sounds: Vec<SoundCue>,
    canvas: Canvas,

    // --- GPU resources -------------------------------------------------------
    textures: HashMap<Arc<str>, GpuSpriteTexture>,
    undecodable_textures: HashSet<String>,
    reported_missing: HashSet<String>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
    draw_calls: Vec<DrawCall>,
    quad_count: usize,
}

impl EngineState {
    fn new(window: Arc<Window>, config: GameConfig) -> Result<Self, GpuError> {
        let gpu = GpuContext::new(window.clone(), config.window.vsync)?;
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);
        let camera = Camera2D::new(gpu.size.0, gpu.size.1);

        let camera_uniform = camera.build_uniform();
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let vertex_buffer = create_vertex_buffer(&gpu.device, 1);
        let index_buffer = create_index_buffer(&gpu.device, 1);

        let mut state = Self {
            window,
            gpu,
            time: TimeState::new(),
            input: InputState::new(),
            camera,
            sprite_pipeline,
            overlay,
            audio: AudioSystem::new(),
            config,
            app: AppState::new(),
            assets: AssetStore::new(),
            sequencer: None,
            sounds: Vec::new(),
            canvas: Canvas::new(),
            textures: HashMap::new(),
            undecodable_textures: HashSet::new(),
            reported_missing: HashSet::new(),
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            mesh_vertex_capacity: 0,
            mesh_index_capacity: 0,
            draw_calls: Vec::new(),
            quad_count: 0,
        };

        state.insert_generated_texture(WHITE_TEXTURE, &[255, 255, 255, 255], 1);
        state.insert_generated_texture(
            CIRCLE_TEXTURE,
            &circle_rgba(CIRCLE_TEXTURE_SIZE),
            CIRCLE_TEXTURE_SIZE,
        );
        state.ensure_mesh_capacity(4, 6);
        Ok(state)
    }

    fn start_game(&mut self) {
        if self.sequencer.is_some() {
            return;
        }
        log::info!("Starting adventure");
        let mut ctx = SceneContext {
            app: &mut self.app,
            input: &self.input,
            assets: &mut self.assets,
            config: &self.config,
            sounds: &mut self.sounds,
        };
        self.sequencer = Some(SceneSequencer::new(&mut ctx));
    }

    fn leave_game(&mut self) {
        let Some(mut sequencer) = self.sequencer.take() else {
            return;
        };
        log::info!("Leaving the world");
        sequencer.shutdown();
        self.sounds.clear();
        self.audio.stop_music();
    }

    fn toggle_mute(&mut self) {
        let muted = self.app.audio.toggle_mute();
        self.audio.set_muted(muted);
    }

    /// One fixed simulation step. Returns false when the app should exit.
    fn step(&mut self, dt: f32) -> bool {
        if self.input.is_just_pressed(Key::Escape) {
            if self.sequencer.is_none() {
                return false;
            }
            self.leave_game();
        }
        if self.input.is_just_pressed(Key::Enter) {
            self.start_game();
        }
        if self.input.is_just_pressed(Key::M) {
            self.toggle_mute();
        }
        if self.input.is_just_pressed(Key::F1) {
            self.overlay.shell.toggle_controls();
        }
        if self.input.is_just_pressed(Key::F3) {
            self.overlay.toggle();
        }

        if let Some(sequencer) = self.sequencer.as_mut() {
            let mut ctx = SceneContext {
                app: &mut self.app,
                input: &self.input,
                assets: &mut self.assets,
                config: &self.config,
                sounds: &mut self.sounds,
            };
            sequencer.update(dt, &mut ctx);
        }
        true
    }

    fn shell_view(&self) -> ShellView {
        match self.sequencer.as_ref().and_then(SceneSequencer::active_id) {
            None => ShellView::StartScreen,
            Some(SceneId::World) => ShellView::InGame(HudStats {
                health: self.app.session.health(),
                max_health: self.app.session.max_health(),
                score: self.app.session.score(),
                muted: self.app.audio.muted,
            }),
            Some(_) => ShellView::Hidden,
        }
    }

    fn insert_generated_texture(&mut self, key: &str, rgba: &[u8], size: u32) {
        let uploaded =
            Texture::from_rgba8(&self.gpu.device, &self.gpu.queue, rgba, size, size, key);
        let texture = match uploaded {
            Ok(texture) => texture,
            Err(err) => {
                log::error!("{err}");
                return;
            }
        };
        let bind_group = self
            .sprite_pipeline
            .create_texture_bind_group(&self.gpu.device, &texture);
        self.textures.insert(
            Arc::from(key),
            GpuSpriteTexture {
                texture,
                bind_group,
            },
        );
    }

    /// Upload every loaded image asset that has no GPU texture yet.
    fn ensure_textures_for_assets(&mut self) {
        let pending: Vec<String> = self
            .assets
            .keys_of(AssetKind::Image)
            .filter(|key| !self.textures.contains_key(*key))
            .filter(|key| !self.undecodable_textures.contains(*key))
            .map(str::to_string)
            .collect();

        for key in pending {
            let Some(bytes) = self.assets.bytes(&key) else {
                continue;
            };
            match Texture::from_bytes(&self.gpu.device, &self.gpu.queue, bytes, &key) {
                Ok(texture) => {
                    let bind_group = self
                        .sprite_pipeline
                        .create_texture_bind_group(&self.gpu.device, &texture);
                    log::debug!(
                        "Uploaded texture '{key}' ({}x{})",
                        texture.size.0,
                        texture.size.1
                    );
                    self.textures.insert(
                        Arc::from(key.as_str()),
                        GpuSpriteTexture {
                            texture,
                            bind_group,
                        },
                    );
                }
                Err(err) => {
                    log::warn!("{err}");
                    self.undecodable_textures.insert(key);
                }
            }
        }
    }

    fn estimate_memory_mb(&self) -> f32 {
        let mut bytes: usize = 0;
        for tex in self.textures.values() {
            let (w, h) = tex.texture.size;
            bytes += (w as usize) * (h as usize) * 4;
        }
        bytes += self.mesh_vertex_capacity * std::mem::size_of::<SpriteVertex>();
        bytes += self.mesh_index_capacity * std::mem::size_of::<u32>();
        bytes as f32 / (1024.0 * 1024.0)
    }

    /// Draw the active scene (or the start screen backdrop) and stream the
    /// resulting mesh into the GPU buffers.
    fn rebuild_frame(&mut self) {
        match &self.sequencer {
            Some(sequencer) => sequencer.draw(&mut self.canvas),
            None => self.canvas.clear(START_SCREEN_COLOR),
        }
        self.ensure_textures_for_assets();

        let mesh = build_mesh(&self.canvas, |key| self.textures.contains_key(key));
        for key in &mesh.missing {
            if self.reported_missing.insert(key.clone()) {
                log::warn!("Skipping quads with unknown texture '{key}'");
            }
        }
        self.ensure_mesh_capacity(mesh.vertices.len(), mesh.indices.len());
        self.quad_count = mesh.quad_count();
        if !mesh.vertices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&mesh.vertices));
        }
        if !mesh.indices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&mesh.indices));
        }
        self.draw_calls = mesh.draw_calls;

        let (center, zoom) = view_for(&self.canvas, self.camera.viewport);
        self.camera.position = Vec2::new(center.0, center.1);
        self.camera.zoom = zoom;
    }

    fn screen_labels(&self) -> Vec<ScreenLabel> {
        let pixels_per_point = self.window.scale_factor() as f32;
        let center = (self.camera.position.x, self.camera.position.y);
        self.canvas
            .labels
            .iter()
            .map(|label| {
                let (x, y) = world_to_screen(
                    label.position,
                    center,
                    self.camera.zoom,
                    self.camera.viewport,
                );
                ScreenLabel {
                    text: label.text.clone(),
                    position: [x / pixels_per_point, y / pixels_per_point],
                    size: label.size * self.camera.zoom / pixels_per_point,
                    color: to_srgba8(label.color),
                }
            })
            .collect()
    }

    fn overlay_stats(&self) -> OverlayStats {
        let info = self
            .sequencer
            .as_ref()
            .and_then(SceneSequencer::debug_info)
            .unwrap_or_default();
        let scene_label = self
            .sequencer
            .as_ref()
            .and_then(SceneSequencer::active_id)
            .map_or_else(|| "Start screen".to_string(), |id| id.to_string());
        OverlayStats {
            draw_calls: self.draw_calls.len() as u32,
            texture_binds: count_texture_binds(&self.draw_calls) as u32,
            quad_count: self.quad_count as u32,
            texture_count: self.textures.len() as u32,
            memory_estimate_mb: self.estimate_memory_mb(),
            scene_label,
            player_position: info.player_position,
            facing: info.facing,
            is_moving: info.is_moving,
            zoom: info.zoom,
            terrain_label: info.terrain,
            wall_count: info.wall_count,
            contacts: info.contacts,
        }
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }

    fn render(&mut self) {
        let camera_uniform = self.camera.build_uniform();
        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera_uniform]),
        );

        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let labels = self.screen_labels();
        let frame = UiFrame {
            view: self.shell_view(),
            labels: &labels,
            stats: self.overlay.visible.then(|| self.overlay_stats()),
        };
        let (egui_primitives, egui_textures_delta, actions) =
            self.overlay.prepare(&self.window, &self.time, frame);
        if actions.start_game {
            self.start_game();
        }
        if actions.toggle_mute {
            self.toggle_mute();
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b, a] = self.canvas.clear_color;
            let clear_color = wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            };
            let mut last_bound_texture_key: Option<&Arc<str>> = None;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            render_pass.set_pipeline(&self.sprite_pipeline.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

            for draw in &self.draw_calls {
                if let Some(texture) = self.textures.get(&draw.texture_key) {
                    let need_rebind = match last_bound_texture_key {
                        Some(last) => **last != *draw.texture_key,
                        None => true,
                    };
                    if need_rebind {
                        render_pass.set_bind_group(1, &texture.bind_group, &[]);
                        last_bound_texture_key = Some(&draw.texture_key);
                    }
                    render_pass.draw_indexed(
                        draw.index_start..(draw.index_start + draw.index_count),
                        0,
                        0..1,
                    );
                }
            }
        }

        self.overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

struct App {
    platform: PlatformConfig,
    config: GameConfig,
    state: Option<EngineState>,
}

impl App {
    fn new(config: GameConfig) -> Self {
        Self {
            platform: PlatformConfig {
                title: config.window.title.clone(),
                width: config.window.width,
                height: config.window.height,
                vsync: config.window.vsync,
            },
            config,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = match ow_platform::window::create_window(event_loop, &self.platform) {
            Ok(window) => window,
            Err(err) => {
                log::error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };
        log::info!(
            "Window created: {}x{}",
            self.platform.width,
            self.platform.height
        );
        match EngineState::new(window, self.config.clone()) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("GPU initialisation failed: {err}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state.overlay.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                state.leave_game();
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    state.camera.viewport = (w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::Focused(false) => {
                // Key-up events are not delivered while unfocused.
                state.input.release_all();
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(game_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(game_key),
                            ElementState::Released => state.input.key_up(game_key),
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                state.time.begin_frame();
                let dt = state.time.fixed_dt as f32;
                while state.time.should_step() {
                    if !state.step(dt) {
                        state.leave_game();
                        event_loop.exit();
                        return;
                    }
                    // Edges are consumed by exactly one step.
                    state.input.end_frame();
                }

                let muted = state.app.audio.muted;
                state.audio.drain(&mut state.sounds, &state.assets, muted);

                state.rebuild_frame();
                state.render();
            }

            _ => {}
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyZ => Some(Key::Z),
        KeyCode::KeyX => Some(Key::X),
        KeyCode::KeyM => Some(Key::M),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(Key::Enter),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F1 => Some(Key::F1),
        KeyCode::F3 => Some(Key::F3),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Overworld demo starting...");
    let config = load_config_or_default(Path::new(CONFIG_PATH));

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {err}");
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {err}");
        std::process::exit(1);
    }
}
