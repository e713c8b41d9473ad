//! The playable overworld: terrain, the player and the follow camera.
//!
//! Setup is a list of independent steps. A failing step is logged and the
//! scene keeps whatever the other steps produced; `update` and `draw` cope
//! with any part being absent.

use std::io::Cursor;

use ow_core::input::Key;
use thiserror::Error;

use super::{Scene, SceneCommand, SceneContext, SceneDebugInfo, SceneId};
use crate::assets::AssetKind;
use crate::audio::SoundCue;
use crate::camera_rig::CameraRig;
use crate::canvas::{rgb_hex, Canvas};
use crate::collision::ContactTracker;
use crate::movement::{Direction, MoveInput, MovementConfig, Player};
use crate::terrain::{Shape, Terrain, TerrainKind, TerrainSource};

pub const HERO_KEY: &str = "hero";
const PLACEHOLDER_COLOR: u32 = 0xFFC107;
const FALLBACK_BACKGROUND: u32 = 0x4CAF50;

#[derive(Debug, Error)]
pub enum WorldSetupError {
    #[error("player needs terrain, but terrain was not built")]
    NoTerrain,
    #[error("camera needs a player, but the player was not created")]
    NoPlayer,
    #[error("hero image is unreadable: {0}")]
    HeroImage(#[from] image::ImageError),
    #[error("sound '{0}' is not loaded")]
    MissingSound(&'static str),
}

#[derive(Debug, Default)]
pub struct WorldScene {
    terrain: Option<Terrain>,
    player: Option<Player>,
    camera: Option<CameraRig>,
    contacts: ContactTracker,
    hero_textured: bool,
    facing_left: bool,
}

impl WorldScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset_session(&mut self, ctx: &mut SceneContext) -> Result<(), WorldSetupError> {
        ctx.app.session.reset();
        Ok(())
    }

    fn build_terrain(&mut self, ctx: &mut SceneContext) -> Result<(), WorldSetupError> {
        let source = TerrainSource::select(&ctx.config.terrain, ctx.assets);
        self.terrain = Some(source.build(ctx.assets));
        Ok(())
    }

    fn create_player(&mut self, ctx: &mut SceneContext) -> Result<(), WorldSetupError> {
        let terrain = self.terrain.as_ref().ok_or(WorldSetupError::NoTerrain)?;

        // Size the player from the hero image; fall back to a placeholder box.
        let hero_size = match hero_dimensions(ctx) {
            Ok(size) => size,
            Err(err) => {
                log::warn!("{err}. Using placeholder player.");
                None
            }
        };
        self.hero_textured = hero_size.is_some();
        let config = MovementConfig::from_player(&ctx.config.player, hero_size);
        let player = Player::new(terrain.spawn, config, terrain.bounds);
        log::info!("Player created at {:?}", player.position());
        self.player = Some(player);
        Ok(())
    }

    fn setup_camera(&mut self, ctx: &mut SceneContext) -> Result<(), WorldSetupError> {
        let player = self.player.as_ref().ok_or(WorldSetupError::NoPlayer)?;
        self.camera = Some(CameraRig::new(ctx.config.camera, player.position()));
        Ok(())
    }

    fn queue_sounds(&mut self, ctx: &mut SceneContext) -> Result<(), WorldSetupError> {
        let mut missing = None;
        for cue in [SoundCue::BackgroundMusic, SoundCue::Success] {
            if ctx.assets.has(cue.asset_key(), AssetKind::Audio) {
                ctx.sounds.push(cue);
            } else {
                missing.get_or_insert(cue.asset_key());
            }
        }
        match missing {
            Some(key) => Err(WorldSetupError::MissingSound(key)),
            None => Ok(()),
        }
    }

    fn handle_zoom(&mut self, ctx: &SceneContext) {
        let Some(camera) = self.camera.as_mut() else {
            return;
        };
        if ctx.input.is_just_pressed(Key::Z) {
            camera.zoom_in();
        }
        if ctx.input.is_just_pressed(Key::X) {
            camera.zoom_out();
        }
    }
}

fn hero_dimensions(ctx: &SceneContext) -> Result<Option<(f32, f32)>, WorldSetupError> {
    if !ctx.assets.has(HERO_KEY, AssetKind::Image) {
        return Ok(None);
    }
    let Some(bytes) = ctx.assets.bytes(HERO_KEY) else {
        return Ok(None);
    };
    let (w, h) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .into_dimensions()?;
    Ok(Some((w as f32, h as f32)))
}

impl Scene for WorldScene {
    fn id(&self) -> SceneId {
        SceneId::World
    }

    fn init(&mut self, ctx: &mut SceneContext) {
        type Step = fn(&mut WorldScene, &mut SceneContext) -> Result<(), WorldSetupError>;
        let steps: [(&str, Step); 5] = [
            ("reset session", Self::reset_session),
            ("build terrain", Self::build_terrain),
            ("create player", Self::create_player),
            ("setup camera", Self::setup_camera),
            ("queue sounds", Self::queue_sounds),
        ];
        for (name, step) in steps {
            if let Err(err) = step(self, ctx) {
                log::error!("World setup step '{name}' failed: {err}");
            }
        }
        log::info!("World scene ready");
    }

    fn update(&mut self, dt: f32, ctx: &mut SceneContext) -> SceneCommand {
        self.handle_zoom(ctx);

        let (Some(player), Some(terrain)) = (self.player.as_mut(), self.terrain.as_ref()) else {
            return SceneCommand::None;
        };
        let input = MoveInput::from_input(ctx.input);
        let result = player.step(input, dt, &terrain.walls, terrain.bounds);
        for body in self.contacts.update(&result.hit_bodies) {
            log::debug!("Player hit wall #{body}");
            ctx.sounds.push(SoundCue::Hit);
        }

        match player.state.direction {
            Direction::Left if player.state.is_moving => self.facing_left = true,
            Direction::Right if player.state.is_moving => self.facing_left = false,
            _ => {}
        }
        let position = player.position();
        if let Some(camera) = self.camera.as_mut() {
            camera.follow(position);
        }
        SceneCommand::None
    }

    fn draw(&self, canvas: &mut Canvas) {
        let background = self
            .terrain
            .as_ref()
            .map_or(FALLBACK_BACKGROUND, |terrain| terrain.background);
        canvas.clear(background);
        if let Some(camera) = &self.camera {
            canvas.set_camera(camera.position, camera.zoom);
        }

        if let Some(terrain) = &self.terrain {
            for tile in &terrain.tiles {
                canvas.sprite(
                    &tile.texture,
                    (tile.x + tile.width * 0.5, tile.y + tile.height * 0.5),
                    (tile.width, tile.height),
                    tile.uv,
                    false,
                );
            }
            for shape in &terrain.shapes {
                match *shape {
                    Shape::Rect {
                        x,
                        y,
                        width,
                        height,
                        color,
                    } => canvas.rect(x, y, width, height, rgb_hex(color)),
                    Shape::Circle {
                        x,
                        y,
                        radius,
                        color,
                    } => canvas.circle(x, y, radius, rgb_hex(color)),
                }
            }
            if let Some(color) = terrain.wall_color {
                let color = rgb_hex(color);
                for wall in terrain.walls.iter() {
                    canvas.rect(
                        wall.left(),
                        wall.top(),
                        wall.half_w * 2.0,
                        wall.half_h * 2.0,
                        color,
                    );
                }
            }
        }

        if let Some(player) = &self.player {
            let size = (player.aabb.half_w * 2.0, player.aabb.half_h * 2.0);
            if self.hero_textured {
                canvas.sprite(
                    HERO_KEY,
                    player.position(),
                    size,
                    [0.0, 0.0, 1.0, 1.0],
                    self.facing_left,
                );
            } else {
                canvas.rect(
                    player.aabb.left(),
                    player.aabb.top(),
                    size.0,
                    size.1,
                    rgb_hex(PLACEHOLDER_COLOR),
                );
            }
        }
    }

    fn teardown(&mut self) {
        self.player = None;
        self.camera = None;
        self.terrain = None;
        self.contacts.clear();
    }

    fn debug_info(&self) -> Option<SceneDebugInfo> {
        let player = self.player.as_ref();
        Some(SceneDebugInfo {
            player_position: player.map(Player::position),
            facing: player.map(|p| format!("{:?}", p.state.direction)),
            is_moving: player.is_some_and(|p| p.state.is_moving),
            zoom: self.camera.map(|camera| camera.zoom),
            terrain: self.terrain.as_ref().map(|terrain| match terrain.kind {
                TerrainKind::Tiled => "Tiled map".to_string(),
                TerrainKind::Procedural => "Procedural".to_string(),
            }),
            wall_count: self.terrain.as_ref().map_or(0, |t| t.walls.len()),
            contacts: self.contacts.touching_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::test_support::Harness;

    const DT: f32 = 1.0 / 60.0;

    fn world_with(harness: &mut Harness) -> WorldScene {
        let mut world = WorldScene::new();
        world.init(&mut harness.ctx());
        world
    }

    #[test]
    fn init_resets_session() {
        let mut harness = Harness::new();
        harness.app.session.set_health(10);
        harness.app.session.increment_score(50);
        let _world = world_with(&mut harness);
        assert_eq!(harness.app.session.health(), 100);
        assert_eq!(harness.app.session.score(), 0);
    }

    #[test]
    fn no_assets_gives_procedural_world_with_placeholder_player() {
        let mut harness = Harness::new();
        let world = world_with(&mut harness);
        let info = world.debug_info().expect("debug info");
        assert_eq!(info.player_position, Some((640.0, 360.0)));
        assert_eq!(info.terrain.as_deref(), Some("Procedural"));
        assert_eq!(info.zoom, Some(1.5));
        assert!(!world.hero_textured);
        // Sounds are not loaded, so nothing is queued.
        assert!(harness.sounds.is_empty());
    }

    #[test]
    fn loaded_sounds_are_queued_at_start() {
        let mut harness = Harness::new();
        harness.assets.insert("background", AssetKind::Audio, vec![1]);
        harness.assets.insert("success", AssetKind::Audio, vec![1]);
        let _world = world_with(&mut harness);
        assert_eq!(
            harness.sounds,
            vec![SoundCue::BackgroundMusic, SoundCue::Success]
        );
    }

    #[test]
    fn holding_right_moves_player_and_camera() {
        let mut harness = Harness::new();
        let mut world = world_with(&mut harness);
        harness.input.key_down(Key::Right);
        for _ in 0..10 {
            world.update(DT, &mut harness.ctx());
        }
        let info = world.debug_info().expect("debug info");
        let (x, y) = info.player_position.expect("player");
        assert!((x - (640.0 + 10.0 * 160.0 * DT)).abs() < 0.01);
        assert_eq!(y, 360.0);
        assert_eq!(info.facing.as_deref(), Some("Right"));
        assert!(info.is_moving);
        let camera = world.camera.expect("camera");
        assert!(camera.position.0 > 640.0 && camera.position.0 < x);
    }

    #[test]
    fn walking_into_wall_emits_one_hit() {
        let mut harness = Harness::new();
        let mut world = world_with(&mut harness);
        // Interior wall at x 400..432, y 200..296; walk up then left into it.
        if let Some(player) = world.player.as_mut() {
            player.aabb.center_x = 460.0;
            player.aabb.center_y = 250.0;
        }
        harness.input.key_down(Key::Left);
        for _ in 0..60 {
            world.update(DT, &mut harness.ctx());
        }
        let hits = harness
            .sounds
            .iter()
            .filter(|cue| **cue == SoundCue::Hit)
            .count();
        assert_eq!(hits, 1);
        let player = world.player.as_ref().expect("player");
        assert!((player.aabb.left() - 432.0).abs() < 0.001);
    }

    #[test]
    fn zoom_keys_step_and_clamp() {
        let mut harness = Harness::new();
        let mut world = world_with(&mut harness);
        harness.input.key_down(Key::Z);
        world.update(DT, &mut harness.ctx());
        assert_eq!(world.camera.expect("camera").zoom, 1.75);

        harness.input.end_frame();
        harness.input.key_up(Key::Z);
        for _ in 0..20 {
            harness.input.key_down(Key::X);
            world.update(DT, &mut harness.ctx());
            harness.input.key_up(Key::X);
            harness.input.end_frame();
        }
        assert_eq!(world.camera.expect("camera").zoom, 0.5);
    }

    #[test]
    fn update_without_player_is_a_no_op() {
        let mut harness = Harness::new();
        let mut world = WorldScene::new();
        harness.input.key_down(Key::Right);
        assert_eq!(world.update(DT, &mut harness.ctx()), SceneCommand::None);
        assert!(harness.sounds.is_empty());
        let mut canvas = Canvas::new();
        world.draw(&mut canvas);
        assert!(canvas.quads.is_empty());
    }

    #[test]
    fn draw_uses_camera_and_places_player_last() {
        let mut harness = Harness::new();
        let world = world_with(&mut harness);
        let mut canvas = Canvas::new();
        world.draw(&mut canvas);
        let camera = canvas.camera.expect("camera view");
        assert_eq!(camera.zoom, 1.5);
        let last = canvas.quads.last().expect("player quad");
        assert_eq!(last.center, (640.0, 360.0));
        assert_eq!(last.size, (24.0, 32.0));
    }

    #[test]
    fn teardown_drops_world_state() {
        let mut harness = Harness::new();
        let mut world = world_with(&mut harness);
        world.teardown();
        let info = world.debug_info().expect("debug info");
        assert!(info.player_position.is_none());
        assert!(info.terrain.is_none());
    }
}
