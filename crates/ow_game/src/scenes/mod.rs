//! Scene lifecycle and the fixed Boot -> Preload -> World sequence.
//!
//! A scene is initialised once when it becomes active, updated every fixed
//! step, drawn once per rendered frame, and torn down when replaced or when
//! the sequencer is shut down. The sequencer only ever moves forward to the
//! active scene's successor; anything else is logged and ignored.

mod boot;
mod preload;
mod world;

pub use boot::BootScene;
pub use preload::PreloadScene;
pub use world::{WorldScene, WorldSetupError};

use crate::assets::AssetStore;
use crate::audio::SoundCue;
use crate::canvas::Canvas;
use crate::config::GameConfig;
use crate::session::AppState;
use ow_core::input::InputState;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneId {
    Boot,
    Preload,
    World,
}

impl SceneId {
    /// The only scene this one may hand over to.
    pub fn next(self) -> Option<SceneId> {
        match self {
            Self::Boot => Some(Self::Preload),
            Self::Preload => Some(Self::World),
            Self::World => None,
        }
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boot => "Boot",
            Self::Preload => "Preload",
            Self::World => "World",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneId),
}

/// Everything a scene may touch besides its own state.
pub struct SceneContext<'a> {
    pub app: &'a mut AppState,
    pub input: &'a InputState,
    pub assets: &'a mut AssetStore,
    pub config: &'a GameConfig,
    pub sounds: &'a mut Vec<SoundCue>,
}

/// Read-only numbers for the debug overlay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDebugInfo {
    pub player_position: Option<(f32, f32)>,
    pub facing: Option<String>,
    pub is_moving: bool,
    pub zoom: Option<f32>,
    pub terrain: Option<String>,
    pub wall_count: usize,
    pub contacts: usize,
}

pub trait Scene {
    fn id(&self) -> SceneId;
    fn init(&mut self, ctx: &mut SceneContext);
    fn update(&mut self, dt: f32, ctx: &mut SceneContext) -> SceneCommand;
    fn draw(&self, canvas: &mut Canvas);
    fn teardown(&mut self);
    fn debug_info(&self) -> Option<SceneDebugInfo> {
        None
    }
}

pub type SceneFactory = Box<dyn FnMut(SceneId) -> Box<dyn Scene>>;

pub fn create_scene(id: SceneId) -> Box<dyn Scene> {
    match id {
        SceneId::Boot => Box::new(BootScene::new()),
        SceneId::Preload => Box::new(PreloadScene::new()),
        SceneId::World => Box::new(WorldScene::new()),
    }
}

pub struct SceneSequencer {
    active: Option<Box<dyn Scene>>,
    factory: SceneFactory,
}

impl SceneSequencer {
    /// Start at Boot with the built-in scenes.
    pub fn new(ctx: &mut SceneContext) -> Self {
        Self::with_factory(Box::new(create_scene), ctx)
    }

    pub fn with_factory(mut factory: SceneFactory, ctx: &mut SceneContext) -> Self {
        let mut boot = factory(SceneId::Boot);
        log::info!("Scene: init {}", boot.id());
        boot.init(ctx);
        Self {
            active: Some(boot),
            factory,
        }
    }

    pub fn active_id(&self) -> Option<SceneId> {
        self.active.as_ref().map(|scene| scene.id())
    }

    pub fn update(&mut self, dt: f32, ctx: &mut SceneContext) {
        let Some(scene) = self.active.as_mut() else {
            return;
        };
        if let SceneCommand::SwitchTo(target) = scene.update(dt, ctx) {
            self.request(target, ctx);
        }
    }

    /// Switch to `target` if it is the active scene's successor.
    pub fn request(&mut self, target: SceneId, ctx: &mut SceneContext) -> bool {
        let Some(current) = self.active_id() else {
            log::warn!("Scene: ignoring switch to {target}, sequencer is shut down");
            return false;
        };
        if current.next() != Some(target) {
            log::warn!("Scene: ignoring invalid transition {current} -> {target}");
            return false;
        }

        if let Some(mut old) = self.active.take() {
            log::info!("Scene: teardown {}", old.id());
            old.teardown();
        }
        let mut next = (self.factory)(target);
        log::info!("Scene: init {}", next.id());
        next.init(ctx);
        self.active = Some(next);
        true
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        if let Some(scene) = &self.active {
            scene.draw(canvas);
        }
    }

    pub fn debug_info(&self) -> Option<SceneDebugInfo> {
        self.active.as_ref().and_then(|scene| scene.debug_info())
    }

    pub fn shutdown(&mut self) {
        if let Some(mut scene) = self.active.take() {
            log::info!("Scene: teardown {} (shutdown)", scene.id());
            scene.teardown();
        }
    }
}

impl Drop for SceneSequencer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Owns everything a `SceneContext` borrows.
    pub struct Harness {
        pub app: AppState,
        pub input: InputState,
        pub assets: AssetStore,
        pub config: GameConfig,
        pub sounds: Vec<SoundCue>,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                app: AppState::new(),
                input: InputState::new(),
                assets: AssetStore::new(),
                config: GameConfig::default(),
                sounds: Vec::new(),
            }
        }

        pub fn ctx(&mut self) -> SceneContext<'_> {
            SceneContext {
                app: &mut self.app,
                input: &self.input,
                assets: &mut self.assets,
                config: &self.config,
                sounds: &mut self.sounds,
            }
        }
    }
}
