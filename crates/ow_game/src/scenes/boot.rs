use super::{Scene, SceneCommand, SceneContext, SceneId};
use crate::canvas::Canvas;

pub const SPINNER_KEY: &str = "spinner";

/// Loads the loading-screen spinner, then hands over to Preload.
#[derive(Debug, Default)]
pub struct BootScene;

impl BootScene {
    pub fn new() -> Self {
        Self
    }
}

impl Scene for BootScene {
    fn id(&self) -> SceneId {
        SceneId::Boot
    }

    fn init(&mut self, ctx: &mut SceneContext) {
        let Some(entry) = ctx.config.assets.iter().find(|e| e.key == SPINNER_KEY) else {
            log::debug!("No '{SPINNER_KEY}' asset declared");
            return;
        };
        match ctx.assets.load(entry) {
            Ok(()) => log::info!("Loaded {SPINNER_KEY}"),
            Err(err) => log::warn!("{err}"),
        }
    }

    fn update(&mut self, _dt: f32, _ctx: &mut SceneContext) -> SceneCommand {
        SceneCommand::SwitchTo(SceneId::Preload)
    }

    fn draw(&self, canvas: &mut Canvas) {
        canvas.clear(0x000000);
    }

    fn teardown(&mut self) {}
}
