use super::boot::SPINNER_KEY;
use super::{Scene, SceneCommand, SceneContext, SceneId};
use crate::assets::AssetEntry;
use crate::canvas::{rgb_hex, Canvas, SCREEN_HEIGHT, SCREEN_WIDTH};

const BAR_WIDTH: f32 = 320.0;
const BAR_HEIGHT: f32 = 24.0;
const BAR_PADDING: f32 = 4.0;
const SPINNER_SIZE: f32 = 48.0;

/// Reads the asset manifest one entry per update so the progress bar moves.
#[derive(Debug, Default)]
pub struct PreloadScene {
    pending: Vec<AssetEntry>,
    attempted: usize,
    failed: usize,
    show_spinner: bool,
}

impl PreloadScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of the manifest attempted so far, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.pending.is_empty() {
            return 1.0;
        }
        self.attempted as f32 / self.pending.len() as f32
    }
}

impl Scene for PreloadScene {
    fn id(&self) -> SceneId {
        SceneId::Preload
    }

    fn init(&mut self, ctx: &mut SceneContext) {
        self.pending = ctx
            .config
            .assets
            .iter()
            .filter(|entry| ctx.assets.get(&entry.key).is_none())
            .cloned()
            .collect();
        self.attempted = 0;
        self.failed = 0;
        self.show_spinner = ctx.assets.get(SPINNER_KEY).is_some();
        log::info!("Preloading {} assets", self.pending.len());
    }

    fn update(&mut self, _dt: f32, ctx: &mut SceneContext) -> SceneCommand {
        if let Some(entry) = self.pending.get(self.attempted) {
            match ctx.assets.load(entry) {
                Ok(()) => log::debug!("Loaded asset '{}'", entry.key),
                Err(err) => {
                    self.failed += 1;
                    log::warn!("{err}");
                }
            }
            self.attempted += 1;
            return SceneCommand::None;
        }

        log::info!(
            "Preload complete: {} loaded, {} failed",
            self.attempted - self.failed,
            self.failed
        );
        SceneCommand::SwitchTo(SceneId::World)
    }

    fn draw(&self, canvas: &mut Canvas) {
        canvas.clear(0x000000);
        let cx = SCREEN_WIDTH * 0.5;
        let cy = SCREEN_HEIGHT * 0.5;

        canvas.label("Loading Game...", (cx, cy - 40.0), 24.0, rgb_hex(0xFFFFFF));
        canvas.rect(
            cx - BAR_WIDTH * 0.5,
            cy - BAR_HEIGHT * 0.5,
            BAR_WIDTH,
            BAR_HEIGHT,
            rgb_hex(0x222222),
        );
        let inner = BAR_WIDTH - 2.0 * BAR_PADDING;
        canvas.rect(
            cx - inner * 0.5,
            cy - BAR_HEIGHT * 0.5 + BAR_PADDING,
            inner * self.progress(),
            BAR_HEIGHT - 2.0 * BAR_PADDING,
            rgb_hex(0xFFFFFF),
        );
        if self.show_spinner {
            canvas.sprite(
                SPINNER_KEY,
                (cx, cy + 56.0),
                (SPINNER_SIZE, SPINNER_SIZE),
                [0.0, 0.0, 1.0, 1.0],
                false,
            );
        }
    }

    fn teardown(&mut self) {
        self.pending.clear();
    }
}
