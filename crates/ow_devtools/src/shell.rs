//! Start screen, in-game HUD and the controls dialog.

pub const GAME_TITLE: &str = "Dragon Quest Adventure";

const BLURB: &str = "Explore a top-down overworld. Walk the roads, skirt the ponds \
and find out what the walls are hiding.";

const CONTROLS: &[(&str, &str)] = &[
    ("Arrow Keys / WASD", "Move the character"),
    ("Z", "Zoom in"),
    ("X", "Zoom out"),
    ("M", "Toggle sound"),
    ("F1", "Show this dialog"),
    ("F3", "Toggle debug overlay"),
    ("Esc", "Leave the world"),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudStats {
    pub health: u32,
    pub max_health: u32,
    pub score: u32,
    pub muted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShellView {
    StartScreen,
    /// Loading scenes draw their own screen.
    Hidden,
    InGame(HudStats),
}

/// Buttons clicked this frame. The host applies them after `prepare`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShellActions {
    pub start_game: bool,
    pub toggle_mute: bool,
}

#[derive(Debug, Default)]
pub struct UiShell {
    pub show_controls: bool,
}

impl UiShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_controls(&mut self) {
        self.show_controls = !self.show_controls;
        log::debug!(
            "Controls dialog: {}",
            if self.show_controls { "ON" } else { "OFF" }
        );
    }

    pub fn show(&mut self, ctx: &egui::Context, view: &ShellView) -> ShellActions {
        let mut actions = ShellActions::default();
        match view {
            ShellView::StartScreen => self.start_screen(ctx, &mut actions),
            ShellView::Hidden => {}
            ShellView::InGame(hud) => self.hud(ctx, hud, &mut actions),
        }
        if self.show_controls {
            let mut open = true;
            egui::Window::new("Game Controls")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .open(&mut open)
                .show(ctx, |ui| {
                    egui::Grid::new("controls_grid")
                        .num_columns(2)
                        .spacing([24.0, 6.0])
                        .show(ui, |ui| {
                            for (key, action) in CONTROLS {
                                ui.strong(*key);
                                ui.label(*action);
                                ui.end_row();
                            }
                        });
                });
            self.show_controls = open;
        }
        actions
    }

    fn start_screen(&mut self, ctx: &egui::Context, actions: &mut ShellActions) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(egui::Color32::from_rgb(24, 24, 32)))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() * 0.3);
                    ui.heading(egui::RichText::new(GAME_TITLE).size(36.0).strong());
                    ui.add_space(12.0);
                    ui.set_max_width(420.0);
                    ui.label(egui::RichText::new(BLURB).size(16.0));
                    ui.add_space(24.0);
                    let label = egui::RichText::new("Start Adventure").size(20.0);
                    let start = egui::Button::new(label).min_size(egui::vec2(200.0, 44.0));
                    if ui.add(start).clicked() {
                        actions.start_game = true;
                    }
                    ui.add_space(8.0);
                    ui.weak("Press Enter to start, F1 for controls");
                });
            });
    }

    fn hud(&mut self, ctx: &egui::Context, hud: &HudStats, actions: &mut ShellActions) {
        egui::Area::new(egui::Id::new("hud_left"))
            .anchor(egui::Align2::LEFT_TOP, [12.0, 12.0])
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("Info").clicked() {
                            self.show_controls = !self.show_controls;
                        }
                        let fraction = if hud.max_health == 0 {
                            0.0
                        } else {
                            hud.health as f32 / hud.max_health as f32
                        };
                        ui.add(
                            egui::ProgressBar::new(fraction)
                                .desired_width(140.0)
                                .text(format!("HP {}/{}", hud.health, hud.max_health)),
                        );
                        ui.label(format!("Score: {}", hud.score));
                    });
                });
            });

        egui::Area::new(egui::Id::new("hud_right"))
            .anchor(egui::Align2::RIGHT_TOP, [-12.0, 12.0])
            .show(ctx, |ui| {
                let label = if hud.muted { "Unmute" } else { "Mute" };
                if ui.button(label).clicked() {
                    actions.toggle_mute = true;
                }
            });
    }
}
