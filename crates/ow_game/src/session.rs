//! Application state shared by the scenes and the UI shell.
//!
//! Constructed once in `main` when the app starts and handed to scenes by
//! `&mut` through `SceneContext`. `GameSession::reset` runs at the start of
//! every World scene, so each new game begins with full health and no score.

pub const DEFAULT_MAX_HEALTH: u32 = 100;
pub const DEFAULT_SCORE_INCREMENT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    health: u32,
    max_health: u32,
    score: u32,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            health: DEFAULT_MAX_HEALTH,
            max_health: DEFAULT_MAX_HEALTH,
            score: 0,
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn set_health(&mut self, health: u32) {
        self.health = health.min(self.max_health);
    }

    pub fn increment_score(&mut self, amount: u32) {
        self.score = self.score.saturating_add(amount);
    }

    pub fn reset(&mut self) {
        self.health = self.max_health;
        self.score = 0;
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioSettings {
    pub muted: bool,
}

impl AudioSettings {
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        log::info!("Audio {}", if self.muted { "muted" } else { "unmuted" });
        self.muted
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub session: GameSession,
    pub audio: AudioSettings,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_full() {
        let session = GameSession::new();
        assert_eq!(session.health(), 100);
        assert_eq!(session.max_health(), 100);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn reset_restores_health_and_clears_score() {
        let mut session = GameSession::new();
        session.set_health(25);
        session.increment_score(DEFAULT_SCORE_INCREMENT);
        session.increment_score(5);
        assert_eq!(session.score(), 15);

        session.reset();
        assert_eq!(session.health(), 100);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn health_is_capped_at_max() {
        let mut session = GameSession::new();
        session.set_health(250);
        assert_eq!(session.health(), 100);
        session.set_health(0);
        assert_eq!(session.health(), 0);
    }

    #[test]
    fn score_saturates_instead_of_wrapping() {
        let mut session = GameSession::new();
        session.increment_score(u32::MAX);
        session.increment_score(DEFAULT_SCORE_INCREMENT);
        assert_eq!(session.score(), u32::MAX);
    }

    #[test]
    fn toggle_mute_flips_and_reports() {
        let mut audio = AudioSettings::default();
        assert!(audio.toggle_mute());
        assert!(!audio.toggle_mute());
    }
}
