//! Recorded held-key sequences for deterministic movement checks.

use crate::movement::MoveInput;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    /// Held keys by name: "left", "right", "up", "down".
    #[serde(default)]
    pub held: Vec<String>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn expanded_inputs(&self) -> Vec<MoveInput> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let input = MoveInput {
                left: frame.holds("left"),
                right: frame.holds("right"),
                up: frame.holds("up"),
                down: frame.holds("down"),
            };
            for _ in 0..frame.repeat.max(1) {
                out.push(input);
            }
        }
        out
    }
}

impl ReplayFrame {
    fn holds(&self, name: &str) -> bool {
        self.held.iter().any(|key| key == name)
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    for frame in &replay.frames {
        if let Some(unknown) = frame
            .held
            .iter()
            .find(|key| !matches!(key.as_str(), "left" | "right" | "up" | "down"))
        {
            return Err(format!("Replay validation failed: unknown key '{unknown}'"));
        }
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::ContactTracker;
    use crate::movement::{Direction, MovementConfig, Player};
    use crate::terrain::procedural;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "ow_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "fixed_dt": 0.016666667,
              "frames": [
                { "held": ["right"], "repeat": 3 },
                { "held": ["left", "up"] },
                { "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 6);
        assert!(expanded[0].right && !expanded[0].left);
        assert!(expanded[3].left && expanded[3].up);
        assert!(!expanded[5].any());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_unknown_key() {
        let path = temp_file_path("unknown");
        fs::write(&path, r#"{ "frames": [ { "held": ["jump"] } ] }"#).expect("write replay");
        let err = load_replay_from_path(&path).expect_err("unknown key should fail");
        assert!(err.contains("unknown key 'jump'"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn shipped_replay_is_deterministic() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../assets/replays/wall_walk.json");
        let replay = load_replay_from_path(&path).expect("shipped replay should load");
        let inputs = replay.expanded_inputs();
        let terrain = procedural::build(1, true);

        let run = || {
            let mut player = Player::new(terrain.spawn, MovementConfig::default(), terrain.bounds);
            let mut tracker = ContactTracker::new();
            let mut hits = 0;
            for input in &inputs {
                let result = player.step(*input, replay.fixed_dt, &terrain.walls, terrain.bounds);
                hits += tracker.update(&result.hit_bodies).len();
            }
            (player.aabb, player.state, hits)
        };

        let (aabb_a, state_a, hits_a) = run();
        let (aabb_b, state_b, hits_b) = run();
        assert_eq!(aabb_a, aabb_b);
        assert_eq!(state_a, state_b);
        assert_eq!(hits_a, hits_b);
        assert!(hits_a >= 1, "the replay walks into at least one wall");
        assert_eq!(state_a.direction, Direction::Left);
        assert!(!state_a.is_moving);
    }
}
