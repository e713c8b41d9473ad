//! Game configuration loaded from `assets/config/game.json`.
//!
//! Every section carries serde defaults, so a partial file only overrides
//! what it names. A missing file is not an error: the built-in defaults
//! describe the shipped game.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::assets::{AssetEntry, AssetKind};

pub const DEFAULT_TERRAIN_SEED: u64 = 0x5EED_CAFE;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowSection,
    pub player: PlayerSection,
    pub camera: CameraSection,
    pub terrain: TerrainConfig,
    pub assets: Vec<AssetEntry>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowSection::default(),
            player: PlayerSection::default(),
            camera: CameraSection::default(),
            terrain: TerrainConfig::default(),
            assets: default_assets(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WindowSection {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: "Dragon Quest Adventure".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct PlayerSection {
    /// World units per second along each axis.
    pub speed: f32,
    /// Unscaled sprite size; used when the hero image is missing.
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl Default for PlayerSection {
    fn default() -> Self {
        Self {
            speed: 160.0,
            width: 48.0,
            height: 64.0,
            scale: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct CameraSection {
    pub zoom: f32,
    pub zoom_step: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub follow_lerp: f32,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            zoom: 1.5,
            zoom_step: 0.25,
            min_zoom: 0.5,
            max_zoom: 4.0,
            follow_lerp: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TerrainConfig {
    Tiled {
        /// Asset key of the map entry in the manifest.
        map: String,
    },
    Procedural {
        #[serde(default = "default_seed")]
        seed: u64,
        #[serde(default)]
        bounding_walls: bool,
    },
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self::Procedural {
            seed: default_seed(),
            bounding_walls: false,
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Load the config, falling back to defaults when the file is missing or bad.
pub fn load_config_or_default(path: &Path) -> GameConfig {
    if !path.exists() {
        log::warn!(
            "Config '{}' not found, using built-in defaults",
            path.display()
        );
        return GameConfig::default();
    }
    match load_config_from_path(path) {
        Ok(config) => {
            log::info!("Loaded config '{}'", path.display());
            config
        }
        Err(err) => {
            log::error!("{err}. Using built-in defaults.");
            GameConfig::default()
        }
    }
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.window.width == 0 || config.window.height == 0 {
        return Err("Config validation failed: window size must be > 0".to_string());
    }
    let player = &config.player;
    if player.speed <= 0.0 || player.scale <= 0.0 {
        return Err("Config validation failed: player speed and scale must be > 0".to_string());
    }
    if player.width <= 0.0 || player.height <= 0.0 {
        return Err("Config validation failed: player width and height must be > 0".to_string());
    }
    let camera = &config.camera;
    if camera.min_zoom <= 0.0 || camera.min_zoom > camera.max_zoom {
        return Err(format!(
            "Config validation failed: zoom range [{}, {}] is invalid",
            camera.min_zoom, camera.max_zoom
        ));
    }
    if camera.zoom < camera.min_zoom || camera.zoom > camera.max_zoom {
        return Err(format!(
            "Config validation failed: zoom {} outside [{}, {}]",
            camera.zoom, camera.min_zoom, camera.max_zoom
        ));
    }
    if camera.follow_lerp <= 0.0 || camera.follow_lerp > 1.0 {
        return Err("Config validation failed: follow_lerp must be in (0, 1]".to_string());
    }

    let mut keys = HashSet::new();
    for entry in &config.assets {
        if !keys.insert(entry.key.as_str()) {
            return Err(format!(
                "Config validation failed: duplicate asset key '{}'",
                entry.key
            ));
        }
    }
    if let TerrainConfig::Tiled { map } = &config.terrain {
        let declared = config
            .assets
            .iter()
            .any(|entry| entry.key == *map && entry.kind == AssetKind::Map);
        if !declared {
            return Err(format!(
                "Config validation failed: terrain map '{map}' is not a declared map asset"
            ));
        }
    }
    Ok(())
}

const fn default_seed() -> u64 {
    DEFAULT_TERRAIN_SEED
}

fn default_assets() -> Vec<AssetEntry> {
    let entries: &[(&str, AssetKind, &str)] = &[
        ("spinner", AssetKind::Image, "assets/ui/spinner.png"),
        ("hero", AssetKind::Image, "assets/sprites/hero.png"),
        ("world_map", AssetKind::Map, "assets/maps/overworld.json"),
        ("grass", AssetKind::Image, "assets/tiles/grass.png"),
        ("sand", AssetKind::Image, "assets/tiles/sand.png"),
        ("water", AssetKind::Image, "assets/tiles/water.png"),
        ("wall", AssetKind::Image, "assets/tiles/wall.png"),
        ("background", AssetKind::Audio, "assets/sounds/background.wav"),
        ("hit", AssetKind::Audio, "assets/sounds/hit.wav"),
        ("success", AssetKind::Audio, "assets/sounds/success.wav"),
    ];
    entries
        .iter()
        .map(|(key, kind, path)| AssetEntry {
            key: key.to_string(),
            kind: *kind,
            path: path.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "ow_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn default_config_validates() {
        let config = GameConfig::default();
        validate_config(&config).expect("defaults should be valid");
        assert!(matches!(config.terrain, TerrainConfig::Procedural { .. }));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = temp_file_path("partial");
        fs::write(&path, r#"{ "player": { "speed": 200.0 } }"#).expect("write temp file");

        let config = load_config_from_path(&path).expect("partial config should load");
        assert_eq!(config.player.speed, 200.0);
        assert_eq!(config.player.scale, 0.5);
        assert_eq!(config.camera.zoom, 1.5);
        assert_eq!(config.window.width, 1280);
        assert!(config.assets.iter().any(|entry| entry.key == "hero"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn tiled_terrain_parses_from_tagged_object() {
        let path = temp_file_path("tiled");
        fs::write(&path, r#"{ "terrain": { "kind": "tiled", "map": "world_map" } }"#)
            .expect("write temp file");

        let config = load_config_from_path(&path).expect("tiled config should load");
        assert_eq!(
            config.terrain,
            TerrainConfig::Tiled {
                map: "world_map".to_string()
            }
        );
        let _ = fs::remove_file(path);
    }

    #[test]
    fn procedural_terrain_fills_missing_fields() {
        let path = temp_file_path("procedural");
        fs::write(&path, r#"{ "terrain": { "kind": "procedural" } }"#).expect("write temp file");

        let config = load_config_from_path(&path).expect("procedural config should load");
        assert_eq!(
            config.terrain,
            TerrainConfig::Procedural {
                seed: default_seed(),
                bounding_walls: false
            }
        );
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_inverted_zoom_range() {
        let path = temp_file_path("zoom");
        fs::write(
            &path,
            r#"{ "camera": { "zoom": 1.0, "min_zoom": 3.0, "max_zoom": 2.0 } }"#,
        )
        .expect("write temp file");

        let err = load_config_from_path(&path).expect_err("inverted zoom range should fail");
        assert!(err.contains("zoom range"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_tiled_terrain_without_map_asset() {
        let path = temp_file_path("no_map");
        fs::write(
            &path,
            r#"{ "terrain": { "kind": "tiled", "map": "missing" }, "assets": [] }"#,
        )
        .expect("write temp file");

        let err = load_config_from_path(&path).expect_err("undeclared map should fail");
        assert!(err.contains("not a declared map asset"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = temp_file_path("missing");
        let config = load_config_or_default(&path);
        assert_eq!(config.player.speed, 160.0);
        assert!(config.assets.iter().any(|entry| entry.key == "world_map"));
    }

    #[test]
    fn shipped_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/config/game.json");
        let config = load_config_from_path(&path).expect("shipped config should load");
        assert_eq!(
            config.terrain,
            TerrainConfig::Tiled {
                map: "world_map".to_string()
            }
        );
        assert_eq!(config.assets.len(), default_assets().len());
    }
}
