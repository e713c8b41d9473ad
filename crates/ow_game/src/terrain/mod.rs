//! Terrain construction: world size, what to draw, and which regions block.
//!
//! The strategy is chosen once when the World scene starts. A configured
//! Tiled map that is missing or malformed drops to the procedural strategy
//! with a warning, and that choice is final for the scene's lifetime.

pub mod procedural;
pub mod tiled;

use crate::assets::{AssetKind, AssetStore};
use crate::collision::{Aabb, StaticBodies};
use crate::config::{TerrainConfig, DEFAULT_TERRAIN_SEED};
use std::collections::HashSet;

pub use tiled::TiledMap;

/// World rectangle with its origin at (0, 0), y-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn center(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }

    /// Keep `aabb` fully inside the world. A box larger than the world is
    /// pinned to the top-left edge.
    pub fn clamp(&self, aabb: &mut Aabb) {
        let max_x = (self.width - aabb.half_w).max(aabb.half_w);
        let max_y = (self.height - aabb.half_h).max(aabb.half_h);
        aabb.center_x = aabb.center_x.clamp(aabb.half_w, max_x);
        aabb.center_y = aabb.center_y.clamp(aabb.half_h, max_y);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainKind {
    Tiled,
    Procedural,
}

/// One tile quad: world rect, tileset image key and its UV sub-rect.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTile {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub texture: String,
    /// `[u0, v0, u1, v1]` in normalised texture space.
    pub uv: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: u32,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        color: u32,
    },
}

#[derive(Debug, Clone)]
pub struct Terrain {
    pub kind: TerrainKind,
    pub bounds: WorldBounds,
    /// Clear colour behind everything else.
    pub background: u32,
    pub tiles: Vec<PlacedTile>,
    pub shapes: Vec<Shape>,
    pub walls: StaticBodies,
    /// Fill for wall bodies; `None` when the tiles already show them.
    pub wall_color: Option<u32>,
    pub spawn: (f32, f32),
}

#[derive(Debug, Clone)]
pub enum TerrainSource {
    TiledMap(TiledMap),
    Procedural { seed: u64, bounding_walls: bool },
}

impl TerrainSource {
    pub fn select(config: &TerrainConfig, assets: &AssetStore) -> Self {
        match config {
            TerrainConfig::Procedural {
                seed,
                bounding_walls,
            } => Self::Procedural {
                seed: *seed,
                bounding_walls: *bounding_walls,
            },
            TerrainConfig::Tiled { map } => match Self::load_tiled(map, assets) {
                Ok(tiled) => {
                    log::info!(
                        "Terrain: Tiled map '{map}' ({}x{} tiles)",
                        tiled.width,
                        tiled.height
                    );
                    Self::TiledMap(tiled)
                }
                Err(err) => {
                    log::warn!("{err}. Falling back to procedural terrain.");
                    Self::Procedural {
                        seed: DEFAULT_TERRAIN_SEED,
                        bounding_walls: false,
                    }
                }
            },
        }
    }

    fn load_tiled(key: &str, assets: &AssetStore) -> Result<TiledMap, String> {
        if !assets.has(key, AssetKind::Map) {
            return Err(format!("Map asset '{key}' is not loaded"));
        }
        let bytes = assets
            .bytes(key)
            .ok_or_else(|| format!("Map asset '{key}' has no data"))?;
        tiled::parse_map(bytes).map_err(|e| format!("Map asset '{key}': {e}"))
    }

    pub fn kind(&self) -> TerrainKind {
        match self {
            Self::TiledMap(_) => TerrainKind::Tiled,
            Self::Procedural { .. } => TerrainKind::Procedural,
        }
    }

    pub fn build(&self, assets: &AssetStore) -> Terrain {
        match self {
            Self::TiledMap(map) => {
                let images: HashSet<&str> = assets.keys_of(AssetKind::Image).collect();
                tiled::build(map, &images)
            }
            Self::Procedural {
                seed,
                bounding_walls,
            } => procedural::build(*seed, *bounding_walls),
        }
    }
}
