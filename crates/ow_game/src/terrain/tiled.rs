//! Tiled JSON map subset: orthogonal tile layers, object groups and
//! single-image tilesets embedded in the map file.

use super::{PlacedTile, Terrain, TerrainKind, WorldBounds};
use crate::collision::{Aabb, StaticBodies};
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};

/// High bits of a gid carry flip flags.
const GID_MASK: u32 = 0x1FFF_FFFF;
const OBSTACLE_LAYER: &str = "obstacles";
const SPAWN_OBJECT: &str = "spawn";
const BACKGROUND: u32 = 0x4CAF50;
/// Largest accepted grid; the collision pass allocates one flag per cell.
const MAX_MAP_CELLS: u64 = 1 << 20;
/// Largest accepted world extent in pixels along either axis.
const MAX_MAP_EXTENT: u64 = 1 << 20;

#[derive(Debug, Deserialize, Clone)]
pub struct TiledMap {
    pub width: u32,
    pub height: u32,
    pub tilewidth: u32,
    pub tileheight: u32,
    pub layers: Vec<TiledLayer>,
    pub tilesets: Vec<TiledTileset>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum TiledLayer {
    #[serde(rename = "tilelayer")]
    Tiles(TileLayer),
    #[serde(rename = "objectgroup")]
    Objects(ObjectGroup),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TileLayer {
    pub name: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub data: Vec<u32>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObjectGroup {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub objects: Vec<TiledObject>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TiledObject {
    #[serde(default)]
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TiledTileset {
    pub firstgid: u32,
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub columns: u32,
    pub tilecount: u32,
    #[serde(default)]
    pub tiles: Vec<TileDefinition>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TileDefinition {
    pub id: u32,
    #[serde(default)]
    pub properties: Vec<TileProperty>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TileProperty {
    pub name: String,
    pub value: serde_json::Value,
}

impl TiledTileset {
    fn contains(&self, gid: u32) -> bool {
        gid >= self.firstgid && gid - self.firstgid < self.tilecount
    }

    fn collides(&self, local_id: u32) -> bool {
        self.tiles
            .iter()
            .filter(|tile| tile.id == local_id)
            .flat_map(|tile| tile.properties.iter())
            .any(|prop| prop.name == "collides" && prop.value.as_bool() == Some(true))
    }

    fn uv(&self, local_id: u32) -> [f32; 4] {
        let columns = self.columns.max(1);
        let rows = self.tilecount.div_ceil(columns).max(1);
        let col = local_id % columns;
        let row = local_id / columns;
        [
            col as f32 / columns as f32,
            row as f32 / rows as f32,
            (col + 1) as f32 / columns as f32,
            (row + 1) as f32 / rows as f32,
        ]
    }
}

impl TiledMap {
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds {
            width: self.width as f32 * self.tilewidth as f32,
            height: self.height as f32 * self.tileheight as f32,
        }
    }

    /// Tileset owning `gid`: the one with the greatest `firstgid` not above it.
    fn tileset_for(&self, gid: u32) -> Option<(usize, &TiledTileset)> {
        self.tilesets
            .iter()
            .enumerate()
            .filter(|(_, set)| set.firstgid <= gid)
            .max_by_key(|(_, set)| set.firstgid)
            .filter(|(_, set)| set.contains(gid))
    }

    fn spawn(&self) -> Option<(f32, f32)> {
        self.layers.iter().find_map(|layer| match layer {
            TiledLayer::Objects(group) => group
                .objects
                .iter()
                .find(|object| object.name == SPAWN_OBJECT)
                .map(|object| {
                    (
                        object.x + object.width * 0.5,
                        object.y + object.height * 0.5,
                    )
                }),
            _ => None,
        })
    }
}

pub fn parse_map(bytes: &[u8]) -> Result<TiledMap, String> {
    let map: TiledMap =
        serde_json::from_slice(bytes).map_err(|e| format!("Failed to parse Tiled JSON: {e}"))?;
    validate_map(&map)?;
    Ok(map)
}

fn validate_map(map: &TiledMap) -> Result<(), String> {
    if map.tilewidth == 0 || map.tileheight == 0 {
        return Err("Map validation failed: tile size must be > 0".to_string());
    }
    if map.width == 0 || map.height == 0 {
        return Err("Map validation failed: map size must be > 0".to_string());
    }
    let cells = u64::from(map.width) * u64::from(map.height);
    if cells > MAX_MAP_CELLS {
        return Err(format!(
            "Map validation failed: {}x{} tiles exceeds the {MAX_MAP_CELLS} cell limit",
            map.width, map.height
        ));
    }
    let extent_w = u64::from(map.width) * u64::from(map.tilewidth);
    let extent_h = u64::from(map.height) * u64::from(map.tileheight);
    if extent_w > MAX_MAP_EXTENT || extent_h > MAX_MAP_EXTENT {
        return Err(format!(
            "Map validation failed: {extent_w}x{extent_h} px exceeds the {MAX_MAP_EXTENT} px limit"
        ));
    }
    let expected = cells as usize;
    for layer in &map.layers {
        let TiledLayer::Tiles(tiles) = layer else {
            continue;
        };
        if tiles.width.unwrap_or(map.width) != map.width
            || tiles.height.unwrap_or(map.height) != map.height
        {
            return Err(format!(
                "Map validation failed: layer '{}' size differs from map",
                tiles.name
            ));
        }
        if tiles.data.len() != expected {
            return Err(format!(
                "Map validation failed: layer '{}' has {} tiles, expected {expected}",
                tiles.name,
                tiles.data.len()
            ));
        }
    }
    for set in &map.tilesets {
        if set.firstgid == 0 || set.columns == 0 || set.tilecount == 0 {
            return Err(format!(
                "Map validation failed: tileset '{}' needs firstgid, columns and tilecount > 0",
                set.name
            ));
        }
    }
    Ok(())
}

/// Build terrain from a parsed map. `images` holds the keys of loaded images;
/// a tileset resolves when an image with its name is loaded.
pub fn build(map: &TiledMap, images: &HashSet<&str>) -> Terrain {
    let bounds = map.bounds();
    let tile_w = map.tilewidth as f32;
    let tile_h = map.tileheight as f32;
    let mut tiles = Vec::new();
    let width = map.width as usize;
    let mut blocked = vec![false; width * map.height as usize];

    for layer in &map.layers {
        let TiledLayer::Tiles(layer) = layer else {
            continue;
        };
        if let Err(reason) = check_layer(map, layer, images) {
            log::warn!("Skipping tile layer '{}': {reason}", layer.name);
            continue;
        }
        let is_obstacle_layer = layer.name == OBSTACLE_LAYER;
        for (index, raw) in layer.data.iter().enumerate() {
            let gid = raw & GID_MASK;
            if gid == 0 {
                continue;
            }
            let Some((_, set)) = map.tileset_for(gid) else {
                continue;
            };
            let local_id = gid - set.firstgid;
            if is_obstacle_layer || set.collides(local_id) {
                blocked[index] = true;
            }
            if !layer.visible {
                continue;
            }
            let col = index % width;
            let row = index / width;
            tiles.push(PlacedTile {
                x: col as f32 * tile_w,
                y: row as f32 * tile_h,
                width: tile_w,
                height: tile_h,
                texture: set.name.clone(),
                uv: set.uv(local_id),
            });
        }
    }

    let walls = merge_blocked_rows(map, &blocked);
    let spawn = map.spawn().unwrap_or_else(|| bounds.center());
    log::info!(
        "Built Tiled terrain {}x{} px: {} tiles, {} wall bodies",
        bounds.width,
        bounds.height,
        tiles.len(),
        walls.len()
    );

    Terrain {
        kind: TerrainKind::Tiled,
        bounds,
        background: BACKGROUND,
        tiles,
        shapes: Vec::new(),
        walls,
        wall_color: None,
        spawn,
    }
}

fn check_layer(map: &TiledMap, layer: &TileLayer, images: &HashSet<&str>) -> Result<(), String> {
    let mut referenced = BTreeSet::new();
    for raw in &layer.data {
        let gid = raw & GID_MASK;
        if gid == 0 {
            continue;
        }
        match map.tileset_for(gid) {
            Some((index, _)) => {
                referenced.insert(index);
            }
            None => return Err(format!("gid {gid} belongs to no tileset")),
        }
    }
    for index in referenced {
        let name = map.tilesets[index].name.as_str();
        if !images.contains(name) {
            return Err(format!("tileset '{name}' has no loaded image"));
        }
    }
    Ok(())
}

/// Merge horizontal runs of blocked cells into one body per run, so walking
/// along a wall row counts as one contact.
fn merge_blocked_rows(map: &TiledMap, blocked: &[bool]) -> StaticBodies {
    let tile_w = map.tilewidth as f32;
    let tile_h = map.tileheight as f32;
    let mut bodies = Vec::new();
    let width = map.width as usize;
    for (row, cells) in blocked.chunks(width.max(1)).enumerate() {
        let mut col = 0;
        while col < cells.len() {
            if !cells[col] {
                col += 1;
                continue;
            }
            let start = col;
            while col < cells.len() && cells[col] {
                col += 1;
            }
            bodies.push(Aabb::from_rect(
                start as f32 * tile_w,
                row as f32 * tile_h,
                (col - start) as f32 * tile_w,
                tile_h,
            ));
        }
    }
    StaticBodies::new(bodies)
}

const fn default_visible() -> bool {
    true
}
