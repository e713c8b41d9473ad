//! Procedural overworld drawn from shapes when no tile map is available.

use super::{Shape, Terrain, TerrainKind, WorldBounds};
use crate::collision::{Aabb, StaticBodies};

pub const WORLD_WIDTH: f32 = 1280.0;
pub const WORLD_HEIGHT: f32 = 720.0;
pub const DECORATION_COUNT: usize = 60;

const GRASS: u32 = 0x4CAF50;
const ROAD: u32 = 0xC2A878;
const WATER: u32 = 0x2196F3;
const WALL: u32 = 0x6D4C41;
const DECORATION_COLORS: [u32; 3] = [0x388E3C, 0x81C784, 0xFFEB3B];

const ROAD_WIDTH: f32 = 64.0;
const POND_RADIUS: f32 = 80.0;
const POND_INSET: f32 = 120.0;
const BOUNDARY_THICKNESS: f32 = 16.0;

/// Interior walls as `(x, y, width, height)`, mirrored across both centre
/// lines and clear of the road bands.
const INTERIOR_WALLS: [(f32, f32, f32, f32); 8] = [
    (200.0, 120.0, 160.0, 32.0),
    (920.0, 120.0, 160.0, 32.0),
    (200.0, 568.0, 160.0, 32.0),
    (920.0, 568.0, 160.0, 32.0),
    (400.0, 200.0, 32.0, 96.0),
    (848.0, 200.0, 32.0, 96.0),
    (400.0, 424.0, 32.0, 96.0),
    (848.0, 424.0, 32.0, 96.0),
];

pub fn build(seed: u64, bounding_walls: bool) -> Terrain {
    let bounds = WorldBounds {
        width: WORLD_WIDTH,
        height: WORLD_HEIGHT,
    };
    let (cx, cy) = bounds.center();

    let mut shapes = vec![
        Shape::Rect {
            x: 0.0,
            y: cy - ROAD_WIDTH * 0.5,
            width: WORLD_WIDTH,
            height: ROAD_WIDTH,
            color: ROAD,
        },
        Shape::Rect {
            x: cx - ROAD_WIDTH * 0.5,
            y: 0.0,
            width: ROAD_WIDTH,
            height: WORLD_HEIGHT,
            color: ROAD,
        },
    ];
    for (x, y) in [
        (POND_INSET, POND_INSET),
        (WORLD_WIDTH - POND_INSET, POND_INSET),
        (POND_INSET, WORLD_HEIGHT - POND_INSET),
        (WORLD_WIDTH - POND_INSET, WORLD_HEIGHT - POND_INSET),
    ] {
        shapes.push(Shape::Circle {
            x,
            y,
            radius: POND_RADIUS,
            color: WATER,
        });
    }
    shapes.extend(decorations(seed));

    let mut walls: Vec<Aabb> = INTERIOR_WALLS
        .iter()
        .map(|&(x, y, w, h)| Aabb::from_rect(x, y, w, h))
        .collect();
    if bounding_walls {
        let t = BOUNDARY_THICKNESS;
        walls.extend([
            Aabb::from_rect(0.0, 0.0, WORLD_WIDTH, t),
            Aabb::from_rect(0.0, WORLD_HEIGHT - t, WORLD_WIDTH, t),
            Aabb::from_rect(0.0, t, t, WORLD_HEIGHT - 2.0 * t),
            Aabb::from_rect(WORLD_WIDTH - t, t, t, WORLD_HEIGHT - 2.0 * t),
        ]);
    }

    log::info!(
        "Built procedural terrain (seed {seed:#x}): {} shapes, {} wall bodies",
        shapes.len(),
        walls.len()
    );

    Terrain {
        kind: TerrainKind::Procedural,
        bounds,
        background: GRASS,
        tiles: Vec::new(),
        shapes,
        walls: StaticBodies::new(walls),
        wall_color: Some(WALL),
        spawn: (cx, cy),
    }
}

/// Small flowers and tufts scattered over the grass. Same seed, same list.
pub fn decorations(seed: u64) -> Vec<Shape> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..DECORATION_COUNT)
        .map(|_| Shape::Circle {
            x: rng.f32() * WORLD_WIDTH,
            y: rng.f32() * WORLD_HEIGHT,
            radius: 2.0 + rng.f32() * 3.0,
            color: DECORATION_COLORS[rng.usize(..DECORATION_COLORS.len())],
        })
        .collect()
}
