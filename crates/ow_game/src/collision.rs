//! Static wall bodies and the move-and-slide resolver the player runs against.
//!
//! World space is y-down with the origin at the top-left corner. Walls never
//! move and never push back; a mover only has its own displacement shortened.
//!
//! Resolution is axis-separable: X is resolved first against every wall, then
//! Y using the already-corrected X. Sliding along a wall while holding a
//! diagonal falls out of this for free.

use std::collections::HashSet;

const EPS: f32 = 0.001;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Aabb {
    /// Build from a top-left corner and a size.
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            center_x: x + width * 0.5,
            center_y: y + height * 0.5,
            half_w: width * 0.5,
            half_h: height * 0.5,
        }
    }

    pub fn left(&self) -> f32 {
        self.center_x - self.half_w
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.half_w
    }

    pub fn top(&self) -> f32 {
        self.center_y - self.half_h
    }

    pub fn bottom(&self) -> f32 {
        self.center_y + self.half_h
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    fn spans_y_of(&self, other: &Aabb) -> bool {
        self.top() < other.bottom() - EPS && self.bottom() > other.top() + EPS
    }

    fn spans_x_of(&self, other: &Aabb) -> bool {
        self.left() < other.right() - EPS && self.right() > other.left() + EPS
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionMoveResult {
    pub aabb: Aabb,
    pub blocked_left: bool,
    pub blocked_right: bool,
    pub blocked_up: bool,
    pub blocked_down: bool,
    /// Indices of the bodies that shortened this move, ascending, no repeats.
    pub hit_bodies: Vec<usize>,
}

impl CollisionMoveResult {
    pub fn is_blocked(&self) -> bool {
        self.blocked_left || self.blocked_right || self.blocked_up || self.blocked_down
    }
}

/// Immovable wall bodies. Index order is stable for the lifetime of a terrain.
#[derive(Debug, Clone, Default)]
pub struct StaticBodies {
    bodies: Vec<Aabb>,
}

impl StaticBodies {
    pub fn new(bodies: Vec<Aabb>) -> Self {
        Self { bodies }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aabb> {
        self.bodies.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Aabb> {
        self.bodies.get(index)
    }

    #[allow(dead_code)]
    pub fn move_and_collide(&self, aabb: Aabb, dx: f32, dy: f32) -> Aabb {
        self.move_and_collide_detailed(aabb, dx, dy).aabb
    }

    pub fn move_and_collide_detailed(&self, aabb: Aabb, dx: f32, dy: f32) -> CollisionMoveResult {
        let mut hits = Vec::new();

        let resolved_x = self.resolve_axis_x(aabb, dx, &mut hits);
        let collided_x = (resolved_x - (aabb.center_x + dx)).abs() > EPS;

        let mut moved = aabb;
        moved.center_x = resolved_x;
        let resolved_y = self.resolve_axis_y(moved, dy, &mut hits);
        let collided_y = (resolved_y - (aabb.center_y + dy)).abs() > EPS;
        moved.center_y = resolved_y;

        hits.sort_unstable();
        hits.dedup();

        CollisionMoveResult {
            aabb: moved,
            blocked_left: collided_x && dx < 0.0,
            blocked_right: collided_x && dx > 0.0,
            // y-down: moving up is a negative dy.
            blocked_up: collided_y && dy < 0.0,
            blocked_down: collided_y && dy > 0.0,
            hit_bodies: hits,
        }
    }

    fn resolve_axis_x(&self, aabb: Aabb, dx: f32, hits: &mut Vec<usize>) -> f32 {
        if dx == 0.0 {
            return aabb.center_x;
        }

        let mut candidate_x = aabb.center_x + dx;
        let mut blocked = false;
        for body in &self.bodies {
            if !aabb.spans_y_of(body) {
                continue;
            }
            if dx > 0.0 {
                // Only bodies ahead of the leading edge can stop the move.
                let limit = body.left() - aabb.half_w;
                if body.left() >= aabb.right() - EPS && candidate_x > limit {
                    candidate_x = limit;
                    blocked = true;
                }
            } else {
                let limit = body.right() + aabb.half_w;
                if body.right() <= aabb.left() + EPS && candidate_x < limit {
                    candidate_x = limit;
                    blocked = true;
                }
            }
        }

        // Guardrail: never push opposite to the attempted direction.
        if dx > 0.0 {
            candidate_x = candidate_x.max(aabb.center_x);
        } else {
            candidate_x = candidate_x.min(aabb.center_x);
        }
        self.collect_stoppers_x(aabb, candidate_x, dx, blocked, hits);
        candidate_x
    }

    fn resolve_axis_y(&self, aabb: Aabb, dy: f32, hits: &mut Vec<usize>) -> f32 {
        if dy == 0.0 {
            return aabb.center_y;
        }

        let mut candidate_y = aabb.center_y + dy;
        let mut blocked = false;
        for body in &self.bodies {
            if !aabb.spans_x_of(body) {
                continue;
            }
            if dy > 0.0 {
                let limit = body.top() - aabb.half_h;
                if body.top() >= aabb.bottom() - EPS && candidate_y > limit {
                    candidate_y = limit;
                    blocked = true;
                }
            } else {
                let limit = body.bottom() + aabb.half_h;
                if body.bottom() <= aabb.top() + EPS && candidate_y < limit {
                    candidate_y = limit;
                    blocked = true;
                }
            }
        }

        if dy > 0.0 {
            candidate_y = candidate_y.max(aabb.center_y);
        } else {
            candidate_y = candidate_y.min(aabb.center_y);
        }
        self.collect_stoppers_y(aabb, candidate_y, dy, blocked, hits);
        candidate_y
    }

    /// Every body whose face sits at the resolved X position and shares the
    /// mover's Y span counts as a hit, so two walls meeting flush both report.
    fn collect_stoppers_x(
        &self,
        aabb: Aabb,
        resolved_x: f32,
        dx: f32,
        blocked: bool,
        hits: &mut Vec<usize>,
    ) {
        if !blocked {
            return;
        }
        for (index, body) in self.bodies.iter().enumerate() {
            if !aabb.spans_y_of(body) {
                continue;
            }
            let face_gap = if dx > 0.0 {
                body.left() - (resolved_x + aabb.half_w)
            } else {
                (resolved_x - aabb.half_w) - body.right()
            };
            if face_gap.abs() <= EPS {
                hits.push(index);
            }
        }
    }

    fn collect_stoppers_y(
        &self,
        aabb: Aabb,
        resolved_y: f32,
        dy: f32,
        blocked: bool,
        hits: &mut Vec<usize>,
    ) {
        if !blocked {
            return;
        }
        for (index, body) in self.bodies.iter().enumerate() {
            if !aabb.spans_x_of(body) {
                continue;
            }
            let face_gap = if dy > 0.0 {
                body.top() - (resolved_y + aabb.half_h)
            } else {
                (resolved_y - aabb.half_h) - body.bottom()
            };
            if face_gap.abs() <= EPS {
                hits.push(index);
            }
        }
    }
}

/// Turns per-step hit lists into "new contact" events.
///
/// A body is reported once when it starts blocking the mover. It is not
/// reported again until a step passes in which it did not block.
#[derive(Debug, Clone, Default)]
pub struct ContactTracker {
    touching: HashSet<usize>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record this step's hits and return the bodies that were not touching
    /// on the previous step, ascending.
    pub fn update(&mut self, hits: &[usize]) -> Vec<usize> {
        let mut fresh: Vec<usize> = hits
            .iter()
            .copied()
            .filter(|index| !self.touching.contains(index))
            .collect();
        fresh.sort_unstable();
        fresh.dedup();
        self.touching = hits.iter().copied().collect();
        fresh
    }

    pub fn touching_count(&self) -> usize {
        self.touching.len()
    }

    pub fn clear(&mut self) {
        self.touching.clear();
    }
}
