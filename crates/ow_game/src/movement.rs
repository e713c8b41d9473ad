use crate::collision::{Aabb, CollisionMoveResult, StaticBodies};
use crate::config::PlayerSection;
use crate::terrain::WorldBounds;
use ow_core::input::{InputState, Key};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerState {
    pub direction: Direction,
    pub is_moving: bool,
}

/// Directional keys held this step, arrows and WASD merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MoveInput {
    pub fn from_input(input: &InputState) -> Self {
        Self {
            left: input.is_any_held(&[Key::Left, Key::A]),
            right: input.is_any_held(&[Key::Right, Key::D]),
            up: input.is_any_held(&[Key::Up, Key::W]),
            down: input.is_any_held(&[Key::Down, Key::S]),
        }
    }

    /// Per-axis unit intent. Left is checked before right and up before down;
    /// when both keys of an axis are held the first-checked one wins.
    pub fn axes(&self) -> (f32, f32) {
        let x = if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        };
        // y-down: up is negative.
        let y = if self.up {
            -1.0
        } else if self.down {
            1.0
        } else {
            0.0
        };
        (x, y)
    }

    pub fn any(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}

/// Next facing and moving flags. Horizontal input decides the facing when
/// present; vertical input only when no horizontal input is active.
pub fn next_state(previous: PlayerState, input: MoveInput) -> PlayerState {
    let (x, y) = input.axes();
    let direction = if x < 0.0 {
        Direction::Left
    } else if x > 0.0 {
        Direction::Right
    } else if y < 0.0 {
        Direction::Up
    } else if y > 0.0 {
        Direction::Down
    } else {
        previous.direction
    };
    PlayerState {
        direction,
        is_moving: input.any(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MovementConfig {
    pub speed: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl MovementConfig {
    /// Collision size is the sprite size times its display scale.
    pub fn from_player(section: &PlayerSection, sprite_size: Option<(f32, f32)>) -> Self {
        let (width, height) = sprite_size.unwrap_or((section.width, section.height));
        Self {
            speed: section.speed,
            half_w: width * section.scale * 0.5,
            half_h: height * section.scale * 0.5,
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self::from_player(&PlayerSection::default(), None)
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub aabb: Aabb,
    pub state: PlayerState,
    pub config: MovementConfig,
}

impl Player {
    pub fn new(spawn: (f32, f32), config: MovementConfig, bounds: WorldBounds) -> Self {
        let mut aabb = Aabb {
            center_x: spawn.0,
            center_y: spawn.1,
            half_w: config.half_w,
            half_h: config.half_h,
        };
        bounds.clamp(&mut aabb);
        Self {
            aabb,
            state: PlayerState::default(),
            config,
        }
    }

    pub fn position(&self) -> (f32, f32) {
        (self.aabb.center_x, self.aabb.center_y)
    }

    /// One fixed step: direct position delta, wall resolution, bounds clamp.
    pub fn step(
        &mut self,
        input: MoveInput,
        dt: f32,
        walls: &StaticBodies,
        bounds: WorldBounds,
    ) -> CollisionMoveResult {
        self.state = next_state(self.state, input);

        let (x, y) = input.axes();
        let dx = x * self.config.speed * dt;
        let dy = y * self.config.speed * dt;
        let mut result = walls.move_and_collide_detailed(self.aabb, dx, dy);
        bounds.clamp(&mut result.aabb);
        self.aabb = result.aabb;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn bounds() -> WorldBounds {
        WorldBounds {
            width: 1280.0,
            height: 720.0,
        }
    }

    fn player_at_center() -> Player {
        Player::new((640.0, 360.0), MovementConfig::default(), bounds())
    }

    fn held(keys: &[Key]) -> MoveInput {
        let mut input = InputState::new();
        for key in keys {
            input.key_down(*key);
        }
        MoveInput::from_input(&input)
    }

    #[test]
    fn wasd_maps_to_same_directions_as_arrows() {
        assert_eq!(held(&[Key::A]), held(&[Key::Left]));
        assert_eq!(held(&[Key::D]), held(&[Key::Right]));
        assert_eq!(held(&[Key::W]), held(&[Key::Up]));
        assert_eq!(held(&[Key::S]), held(&[Key::Down]));
    }

    #[test]
    fn single_key_moves_along_one_axis_only() {
        let walls = StaticBodies::default();
        let mut player = player_at_center();
        player.step(held(&[Key::Up]), DT, &walls, bounds());

        let (x, y) = player.position();
        assert_eq!(x, 640.0);
        assert!(y < 360.0);
        assert_eq!(player.state.direction, Direction::Up);
        assert!(player.state.is_moving);
    }

    #[test]
    fn opposing_keys_follow_first_checked_not_sum() {
        let walls = StaticBodies::default();
        let mut player = player_at_center();
        player.step(held(&[Key::Left, Key::Right]), DT, &walls, bounds());
        assert!(player.position().0 < 640.0);
        assert_eq!(player.state.direction, Direction::Left);

        let mut player = player_at_center();
        player.step(held(&[Key::Down, Key::W]), DT, &walls, bounds());
        assert!(player.position().1 < 360.0);
        assert_eq!(player.state.direction, Direction::Up);
    }

    #[test]
    fn horizontal_input_owns_facing_on_diagonals() {
        let state = next_state(PlayerState::default(), held(&[Key::Right, Key::Up]));
        assert_eq!(state.direction, Direction::Right);
        assert!(state.is_moving);
    }

    #[test]
    fn no_input_keeps_last_direction_and_stops() {
        let moving = next_state(PlayerState::default(), held(&[Key::Left]));
        let idle = next_state(moving, MoveInput::default());
        assert_eq!(idle.direction, Direction::Left);
        assert!(!idle.is_moving);
    }

    #[test]
    fn diagonal_applies_both_axes_unnormalised() {
        let walls = StaticBodies::default();
        let mut player = player_at_center();
        player.step(held(&[Key::Right, Key::Down]), DT, &walls, bounds());
        let step = 160.0 * DT;
        let (x, y) = player.position();
        assert!((x - (640.0 + step)).abs() < 0.0001);
        assert!((y - (360.0 + step)).abs() < 0.0001);
    }

    #[test]
    fn holding_right_stops_at_right_bound() {
        let walls = StaticBodies::default();
        let right_limit = 1280.0 - player_at_center().config.half_w;
        for steps in [10_usize, 100, 400] {
            let mut player = player_at_center();
            for _ in 0..steps {
                player.step(held(&[Key::Right]), DT, &walls, bounds());
            }
            let expected = (640.0 + steps as f32 * 160.0 * DT).min(right_limit);
            assert!(
                (player.position().0 - expected).abs() < 0.01,
                "after {steps} steps expected x={expected}, got {}",
                player.position().0
            );
        }
    }

    #[test]
    fn position_never_leaves_clamped_bounds() {
        let walls = StaticBodies::default();
        let mut player = player_at_center();
        let config = player.config;
        for _ in 0..600 {
            player.step(held(&[Key::Left, Key::Up]), DT, &walls, bounds());
            let (x, y) = player.position();
            assert!(x >= config.half_w && x <= 1280.0 - config.half_w);
            assert!(y >= config.half_h && y <= 720.0 - config.half_h);
        }
        assert_eq!(player.position(), (config.half_w, config.half_h));
    }

    #[test]
    fn wall_blocks_and_reports_hit() {
        let walls = StaticBodies::new(vec![Aabb::from_rect(700.0, 300.0, 32.0, 120.0)]);
        let mut player = player_at_center();
        let mut hits = 0;
        for _ in 0..120 {
            let result = player.step(held(&[Key::Right]), DT, &walls, bounds());
            if !result.hit_bodies.is_empty() {
                hits += 1;
            }
        }
        assert!((player.aabb.right() - 700.0).abs() < 0.001);
        assert!(hits > 0);
    }

    #[test]
    fn collision_size_uses_scaled_sprite() {
        let section = PlayerSection::default();
        let config = MovementConfig::from_player(&section, Some((100.0, 80.0)));
        assert_eq!(config.half_w, 25.0);
        assert_eq!(config.half_h, 20.0);

        let fallback = MovementConfig::from_player(&section, None);
        assert_eq!(fallback.half_w, 12.0);
        assert_eq!(fallback.half_h, 16.0);
    }

    #[test]
    fn spawn_outside_bounds_is_clamped() {
        let player = Player::new((-50.0, 9000.0), MovementConfig::default(), bounds());
        let (x, y) = player.position();
        assert_eq!(x, player.config.half_w);
        assert_eq!(y, 720.0 - player.config.half_h);
    }
}
