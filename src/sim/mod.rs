//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (column-major bricks, insertion-ordered balls)
//! - No rendering or platform dependencies; wall-clock time arrives via `TickInput`

pub mod collision;
pub mod grid;
pub mod particles;
pub mod powerups;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::{Axis, Rect, bounce_velocity, brick_hit_axis, next_speed, paddle_offset};
pub use grid::{Brick, BrickGrid, Pattern};
pub use particles::{Particle, create_explosion, update_particles};
pub use powerups::{PowerUp, PowerUpKind};
pub use state::{
    ActiveEffects, Ball, GameEvent, GamePhase, GameState, Paddle, SoundCue, Viewport,
};
pub use tick::{TickInput, resize, start_session, tick};
pub use timers::{TimerKind, Timers};
