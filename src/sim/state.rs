//! Session state and core simulation types
//!
//! Everything the frame loop mutates lives in one `GameState`, owned by the
//! controller and passed by `&mut` into each subsystem.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::Rect;
use super::grid::BrickGrid;
use super::particles::Particle;
use super::powerups::{PowerUp, PowerUpKind};
use super::timers::Timers;
use crate::color::{Rgba, palette};
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Start screen, nothing moves
    Idle,
    /// Active gameplay
    Playing,
    /// Between-level pause after a clear
    LevelAdvance,
    /// Out of lives; waits for restart
    GameOver,
}

/// Named audio cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Brick,
    Paddle,
    Wall,
    Life,
    PowerUp,
}

/// Things that happened during a tick, drained by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Sound(SoundCue),
    SessionStarted,
    BrickDestroyed { points: u64 },
    LevelAdvanced { level: u32 },
    LifeLost { lives_left: u32 },
    PowerUpCollected(PowerUpKind),
    PowerUpExpired(PowerUpKind),
    GameOver { score: u64, level: u32 },
}

/// Drawable area in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// The player's paddle
#[derive(Debug, Clone, PartialEq)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Keyboard movement per step
    pub speed: f32,
    /// Width without the expand power-up
    pub base_width: f32,
}

impl Paddle {
    /// A paddle centered near the bottom of the viewport
    pub fn new(viewport: Viewport, tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(
                (viewport.width - tuning.paddle_width) / 2.0,
                viewport.height - tuning.paddle_bottom_offset,
            ),
            width: tuning.paddle_width,
            height: tuning.paddle_height,
            speed: tuning.paddle_speed,
            base_width: tuning.paddle_width,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    /// Keep the paddle inside [0, viewport_width]
    pub fn clamp_to(&mut self, viewport_width: f32) {
        let max_x = (viewport_width - self.width).max(0.0);
        self.pos.x = self.pos.x.clamp(0.0, max_x);
    }

    pub fn move_by(&mut self, dx: f32, viewport_width: f32) {
        self.pos.x += dx;
        self.clamp_to(viewport_width);
    }

    pub fn set_center(&mut self, x: f32, viewport_width: f32) {
        self.pos.x = x - self.width / 2.0;
        self.clamp_to(viewport_width);
    }

    /// Change width around the current center
    pub fn resize_width(&mut self, width: f32, viewport_width: f32) {
        let center = self.center_x();
        self.width = width;
        self.set_center(center, viewport_width);
    }
}

/// A ball entity
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Velocity magnitude; grows on paddle bounces up to the cap
    pub speed: f32,
    pub color: Rgba,
}

impl Ball {
    pub fn bounds(&self) -> Rect {
        Rect::around_circle(self.pos, self.radius)
    }

    /// Where the ball will be after one more step
    pub fn projected(&self) -> Vec2 {
        self.pos + self.vel
    }
}

/// Active power-up effects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveEffects {
    pub expanded: bool,
    pub mega: bool,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub tuning: Tuning,
    pub viewport: Viewport,
    pub phase: GamePhase,
    pub score: u64,
    /// 1-based level
    pub level: u32,
    pub lives: u32,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub grid: BrickGrid,
    pub particles: Vec<Particle>,
    pub powerups: Vec<PowerUp>,
    pub effects: ActiveEffects,
    pub timers: Timers,
    /// Shake magnitude in pixels, decays every step
    pub screen_shake: f32,
    /// Render offset derived from the shake this step
    pub shake_offset: Vec2,
    /// Steps left in the level-advance phase
    pub advance_frames: u32,
    /// Simulation step counter
    pub steps: u64,
    pub rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// A fresh game sitting on the start screen
    pub fn new(seed: u64, viewport: Viewport, tuning: Tuning) -> Self {
        let grid = BrickGrid::generate(viewport.width, 1, &tuning);
        let paddle = Paddle::new(viewport, &tuning);
        let mut state = Self {
            seed,
            viewport,
            phase: GamePhase::Idle,
            score: 0,
            level: 1,
            lives: tuning.starting_lives,
            paddle,
            balls: Vec::new(),
            grid,
            particles: Vec::new(),
            powerups: Vec::new(),
            effects: ActiveEffects::default(),
            timers: Timers::new(),
            screen_shake: 0.0,
            shake_offset: Vec2::ZERO,
            advance_frames: 0,
            steps: 0,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            tuning,
        };
        state.reset_ball_paddle();
        state
    }

    /// Center the paddle and serve a single ball for the current level
    ///
    /// Also drops timed effects and falling tokens.
    pub fn reset_ball_paddle(&mut self) {
        use rand::Rng;

        self.timers.cancel_all();
        self.effects = ActiveEffects::default();
        self.paddle = Paddle::new(self.viewport, &self.tuning);
        self.powerups.clear();

        let axis_speed = self.tuning.launch_speed(self.level);
        let direction = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let mut vel = Vec2::new(axis_speed * direction, -axis_speed);
        let mut speed = vel.length();
        if speed > self.tuning.ball_max_speed {
            vel = vel.normalize_or_zero() * self.tuning.ball_max_speed;
            speed = self.tuning.ball_max_speed;
        }

        self.balls.clear();
        self.balls.push(Ball {
            pos: Vec2::new(
                self.viewport.width / 2.0,
                self.paddle.pos.y - self.tuning.ball_radius,
            ),
            vel,
            radius: self.tuning.ball_radius,
            speed,
            color: palette::BALL,
        });
    }

    /// Ball used when an effect needs one and none are in play
    pub fn default_ball(&self) -> Ball {
        let axis_speed = self.tuning.launch_speed(self.level);
        let speed = (axis_speed * std::f32::consts::SQRT_2).min(self.tuning.ball_max_speed);
        let (radius, color) = if self.effects.mega {
            (
                self.tuning.ball_radius * self.tuning.mega_radius_factor,
                palette::MEGA_BALL,
            )
        } else {
            (self.tuning.ball_radius, palette::BALL)
        };
        Ball {
            pos: Vec2::new(self.paddle.center_x(), self.paddle.pos.y - radius),
            vel: Vec2::new(0.0, -speed),
            radius,
            speed,
            color,
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn play(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}
