//! Falling power-up tokens and their timed effects

use glam::Vec2;
use rand::Rng;

use super::collision::Rect;
use super::state::{Ball, GameEvent, GameState, SoundCue};
use super::timers::TimerKind;
use crate::color::{Rgba, palette};

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    /// Two extra balls
    Multi,
    /// Wider paddle
    Expand,
    /// Balls plough through bricks
    Mega,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Multi, PowerUpKind::Expand, PowerUpKind::Mega];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn color(self) -> Rgba {
        match self {
            PowerUpKind::Multi => palette::POWERUP_MULTI,
            PowerUpKind::Expand => palette::POWERUP_EXPAND,
            PowerUpKind::Mega => palette::POWERUP_MEGA,
        }
    }

    /// Glyph drawn on the token
    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::Multi => "M",
            PowerUpKind::Expand => "E",
            PowerUpKind::Mega => "B",
        }
    }
}

/// A falling collectible
#[derive(Debug, Clone, PartialEq)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub size: f32,
}

impl PowerUp {
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::splat(self.size))
    }
}

/// Roll for a token drop at a destroyed brick's center
pub fn maybe_spawn(state: &mut GameState, at: Vec2) -> Option<PowerUpKind> {
    let chance = state.tuning.powerup_chance.clamp(0.0, 1.0);
    if !state.rng.random_bool(chance) {
        return None;
    }
    let kind = PowerUpKind::random(&mut state.rng);
    state.powerups.push(PowerUp {
        kind,
        pos: at,
        size: state.tuning.powerup_size,
    });
    log::debug!("Spawned {:?} token at ({:.0}, {:.0})", kind, at.x, at.y);
    Some(kind)
}

/// Move tokens down, collect those touching the paddle, drop those off-screen
///
/// Returns the kinds collected this step, already applied.
pub fn update_powerups(state: &mut GameState, now_ms: f64) -> Vec<PowerUpKind> {
    let fall = state.tuning.powerup_fall_speed;
    let bottom = state.viewport.height;
    let paddle = state.paddle.rect();

    let mut collected = Vec::new();
    state.powerups.retain_mut(|token| {
        token.pos.y += fall;
        if token.rect().overlaps(&paddle) {
            collected.push(token.kind);
            false
        } else {
            token.rect().min.y <= bottom
        }
    });

    for &kind in &collected {
        apply(state, kind, now_ms);
    }
    collected
}

/// Apply a collected power-up
pub fn apply(state: &mut GameState, kind: PowerUpKind, now_ms: f64) {
    match kind {
        PowerUpKind::Multi => split_ball(state),
        PowerUpKind::Expand => {
            let width = state.paddle.base_width * state.tuning.expand_factor;
            state.paddle.resize_width(width, state.viewport.width);
            state.effects.expanded = true;
            state
                .timers
                .schedule(TimerKind::ExpandRevert, now_ms + state.tuning.expand_duration_ms);
        }
        PowerUpKind::Mega => {
            let radius = state.tuning.ball_radius * state.tuning.mega_radius_factor;
            for ball in &mut state.balls {
                ball.radius = radius;
                ball.color = palette::MEGA_BALL;
            }
            state.effects.mega = true;
            state
                .timers
                .schedule(TimerKind::MegaRevert, now_ms + state.tuning.mega_duration_ms);
        }
    }
    log::info!("Power-up {:?} collected", kind);
    state.play(SoundCue::PowerUp);
    state.push_event(GameEvent::PowerUpCollected(kind));
}

/// Undo a timed effect; a no-op once the session is no longer playing
pub fn revert(state: &mut GameState, timer: TimerKind) {
    if !state.is_playing() {
        return;
    }
    let kind = match timer {
        TimerKind::ExpandRevert => {
            let width = state.paddle.base_width;
            state.paddle.resize_width(width, state.viewport.width);
            state.effects.expanded = false;
            PowerUpKind::Expand
        }
        TimerKind::MegaRevert => {
            let radius = state.tuning.ball_radius;
            for ball in &mut state.balls {
                ball.radius = radius;
                ball.color = palette::BALL;
            }
            state.effects.mega = false;
            PowerUpKind::Mega
        }
    };
    log::info!("Power-up {:?} expired", kind);
    state.push_event(GameEvent::PowerUpExpired(kind));
}

/// Clone the first ball twice, one veering left and one right, both heading up
fn split_ball(state: &mut GameState) {
    let template = match state.balls.first() {
        Some(ball) => ball.clone(),
        None => state.default_ball(),
    };
    let speed = template.speed.max(f32::EPSILON);

    for direction in [-1.0_f32, 1.0] {
        let dx = direction * speed * state.rng.random_range(0.3_f32..0.8);
        let dy = -(speed * speed - dx * dx).max(0.0).sqrt();
        state.balls.push(Ball {
            vel: Vec2::new(dx, dy),
            ..template.clone()
        });
    }
}
