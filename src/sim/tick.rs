//! Fixed timestep simulation tick
//!
//! One call advances the session by one step. Velocities, fall speeds and
//! particle decay are all expressed per step.

use glam::Vec2;
use rand::Rng;

use super::collision::{Axis, bounce_velocity, brick_hit_axis, next_speed, paddle_offset, wall_hit};
use super::grid::BrickGrid;
use super::particles::{create_explosion, update_particles};
use super::powerups::{self, maybe_spawn};
use super::state::{Ball, GameEvent, GamePhase, GameState, SoundCue, Viewport};
use crate::color::palette;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Left arrow held
    pub left: bool,
    /// Right arrow held; wins over left
    pub right: bool,
    /// Pointer x in viewport coordinates, when it moved this step
    pub pointer_x: Option<f32>,
    /// Wall-clock time used for power-up durations
    pub now_ms: f64,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    match state.phase {
        GamePhase::Idle | GamePhase::GameOver => return,
        GamePhase::LevelAdvance => {
            decay_shake(state);
            update_particles(&mut state.particles, state.tuning.particle_damping);
            state.advance_frames = state.advance_frames.saturating_sub(1);
            if state.advance_frames == 0 {
                state.phase = GamePhase::Playing;
                log::debug!("Level {} underway", state.level);
            }
        }
        GamePhase::Playing => step_playing(state, input),
    }
    state.steps += 1;
}

/// Reset score, level and lives and begin play
pub fn start_session(state: &mut GameState) {
    state.score = 0;
    state.level = 1;
    state.lives = state.tuning.starting_lives;
    state.grid = BrickGrid::generate(state.viewport.width, state.level, &state.tuning);
    state.particles.clear();
    state.screen_shake = 0.0;
    state.shake_offset = Vec2::ZERO;
    state.advance_frames = 0;
    state.reset_ball_paddle();
    state.phase = GamePhase::Playing;
    state.push_event(GameEvent::SessionStarted);
    log::info!(
        "Session started: {} lives, {} bricks",
        state.lives,
        state.grid.active_count()
    );
}

/// Adopt a new viewport; the level's grid is rebuilt and the serve restarts
///
/// Score, level and lives are untouched.
pub fn resize(state: &mut GameState, viewport: Viewport) {
    state.viewport = viewport;
    state.grid = BrickGrid::generate(viewport.width, state.level, &state.tuning);
    state.particles.clear();
    state.reset_ball_paddle();
    log::info!(
        "Viewport resized to {}x{}, {} columns",
        viewport.width,
        viewport.height,
        state.grid.cols
    );
}

fn step_playing(state: &mut GameState, input: &TickInput) {
    decay_shake(state);

    for timer in state.timers.take_due(input.now_ms) {
        powerups::revert(state, timer);
    }

    update_particles(&mut state.particles, state.tuning.particle_damping);

    let mut balls = std::mem::take(&mut state.balls);
    balls.retain_mut(|ball| step_ball(state, ball));
    balls.append(&mut state.balls);
    state.balls = balls;

    powerups::update_powerups(state, input.now_ms);
    move_paddle(state, input);

    if state.balls.is_empty() {
        lose_life(state);
        if state.phase == GamePhase::GameOver {
            return;
        }
    }

    if state.grid.is_cleared() {
        begin_level_advance(state);
    }
}

fn decay_shake(state: &mut GameState) {
    state.screen_shake *= state.tuning.shake_decay;
    if state.screen_shake < 0.1 {
        state.screen_shake = 0.0;
        state.shake_offset = Vec2::ZERO;
        return;
    }
    let shake = state.screen_shake;
    state.shake_offset = Vec2::new(
        state.rng.random_range(-shake..=shake),
        state.rng.random_range(-shake..=shake),
    );
}

/// Move one ball and resolve its collisions; false once it is lost
fn step_ball(state: &mut GameState, ball: &mut Ball) -> bool {
    ball.pos += ball.vel;

    let walls = wall_hit(ball.projected(), ball.radius, state.viewport.width);
    let vel = walls.reflect(ball.vel);
    if vel != ball.vel {
        ball.vel = vel;
        state.play(SoundCue::Wall);
    }

    if ball.vel.y > 0.0 {
        paddle_bounce(state, ball);
    }

    if ball.projected().y > state.viewport.height - ball.radius {
        return false;
    }

    hit_bricks(state, ball);
    true
}

fn paddle_bounce(state: &mut GameState, ball: &mut Ball) {
    let paddle = state.paddle.rect();
    let next = ball.projected();

    let reaches_top = next.y + ball.radius >= paddle.min.y;
    let above_bottom = ball.pos.y <= paddle.max().y;
    let over_paddle = ball.pos.x >= paddle.min.x && ball.pos.x <= paddle.max().x;
    if !(reaches_top && above_bottom && over_paddle) {
        return;
    }

    let offset = paddle_offset(ball.pos.x, paddle.min.x, paddle.size.x);
    ball.speed = next_speed(
        ball.speed,
        state.tuning.ball_speed_increment,
        state.tuning.ball_max_speed,
    );
    ball.vel = bounce_velocity(offset, ball.speed);
    ball.pos.y = paddle.min.y - ball.radius;

    state.play(SoundCue::Paddle);
    create_explosion(
        &mut state.particles,
        &mut state.rng,
        Vec2::new(ball.pos.x, paddle.min.y),
        palette::PADDLE,
        state.tuning.paddle_particles,
        state.tuning.particle_spread,
        state.tuning.particle_decay,
    );
}

/// Mega balls destroy everything they overlap; others reflect off the first brick
fn hit_bricks(state: &mut GameState, ball: &mut Ball) {
    let mega = state.effects.mega;
    let bounds = ball.bounds();

    for index in 0..state.grid.bricks().len() {
        let brick = &state.grid.bricks()[index];
        if !brick.active {
            continue;
        }
        let Some(axis) = brick_hit_axis(&bounds, &brick.rect()) else {
            continue;
        };

        destroy_brick(state, index);
        if mega {
            continue;
        }
        match axis {
            Axis::Horizontal => ball.vel.x = -ball.vel.x,
            Axis::Vertical => ball.vel.y = -ball.vel.y,
        }
        break;
    }
}

fn destroy_brick(state: &mut GameState, index: usize) {
    let brick = &mut state.grid.bricks_mut()[index];
    brick.active = false;
    let (center, color) = (brick.center(), brick.color);

    let points = state.tuning.brick_points;
    state.score += points;
    state.push_event(GameEvent::BrickDestroyed { points });
    state.play(SoundCue::Brick);

    create_explosion(
        &mut state.particles,
        &mut state.rng,
        center,
        color,
        state.tuning.explosion_particles,
        state.tuning.particle_spread,
        state.tuning.particle_decay,
    );
    state.screen_shake = state.screen_shake.max(state.tuning.shake_intensity);
    maybe_spawn(state, center);
}

fn move_paddle(state: &mut GameState, input: &TickInput) {
    let width = state.viewport.width;

    if let Some(x) = input.pointer_x.filter(|&x| x > 0.0 && x < width) {
        state.paddle.set_center(x, width);
    }

    let speed = state.paddle.speed;
    if input.right {
        state.paddle.move_by(speed, width);
    } else if input.left {
        state.paddle.move_by(-speed, width);
    }
}

fn lose_life(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);
    state.play(SoundCue::Life);
    state.push_event(GameEvent::LifeLost {
        lives_left: state.lives,
    });

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.timers.cancel_all();
        log::info!("Game over: score {} on level {}", state.score, state.level);
        state.push_event(GameEvent::GameOver {
            score: state.score,
            level: state.level,
        });
    } else {
        log::info!("Ball lost, {} lives left", state.lives);
        state.reset_ball_paddle();
    }
}

fn begin_level_advance(state: &mut GameState) {
    if state.grid.cols == 0 {
        log::warn!("Level {} has no bricks, advancing", state.level);
    }

    state.level += 1;
    state.grid = BrickGrid::generate(state.viewport.width, state.level, &state.tuning);
    state.reset_ball_paddle();
    state.advance_frames = state.tuning.level_advance_frames;
    state.phase = if state.advance_frames > 0 {
        GamePhase::LevelAdvance
    } else {
        GamePhase::Playing
    };

    log::info!(
        "Level {}: {} pattern, {} bricks",
        state.level,
        state.grid.pattern.name(),
        state.grid.active_count()
    );
    state.push_event(GameEvent::LevelAdvanced { level: state.level });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Pattern;
    use crate::sim::powerups::{PowerUp, PowerUpKind};
    use crate::sim::timers::TimerKind;
    use crate::tuning::Tuning;

    fn started(seed: u64) -> GameState {
        let tuning = Tuning {
            powerup_chance: 0.0,
            ..Default::default()
        };
        let mut state = GameState::new(seed, Viewport::new(1000.0, 700.0), tuning);
        start_session(&mut state);
        state.drain_events();
        state
    }

    fn only_ball(state: &mut GameState, pos: Vec2, vel: Vec2) {
        let mut ball = state.balls[0].clone();
        ball.pos = pos;
        ball.vel = vel;
        ball.speed = vel.length();
        state.balls = vec![ball];
    }

    fn count_events(state: &GameState, wanted: impl Fn(&GameEvent) -> bool) -> usize {
        state.events().iter().filter(|e| wanted(e)).count()
    }

    #[test]
    fn test_idle_does_not_advance() {
        let mut state = GameState::new(1, Viewport::new(1000.0, 700.0), Tuning::default());
        let before = state.balls.clone();
        tick(&mut state, &TickInput::default());
        assert_eq!(state.steps, 0);
        assert_eq!(state.balls, before);
    }

    #[test]
    fn test_start_session_resets_counters() {
        let mut state = started(1);
        state.score = 300;
        state.level = 4;
        state.lives = 1;
        start_session(&mut state);

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!((state.score, state.level, state.lives), (0, 1, 3));
        assert_eq!(state.grid.pattern, Pattern::Full);
        assert_eq!(state.grid.active_count(), 50);
        assert_eq!(state.events(), &[GameEvent::SessionStarted]);
    }

    #[test]
    fn test_brick_hit_scores_and_reflects() {
        let mut state = started(2);
        // Just under brick (0, 4), whose bottom edge is y = 200
        only_ball(&mut state, Vec2::new(112.0, 212.0), Vec2::new(0.0, -6.0));
        tick(&mut state, &TickInput::default());

        assert_eq!(state.score, 10);
        assert_eq!(state.lives, 3);
        assert!(!state.grid.get(0, 4).unwrap().active);
        assert_eq!(state.grid.active_count(), 49);
        assert_eq!(state.balls[0].vel, Vec2::new(0.0, 6.0));
        assert_eq!(state.particles.len(), 15);
        assert_eq!(state.screen_shake, 5.0);
        assert_eq!(
            count_events(&state, |e| *e == GameEvent::Sound(SoundCue::Brick)),
            1
        );
    }

    #[test]
    fn test_mega_ball_ploughs_through() {
        let mut state = started(3);
        powerups::apply(&mut state, PowerUpKind::Mega, 0.0);
        state.drain_events();
        // Radius 12 after the move overlaps rows 3 and 4 of column 0
        only_ball(&mut state, Vec2::new(112.0, 187.0), Vec2::new(0.0, -6.0));
        state.balls[0].radius = 12.0;
        tick(&mut state, &TickInput::default());

        assert_eq!(state.score, 20);
        assert!(!state.grid.get(0, 3).unwrap().active);
        assert!(!state.grid.get(0, 4).unwrap().active);
        assert_eq!(state.balls[0].vel, Vec2::new(0.0, -6.0));
    }

    #[test]
    fn test_paddle_bounce_speeds_up() {
        let mut state = started(4);
        only_ball(&mut state, Vec2::new(500.0, 655.0), Vec2::new(0.0, 6.0));
        tick(&mut state, &TickInput::default());

        let ball = &state.balls[0];
        assert!((ball.speed - 6.1).abs() < 1e-5);
        assert!(ball.vel.x.abs() < 1e-5);
        assert!((ball.vel.y + 6.1).abs() < 1e-5);
        assert_eq!(ball.pos.y, 662.0);
        assert!(state.events().contains(&GameEvent::Sound(SoundCue::Paddle)));
        assert_eq!(state.particles.len(), 6);
    }

    #[test]
    fn test_side_wall_reflects() {
        let mut state = started(5);
        only_ball(&mut state, Vec2::new(985.0, 400.0), Vec2::new(4.0, -4.0));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.balls[0].vel, Vec2::new(-4.0, -4.0));
        assert!(state.events().contains(&GameEvent::Sound(SoundCue::Wall)));
    }

    #[test]
    fn test_mega_growth_beside_a_wall_does_not_stick() {
        let cases: [(Vec2, Vec2, fn(Vec2) -> f32); 2] = [
            (Vec2::new(10.0, 400.0), Vec2::new(-1.0, -1.0), |p| p.x),
            (Vec2::new(500.0, 10.0), Vec2::new(1.0, -1.0), |p| p.y),
        ];
        for (pos, vel, gap) in cases {
            let mut state = started(12);
            only_ball(&mut state, pos, vel);
            powerups::apply(&mut state, PowerUpKind::Mega, 0.0);
            state.drain_events();

            let mut gaps = Vec::new();
            for _ in 0..8 {
                tick(&mut state, &TickInput::default());
                gaps.push(gap(state.balls[0].pos));
            }

            let wall_cues = state
                .events()
                .iter()
                .filter(|e| **e == GameEvent::Sound(SoundCue::Wall))
                .count();
            assert_eq!(wall_cues, 1);
            // Pulling away from the wall after the first bounce
            assert!(gaps.windows(2).all(|w| w[1] > w[0]), "{:?}", gaps);
        }
    }

    #[test]
    fn test_last_ball_on_last_life_ends_the_game() {
        let mut state = started(6);
        state.lives = 1;
        state.score = 120;
        only_ball(&mut state, Vec2::new(50.0, 690.0), Vec2::new(0.0, 6.0));
        tick(&mut state, &TickInput::default());

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);
        assert_eq!(state.score, 120);
        assert!(state.events().contains(&GameEvent::GameOver {
            score: 120,
            level: 1
        }));

        let steps = state.steps;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.steps, steps);
    }

    #[test]
    fn test_losing_a_ball_with_lives_left_reserves() {
        let mut state = started(7);
        state.paddle.pos.x = 0.0;
        only_ball(&mut state, Vec2::new(900.0, 690.0), Vec2::new(0.0, 6.0));
        tick(&mut state, &TickInput::default());

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, 2);
        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.balls[0].pos, Vec2::new(500.0, 662.0));
        assert_eq!(state.paddle.pos.x, 440.0);
        assert!(state.events().contains(&GameEvent::LifeLost { lives_left: 2 }));
    }

    #[test]
    fn test_multiball_only_loses_a_life_with_the_last_ball() {
        let mut state = started(8);
        only_ball(&mut state, Vec2::new(50.0, 690.0), Vec2::new(0.0, 6.0));
        let mut spare = state.balls[0].clone();
        spare.pos = Vec2::new(300.0, 400.0);
        spare.vel = Vec2::new(0.0, -4.0);
        state.balls.push(spare);

        tick(&mut state, &TickInput::default());
        assert_eq!(state.lives, 3);
        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.balls[0].pos, Vec2::new(300.0, 396.0));
    }

    #[test]
    fn test_clearing_the_grid_advances_exactly_once() {
        let mut state = started(9);
        for brick in state.grid.bricks_mut() {
            brick.active = brick.col == 0 && brick.row == 4;
        }
        only_ball(&mut state, Vec2::new(112.0, 212.0), Vec2::new(0.0, -6.0));
        tick(&mut state, &TickInput::default());

        assert_eq!(state.level, 2);
        assert_eq!(state.phase, GamePhase::LevelAdvance);
        assert_eq!(state.grid.pattern, Pattern::Checker);
        assert_eq!(state.grid.active_count(), 25);
        assert_eq!(
            count_events(&state, |e| matches!(e, GameEvent::LevelAdvanced { .. })),
            1
        );

        for _ in 0..44 {
            tick(&mut state, &TickInput::default());
            assert_eq!(state.phase, GamePhase::LevelAdvance);
        }
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level, 2);
        assert_eq!(
            count_events(&state, |e| matches!(e, GameEvent::LevelAdvanced { .. })),
            1
        );
    }

    #[test]
    fn test_zero_column_grid_counts_as_cleared() {
        let tuning = Tuning {
            level_advance_frames: 0,
            ..Default::default()
        };
        let mut state = GameState::new(10, Viewport::new(100.0, 700.0), tuning);
        start_session(&mut state);
        assert_eq!(state.grid.cols, 0);

        tick(&mut state, &TickInput::default());
        assert_eq!(state.level, 2);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_expand_reverts_on_schedule() {
        let mut state = started(11);
        state.powerups.push(PowerUp {
            kind: PowerUpKind::Expand,
            pos: Vec2::new(state.paddle.center_x(), state.paddle.pos.y - 5.0),
            size: 20.0,
        });

        let at = |now_ms| TickInput {
            now_ms,
            ..Default::default()
        };
        tick(&mut state, &at(1_000.0));
        assert_eq!(state.paddle.width, 180.0);
        tick(&mut state, &at(10_999.0));
        assert_eq!(state.paddle.width, 180.0);
        tick(&mut state, &at(11_000.0));
        assert_eq!(state.paddle.width, 120.0);
        assert!(
            state
                .events()
                .contains(&GameEvent::PowerUpExpired(PowerUpKind::Expand))
        );
    }

    #[test]
    fn test_life_loss_cancels_pending_effects() {
        let mut state = started(12);
        powerups::apply(&mut state, PowerUpKind::Expand, 0.0);
        only_ball(&mut state, Vec2::new(50.0, 690.0), Vec2::new(0.0, 6.0));
        tick(&mut state, &TickInput::default());

        assert_eq!(state.lives, 2);
        assert_eq!(state.paddle.width, 120.0);
        assert!(!state.effects.expanded);
        assert!(!state.timers.is_pending(TimerKind::ExpandRevert));
    }

    #[test]
    fn test_paddle_input() {
        let mut state = started(13);
        let input = TickInput {
            pointer_x: Some(300.0),
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.paddle.pos.x, 240.0);

        let input = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.paddle.pos.x, 248.0);

        // Pointer outside the canvas is ignored
        let input = TickInput {
            pointer_x: Some(-5.0),
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.paddle.pos.x, 248.0);
    }

    #[test]
    fn test_resize_keeps_progress() {
        let mut state = started(14);
        state.score = 50;
        state.level = 3;
        state.lives = 2;
        resize(&mut state, Viewport::new(800.0, 600.0));

        assert_eq!((state.score, state.level, state.lives), (50, 3, 2));
        assert_eq!(state.grid.cols, 8);
        assert_eq!(state.grid.pattern, Pattern::Pyramid);
        assert_eq!(state.paddle.pos, Vec2::new(340.0, 570.0));
        assert_eq!(state.balls.len(), 1);
    }

    #[test]
    fn test_shake_decays_to_zero() {
        let mut state = started(15);
        state.screen_shake = 5.0;
        tick(&mut state, &TickInput::default());
        assert!((state.screen_shake - 4.5).abs() < 1e-5);
        assert!(state.shake_offset.x.abs() <= 4.5 && state.shake_offset.y.abs() <= 4.5);

        for _ in 0..40 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.screen_shake, 0.0);
        assert_eq!(state.shake_offset, Vec2::ZERO);
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = started(99);
        let mut b = started(99);
        a.tuning.powerup_chance = 0.5;
        b.tuning.powerup_chance = 0.5;
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut a, &input);
            tick(&mut b, &input);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.lives, b.lives);
        assert_eq!(a.balls, b.balls);
        assert_eq!(a.particles, b.particles);
    }
}
