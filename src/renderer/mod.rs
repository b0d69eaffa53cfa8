//! 2D rendering
//!
//! Draws the session onto a `Surface` back to front: trail-fade background,
//! bricks, paddle, particles, balls, tokens, then the level banner. Everything
//! but the background is offset by the current screen shake.

use glam::Vec2;

use crate::color::palette;
use crate::platform::{Surface, TextAlign};
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, Rect};

const BRICK_GLOW: f32 = 10.0;
const ENTITY_GLOW: f32 = 15.0;
const BRICK_CORNER: f32 = 4.0;
const TOKEN_CORNER: f32 = 5.0;
const TOKEN_FONT: f32 = 14.0;
const BANNER_FONT: f32 = 48.0;

/// Render one frame
pub fn render(state: &GameState, surface: &mut dyn Surface, settings: &Settings) {
    let size = surface.size();
    let screen = Rect::new(0.0, 0.0, size.width, size.height);
    if settings.effective_trails() {
        surface.fill_rect(screen, palette::TRAIL_FADE);
    } else {
        surface.fill_rect(screen, palette::BACKGROUND);
    }

    let offset = if settings.effective_screen_shake() {
        state.shake_offset
    } else {
        Vec2::ZERO
    };

    draw_bricks(state, surface, offset);
    draw_paddle(state, surface, offset);
    surface.set_glow(0.0, palette::BACKGROUND);

    if settings.particles {
        draw_particles(state, surface, offset);
    }
    draw_balls(state, surface, offset);
    draw_tokens(state, surface, offset);
    surface.set_glow(0.0, palette::BACKGROUND);

    if state.phase == GamePhase::LevelAdvance {
        surface.fill_text(
            &format!("LEVEL {}", state.level),
            Vec2::new(size.width / 2.0, size.height / 2.0),
            BANNER_FONT,
            TextAlign::Center,
            palette::TEXT,
        );
    }
}

fn shifted(rect: Rect, offset: Vec2) -> Rect {
    Rect {
        min: rect.min + offset,
        size: rect.size,
    }
}

fn draw_bricks(state: &GameState, surface: &mut dyn Surface, offset: Vec2) {
    for brick in state.grid.active() {
        surface.set_glow(BRICK_GLOW, brick.color);
        surface.fill_rounded_rect(shifted(brick.rect(), offset), BRICK_CORNER, brick.color);
    }
}

fn draw_paddle(state: &GameState, surface: &mut dyn Surface, offset: Vec2) {
    let paddle = &state.paddle;
    surface.set_glow(ENTITY_GLOW, palette::PADDLE);
    surface.fill_rounded_rect(
        shifted(paddle.rect(), offset),
        paddle.height / 2.0,
        palette::PADDLE,
    );
}

fn draw_particles(state: &GameState, surface: &mut dyn Surface, offset: Vec2) {
    if state.particles.is_empty() {
        return;
    }
    for particle in &state.particles {
        surface.set_global_alpha(particle.alpha.clamp(0.0, 1.0));
        surface.fill_circle(particle.pos + offset, particle.radius, particle.color);
    }
    surface.set_global_alpha(1.0);
}

fn draw_balls(state: &GameState, surface: &mut dyn Surface, offset: Vec2) {
    for ball in &state.balls {
        surface.set_glow(ENTITY_GLOW, ball.color);
        surface.fill_circle(ball.pos + offset, ball.radius, ball.color);
    }
}

fn draw_tokens(state: &GameState, surface: &mut dyn Surface, offset: Vec2) {
    for token in &state.powerups {
        let color = token.kind.color();
        let rect = shifted(token.rect(), offset);
        surface.set_glow(BRICK_GLOW, color);
        surface.fill_rounded_rect(rect, TOKEN_CORNER, color.with_alpha(0.25));
        surface.stroke_rounded_rect(rect, TOKEN_CORNER, color, 2.0);
        surface.fill_text(
            token.kind.label(),
            rect.center() + Vec2::new(0.0, TOKEN_FONT / 3.0),
            TOKEN_FONT,
            TextAlign::Center,
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::{DrawCommand, RecordingSurface};
    use crate::sim::{PowerUp, PowerUpKind, Viewport, start_session};
    use crate::tuning::Tuning;

    fn playing() -> GameState {
        let mut state = GameState::new(3, Viewport::new(1000.0, 700.0), Tuning::default());
        start_session(&mut state);
        state
    }

    fn rounded_rects(surface: &RecordingSurface) -> usize {
        surface.count(|c| matches!(c, DrawCommand::FillRoundedRect(..)))
    }

    #[test]
    fn test_draws_every_active_brick_and_the_paddle() {
        let mut state = playing();
        state.grid.bricks_mut()[0].active = false;
        let mut surface = RecordingSurface::new(state.viewport);
        render(&state, &mut surface, &Settings::default());

        assert_eq!(rounded_rects(&surface), 49 + 1);
        assert_eq!(
            surface.commands[0],
            DrawCommand::FillRect(Rect::new(0.0, 0.0, 1000.0, 700.0), palette::TRAIL_FADE)
        );
        assert_eq!(
            surface.count(|c| matches!(c, DrawCommand::FillCircle(_, _, color) if *color == palette::BALL)),
            1
        );
    }

    #[test]
    fn test_trails_off_paints_solid_background() {
        let state = playing();
        let settings = Settings {
            trails: false,
            ..Default::default()
        };
        let mut surface = RecordingSurface::new(state.viewport);
        render(&state, &mut surface, &settings);
        assert!(matches!(
            surface.commands[0],
            DrawCommand::FillRect(_, color) if color == palette::BACKGROUND
        ));
    }

    #[test]
    fn test_particles_toggle() {
        let mut state = playing();
        let center = state.grid.bricks()[0].center();
        crate::sim::create_explosion(
            &mut state.particles,
            &mut state.rng,
            center,
            palette::PADDLE,
            5,
            6.0,
            0.02,
        );

        let mut surface = RecordingSurface::new(state.viewport);
        render(&state, &mut surface, &Settings::default());
        // five particles plus one ball
        assert_eq!(
            surface.count(|c| matches!(c, DrawCommand::FillCircle(..))),
            6
        );

        let settings = Settings {
            particles: false,
            ..Default::default()
        };
        surface.clear();
        render(&state, &mut surface, &settings);
        assert_eq!(
            surface.count(|c| matches!(c, DrawCommand::FillCircle(..))),
            1
        );
    }

    #[test]
    fn test_shake_offsets_entities_unless_disabled() {
        let mut state = playing();
        state.shake_offset = Vec2::new(3.0, -2.0);
        let paddle_rect = state.paddle.rect();

        let mut surface = RecordingSurface::new(state.viewport);
        render(&state, &mut surface, &Settings::default());
        let shaken = shifted(paddle_rect, Vec2::new(3.0, -2.0));
        assert!(surface.commands.iter().any(
            |c| matches!(c, DrawCommand::FillRoundedRect(rect, _, color) if *rect == shaken && *color == palette::PADDLE)
        ));

        let settings = Settings {
            screen_shake: false,
            ..Default::default()
        };
        surface.clear();
        render(&state, &mut surface, &settings);
        assert!(surface.commands.iter().any(
            |c| matches!(c, DrawCommand::FillRoundedRect(rect, _, _) if *rect == paddle_rect)
        ));
    }

    #[test]
    fn test_tokens_and_banner() {
        let mut state = playing();
        state.powerups.push(PowerUp {
            kind: PowerUpKind::Mega,
            pos: Vec2::new(300.0, 300.0),
            size: 20.0,
        });
        state.phase = GamePhase::LevelAdvance;
        state.level = 2;

        let mut surface = RecordingSurface::new(state.viewport);
        render(&state, &mut surface, &Settings::default());
        assert_eq!(
            surface.count(|c| matches!(c, DrawCommand::StrokeRoundedRect(..))),
            1
        );
        assert_eq!(surface.texts(), vec!["B", "LEVEL 2"]);
    }
}
