//! Headless collaborators
//!
//! Recording sinks for tests and the native runner, plus a simple autopilot
//! that keeps the paddle under the most dangerous ball.

use glam::Vec2;

use super::{AudioSink, Hud, Screen, Surface, TextAlign};
use crate::color::Rgba;
use crate::sim::{GameState, Rect, SoundCue, TickInput, Viewport};

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect(Rect, Rgba),
    FillRoundedRect(Rect, f32, Rgba),
    StrokeRoundedRect(Rect, f32, Rgba),
    FillCircle(Vec2, f32, Rgba),
    FillText(String, Vec2, Rgba),
    GlobalAlpha(f32),
    Glow(f32),
}

/// Surface that records every call instead of drawing
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    viewport: Viewport,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText(text, ..) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| wanted(c)).count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Viewport {
        self.viewport
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::FillRect(rect, color));
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Rgba) {
        self.commands
            .push(DrawCommand::FillRoundedRect(rect, radius, color));
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32, color: Rgba, _line_width: f32) {
        self.commands
            .push(DrawCommand::StrokeRoundedRect(rect, radius, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands
            .push(DrawCommand::FillCircle(center, radius, color));
    }

    fn fill_text(&mut self, text: &str, at: Vec2, _size: f32, _align: TextAlign, color: Rgba) {
        self.commands
            .push(DrawCommand::FillText(text.to_string(), at, color));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::GlobalAlpha(alpha));
    }

    fn set_glow(&mut self, blur: f32, _color: Rgba) {
        self.commands.push(DrawCommand::Glow(blur));
    }
}

/// Audio sink that remembers the cues it was asked to play
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub played: Vec<SoundCue>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: SoundCue) {
        self.played.push(cue);
    }
}

/// HUD that keeps the last value written to each readout
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingHud {
    pub score: u64,
    pub level: u32,
    pub lives: u32,
    pub high_score: u64,
    pub final_result: Option<(u64, u32)>,
    pub screen: Screen,
}

impl Default for RecordingHud {
    fn default() -> Self {
        Self {
            score: 0,
            level: 0,
            lives: 0,
            high_score: 0,
            final_result: None,
            screen: Screen::Start,
        }
    }
}

impl Hud for RecordingHud {
    fn set_score(&mut self, score: u64) {
        self.score = score;
    }

    fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    fn set_lives(&mut self, lives: u32) {
        self.lives = lives;
    }

    fn set_high_score(&mut self, best: u64) {
        self.high_score = best;
    }

    fn show_final(&mut self, score: u64, level: u32) {
        self.final_result = Some((score, level));
    }

    fn show_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }
}

/// Steer toward the lowest descending ball, or a falling token when every ball rises
pub fn autopilot(state: &GameState, now_ms: f64) -> TickInput {
    let width = state.viewport.width;

    let threat = state
        .balls
        .iter()
        .filter(|b| b.vel.y > 0.0)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    let target = match threat {
        Some(ball) => Some(ball.pos.x),
        None => state
            .powerups
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|token| token.pos.x),
    };

    TickInput {
        pointer_x: target.map(|x| x.clamp(1.0, (width - 1.0).max(1.0))),
        now_ms,
        ..Default::default()
    }
}
