//! Platform abstraction layer
//!
//! The core talks to its collaborators through these traits:
//! - `Surface`: 2D drawing primitives on the display
//! - `AudioSink`: named sound cues
//! - `Hud`: score/level/lives text and screen switching
//!
//! Input is mapped into `TickInput` by `input::InputState`. Headless
//! implementations used by tests and the native runner live in `headless`.

pub mod headless;
pub mod input;

use glam::Vec2;

use crate::color::Rgba;
use crate::sim::{Rect, SoundCue, Viewport};

pub use input::{InputState, Key};

/// Horizontal text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Drawing target owned by the front end
pub trait Surface {
    /// Current drawable size
    fn size(&self) -> Viewport;

    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Rgba);

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32, color: Rgba, line_width: f32);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    fn fill_text(&mut self, text: &str, at: Vec2, size: f32, align: TextAlign, color: Rgba);

    /// Opacity multiplier for subsequent draws, 1 = opaque
    fn set_global_alpha(&mut self, alpha: f32);

    /// Neon glow for subsequent fills; a blur of 0 turns it off
    fn set_glow(&mut self, blur: f32, color: Rgba);
}

/// Fire-and-forget sound playback
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Which overlay screen is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Playing,
    GameOver,
}

/// Text readouts and screen switching outside the canvas
pub trait Hud {
    fn set_score(&mut self, score: u64);
    fn set_level(&mut self, level: u32);
    fn set_lives(&mut self, lives: u32);
    fn set_high_score(&mut self, best: u64);
    fn show_final(&mut self, score: u64, level: u32);
    fn show_screen(&mut self, screen: Screen);
}
