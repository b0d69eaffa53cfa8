//! Neon Breakout - a paddle-and-ball brick breaker
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, physics, particles, power-ups, game state)
//! - `game`: Frame driver tying the simulation to the platform sinks
//! - `renderer`: Draws the simulation onto a 2D `Surface`
//! - `platform`: Display/audio/HUD/input seams plus headless implementations
//! - `persistence`: Key-value storage for the high score and settings
//! - `tuning`: Data-driven game balance

pub mod color;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use game::{Game, LoopControl};
pub use highscores::HighScore;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep. Per-step quantities in `Tuning` are tuned for 60 Hz.
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame delta fed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
}
