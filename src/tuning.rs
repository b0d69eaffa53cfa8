//! Data-driven game balance
//!
//! Every gameplay constant lives here so a JSON file can override any subset.
//! Distances are in CSS pixels, speeds in pixels per simulation step.

use serde::{Deserialize, Serialize};

use crate::persistence::StorageError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Keyboard movement per step
    pub paddle_speed: f32,
    /// Distance from the bottom edge to the paddle's top
    pub paddle_bottom_offset: f32,

    // === Ball ===
    pub ball_radius: f32,
    /// Per-axis launch speed at level 0
    pub ball_base_speed: f32,
    /// Per-axis launch speed added per level
    pub ball_speed_per_level: f32,
    /// Speed gained on each paddle bounce
    pub ball_speed_increment: f32,
    pub ball_max_speed: f32,

    // === Bricks ===
    pub brick_width: f32,
    pub brick_height: f32,
    pub brick_padding: f32,
    pub brick_offset_x: f32,
    pub brick_offset_y: f32,
    pub brick_rows: usize,
    pub brick_points: u64,

    // === Session ===
    pub starting_lives: u32,
    /// Steps spent in the level-advance phase before play resumes
    pub level_advance_frames: u32,

    // === Particles ===
    pub explosion_particles: usize,
    pub paddle_particles: usize,
    /// Full width of the per-axis velocity range
    pub particle_spread: f32,
    pub particle_decay: f32,
    /// Velocity multiplier applied every step
    pub particle_damping: f32,

    // === Power-ups ===
    pub powerup_chance: f64,
    pub powerup_fall_speed: f32,
    pub powerup_size: f32,
    pub expand_factor: f32,
    pub expand_duration_ms: f64,
    pub mega_radius_factor: f32,
    pub mega_duration_ms: f64,

    // === Screen shake ===
    pub shake_intensity: f32,
    pub shake_decay: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            paddle_width: 120.0,
            paddle_height: 15.0,
            paddle_speed: 8.0,
            paddle_bottom_offset: 30.0,

            ball_radius: 8.0,
            ball_base_speed: 4.0,
            ball_speed_per_level: 0.5,
            ball_speed_increment: 0.1,
            ball_max_speed: 15.0,

            brick_width: 75.0,
            brick_height: 20.0,
            brick_padding: 10.0,
            brick_offset_x: 45.0,
            brick_offset_y: 60.0,
            brick_rows: 5,
            brick_points: 10,

            starting_lives: 3,
            level_advance_frames: 45,

            explosion_particles: 15,
            paddle_particles: 6,
            particle_spread: 6.0,
            particle_decay: 0.02,
            particle_damping: 0.98,

            powerup_chance: 0.2,
            powerup_fall_speed: 3.0,
            powerup_size: 20.0,
            expand_factor: 1.5,
            expand_duration_ms: 10_000.0,
            mega_radius_factor: 1.5,
            mega_duration_ms: 8_000.0,

            shake_intensity: 5.0,
            shake_decay: 0.9,
        }
    }
}

impl Tuning {
    /// Parse a tuning override; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        log::info!("Loaded tuning override");
        Ok(tuning)
    }

    /// Per-axis launch speed for a level
    pub fn launch_speed(&self, level: u32) -> f32 {
        self.ball_base_speed + level as f32 * self.ball_speed_per_level
    }
}
