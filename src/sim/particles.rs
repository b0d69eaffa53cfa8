//! Explosion particles
//!
//! Purely cosmetic, but they live in the session state so the renderer and
//! tests see the same deterministic stream.

use glam::Vec2;
use rand::Rng;

use crate::color::Rgba;

/// A short-lived colored dot
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Rgba,
    /// Opacity, 1 at spawn; the particle dies once it reaches 0
    pub alpha: f32,
    /// Alpha lost per step
    pub decay: f32,
}

impl Particle {
    /// Advance one step: move, damp, fade
    pub fn update(&mut self, damping: f32) {
        self.pos += self.vel;
        self.vel *= damping;
        self.alpha -= self.decay;
    }

    pub fn is_alive(&self) -> bool {
        self.alpha > 0.0
    }
}

/// Spawn `count` particles at `at`
///
/// Each gets a radius in [1, 4) and a velocity per axis in
/// `[-spread/2, spread/2)`.
pub fn create_explosion(
    particles: &mut Vec<Particle>,
    rng: &mut impl Rng,
    at: Vec2,
    color: Rgba,
    count: usize,
    spread: f32,
    decay: f32,
) {
    particles.reserve(count);
    for _ in 0..count {
        let vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * spread,
            (rng.random::<f32>() - 0.5) * spread,
        );
        particles.push(Particle {
            pos: at,
            vel,
            radius: rng.random::<f32>() * 3.0 + 1.0,
            color,
            alpha: 1.0,
            decay,
        });
    }
}

/// Age every particle one step and drop the ones that faded out
pub fn update_particles(particles: &mut Vec<Particle>, damping: f32) {
    particles.retain_mut(|p| {
        p.update(damping);
        p.is_alive()
    });
}
