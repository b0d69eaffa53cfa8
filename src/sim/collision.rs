//! Collision detection and response for axis-aligned geometry
//!
//! Bricks, the paddle and power-up tokens are boxes; balls are tested through
//! their bounding box, which is how brick hits have always been resolved here.

use std::f32::consts::FRAC_PI_3;

use glam::Vec2;

/// Largest bounce angle off the paddle, measured from vertical (60°)
pub const MAX_BOUNCE_ANGLE: f32 = FRAC_PI_3;

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size / 2.0,
            size,
        }
    }

    /// Bounding box of a circle
    pub fn around_circle(center: Vec2, radius: f32) -> Self {
        Self::from_center(center, Vec2::splat(radius * 2.0))
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    /// Strict overlap test (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x && a_max.x > other.min.x && self.min.y < b_max.y && a_max.y > other.min.y
    }
}

/// Velocity component to negate after a brick hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Side hit: negate dx
    Horizontal,
    /// Top/bottom hit: negate dy
    Vertical,
}

/// Check a ball's bounding box against a brick
///
/// Returns the reflection axis on overlap: whichever penetration is shallower
/// is the side the ball came through.
pub fn brick_hit_axis(ball: &Rect, brick: &Rect) -> Option<Axis> {
    if !ball.overlaps(brick) {
        return None;
    }

    let ball_max = ball.max();
    let brick_max = brick.max();
    let penetration_x = (ball_max.x - brick.min.x).min(brick_max.x - ball.min.x);
    let penetration_y = (ball_max.y - brick.min.y).min(brick_max.y - ball.min.y);

    if penetration_x < penetration_y {
        Some(Axis::Horizontal)
    } else {
        Some(Axis::Vertical)
    }
}

/// Which walls a projected ball position crosses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallHit {
    pub left: bool,
    pub right: bool,
    pub top: bool,
}

impl WallHit {
    pub fn any(&self) -> bool {
        self.left || self.right || self.top
    }

    /// Velocity pointing back into the playfield for every wall touched
    ///
    /// Sign is forced rather than flipped, so a ball still overlapping a wall
    /// on the next step keeps heading away from it.
    pub fn reflect(&self, vel: Vec2) -> Vec2 {
        let mut out = vel;
        if self.left {
            out.x = vel.x.abs();
        } else if self.right {
            out.x = -vel.x.abs();
        }
        if self.top {
            out.y = vel.y.abs();
        }
        out
    }
}

/// Check the projected next position against the left/right/top bounds
pub fn wall_hit(next: Vec2, radius: f32, width: f32) -> WallHit {
    WallHit {
        left: next.x < radius,
        right: next.x > width - radius,
        top: next.y < radius,
    }
}

/// Normalized hit offset from the paddle center: 0 = center, -1/+1 = edges
pub fn paddle_offset(ball_x: f32, paddle_x: f32, paddle_width: f32) -> f32 {
    let half = paddle_width / 2.0;
    if half <= 0.0 {
        return 0.0;
    }
    ((ball_x - (paddle_x + half)) / half).clamp(-1.0, 1.0)
}

/// Outgoing velocity for a paddle hit at `offset` with the given speed
///
/// The angle from vertical scales linearly with the offset up to 60°.
pub fn bounce_velocity(offset: f32, speed: f32) -> Vec2 {
    let angle = offset.clamp(-1.0, 1.0) * MAX_BOUNCE_ANGLE;
    Vec2::new(speed * angle.sin(), -speed * angle.cos())
}

/// Speed after a paddle bounce: one increment, never above the cap, never lower
pub fn next_speed(speed: f32, increment: f32, max_speed: f32) -> f32 {
    if speed >= max_speed {
        speed
    } else {
        (speed + increment).min(max_speed)
    }
}
