//! Brick grid generation
//!
//! The column count follows the viewport width; which cells start active is
//! decided by a pattern chosen from the level number.

use glam::Vec2;

use super::collision::Rect;
use crate::color::Rgba;
use crate::tuning::Tuning;

/// Level-indexed rule deciding which grid cells start active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Full,
    Checker,
    Pyramid,
    Diamond,
}

impl Pattern {
    pub const ALL: [Pattern; 4] = [
        Pattern::Full,
        Pattern::Checker,
        Pattern::Pyramid,
        Pattern::Diamond,
    ];

    /// Pattern for a 1-based level: `(level - 1) mod 4`
    pub fn for_level(level: u32) -> Self {
        let index = level.saturating_sub(1) as usize % Self::ALL.len();
        Self::ALL[index]
    }

    /// Whether cell (col, row) starts active in a `cols` x `rows` grid
    pub fn is_active(self, col: usize, row: usize, cols: usize, rows: usize) -> bool {
        match self {
            Pattern::Full => true,
            Pattern::Checker => (col + row) % 2 == 0,
            Pattern::Pyramid => row >= col.abs_diff(cols / 2),
            Pattern::Diamond => {
                let distance = col.abs_diff(cols / 2) + row.abs_diff(rows / 2);
                let radius = (rows as f32 / 2.0).max(2.0);
                distance as f32 <= radius
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Pattern::Full => "full",
            Pattern::Checker => "checker",
            Pattern::Pyramid => "pyramid",
            Pattern::Diamond => "diamond",
        }
    }
}

/// A single grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct Brick {
    pub col: usize,
    pub row: usize,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub active: bool,
    pub color: Rgba,
}

impl Brick {
    pub fn rect(&self) -> Rect {
        Rect {
            min: self.pos,
            size: self.size,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// The brick layout for one level
#[derive(Debug, Clone, PartialEq)]
pub struct BrickGrid {
    pub cols: usize,
    pub rows: usize,
    /// Left edge of the first column (centers the grid)
    pub start_x: f32,
    pub pattern: Pattern,
    /// Column-major: index = col * rows + row
    bricks: Vec<Brick>,
}

/// Columns that fit the viewport width (0 when the viewport is too narrow)
pub fn column_count(width: f32, tuning: &Tuning) -> usize {
    let cell = tuning.brick_width + tuning.brick_padding;
    if cell <= 0.0 {
        return 0;
    }
    let usable = width - 2.0 * tuning.brick_offset_x;
    if usable <= 0.0 {
        return 0;
    }
    (usable / cell).floor() as usize
}

impl BrickGrid {
    /// Build the grid for a viewport width and level
    pub fn generate(width: f32, level: u32, tuning: &Tuning) -> Self {
        let cols = column_count(width, tuning);
        let rows = tuning.brick_rows;
        let pattern = Pattern::for_level(level);
        let cell_w = tuning.brick_width + tuning.brick_padding;
        let cell_h = tuning.brick_height + tuning.brick_padding;
        let start_x = (width - cols as f32 * cell_w) / 2.0;

        let mut bricks = Vec::with_capacity(cols * rows);
        for col in 0..cols {
            for row in 0..rows {
                bricks.push(Brick {
                    col,
                    row,
                    pos: Vec2::new(
                        start_x + col as f32 * cell_w,
                        tuning.brick_offset_y + row as f32 * cell_h,
                    ),
                    size: Vec2::new(tuning.brick_width, tuning.brick_height),
                    active: pattern.is_active(col, row, cols, rows),
                    color: Rgba::from_hsl((col * 30 + row * 20) as f32, 0.7, 0.5),
                });
            }
        }

        if cols == 0 {
            log::warn!("Viewport {}px wide fits no brick columns", width);
        }
        log::debug!(
            "Generated {}x{} {} grid, {} active",
            cols,
            rows,
            pattern.name(),
            bricks.iter().filter(|b| b.active).count()
        );

        Self {
            cols,
            rows,
            start_x,
            pattern,
            bricks,
        }
    }

    pub fn get(&self, col: usize, row: usize) -> Option<&Brick> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.bricks.get(col * self.rows + row)
    }

    pub fn bricks(&self) -> &[Brick] {
        &self.bricks
    }

    pub fn bricks_mut(&mut self) -> &mut [Brick] {
        &mut self.bricks
    }

    pub fn active(&self) -> impl Iterator<Item = &Brick> {
        self.bricks.iter().filter(|b| b.active)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// A grid with no active bricks is a cleared level
    pub fn is_cleared(&self) -> bool {
        self.active_count() == 0
    }
}
