//! Colors shared by the simulation and the renderer

/// An sRGB color with straight alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from hue (degrees, wraps), saturation and lightness (0-1)
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(to_byte(r), to_byte(g), to_byte(b))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// CSS color string for canvas fill/stroke styles
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
    }
}

pub mod palette {
    use super::Rgba;

    pub const PADDLE: Rgba = Rgba::rgb(0, 255, 255);
    pub const BALL: Rgba = Rgba::rgb(255, 0, 255);
    pub const MEGA_BALL: Rgba = Rgba::rgb(255, 200, 0);
    pub const TRAIL_FADE: Rgba = Rgba::rgba(5, 5, 5, 0.3);
    pub const BACKGROUND: Rgba = Rgba::rgb(5, 5, 5);
    pub const TEXT: Rgba = Rgba::rgb(255, 255, 255);
    pub const POWERUP_MULTI: Rgba = Rgba::rgb(0, 255, 128);
    pub const POWERUP_EXPAND: Rgba = Rgba::rgb(64, 160, 255);
    pub const POWERUP_MEGA: Rgba = Rgba::rgb(255, 140, 0);
}
