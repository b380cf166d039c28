//! Color representations

use serde::{Deserialize, Serialize};

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to hue/saturation/value
    pub fn to_hsv(self) -> Hsv {
        Hsv::from_rgb(self.r as f64, self.g as f64, self.b as f64)
    }
}

/// A hue/saturation/value color.
///
/// Hue is in degrees `[0, 360)`, saturation and value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    pub const fn new(h: f64, s: f64, v: f64) -> Self {
        Self { h, s, v }
    }

    /// Hexcone conversion from RGB channels on the `0..=255` scale.
    ///
    /// Channels may be fractional, which is what averaging a cluster's
    /// colors produces.
    pub fn from_rgb(r: f64, g: f64, b: f64) -> Self {
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);

        let v = max / 255.0;
        if max <= 0.0 {
            return Self::new(0.0, 0.0, v);
        }

        let diff = max - min;
        let s = diff / max;
        if diff <= 0.0 {
            return Self::new(0.0, s, v);
        }

        let mut h = if r == max {
            60.0 * (g - b) / diff
        } else if g == max {
            60.0 * (2.0 + (b - r) / diff)
        } else {
            60.0 * (4.0 + (r - g) / diff)
        };
        if h < 0.0 {
            h += 360.0;
        }

        Self::new(h, s, v)
    }

    /// Channels as an array in `[h, s, v]` order
    pub fn channels(&self) -> [f64; 3] {
        [self.h, self.s, self.v]
    }
}

impl From<Rgb> for Hsv {
    fn from(rgb: Rgb) -> Self {
        rgb.to_hsv()
    }
}
