//! Diverging red→yellow→green color scale for difference cells.

use serde::{Deserialize, Serialize};

/// ColorBrewer RdYlGn 11-class anchors, red end first.
const RDYLGN: [(u8, u8, u8); 11] = [
    (165, 0, 38),
    (215, 48, 39),
    (244, 109, 67),
    (253, 174, 97),
    (254, 224, 139),
    (255, 255, 191),
    (217, 239, 139),
    (166, 217, 106),
    (102, 189, 99),
    (26, 152, 80),
    (0, 104, 55),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn css(&self) -> String {
        format!("background-color: rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Maps a numeric difference onto the RdYlGn ramp over a fixed symmetric
/// normalization range. Share diffs use ±10, time diffs ±500 with the scale
/// inverted (a negative time diff means faster, which is good).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DivergingScale {
    pub vmin: f64,
    pub vmax: f64,
    pub invert: bool,
}

impl DivergingScale {
    pub fn symmetric(range: f64) -> Self {
        Self {
            vmin: -range,
            vmax: range,
            invert: false,
        }
    }

    pub fn inverted(range: f64) -> Self {
        Self {
            vmin: -range,
            vmax: range,
            invert: true,
        }
    }

    /// Color for a difference value; out-of-range values clamp to the ends.
    pub fn color(&self, value: f64) -> Rgb {
        let value = if self.invert { -value } else { value };
        let span = self.vmax - self.vmin;
        let t = if span <= 0.0 {
            0.5
        } else {
            ((value - self.vmin) / span).clamp(0.0, 1.0)
        };

        let position = t * (RDYLGN.len() - 1) as f64;
        let index = (position.floor() as usize).min(RDYLGN.len() - 2);
        let frac = position - index as f64;

        let (r0, g0, b0) = RDYLGN[index];
        let (r1, g1, b1) = RDYLGN[index + 1];
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        Rgb {
            r: lerp(r0, r1),
            g: lerp(g0, g1),
            b: lerp(b0, b1),
        }
    }
}
