//! HSLA colors for particles and sheets

use serde::{Deserialize, Serialize};

/// Hue in degrees, saturation/lightness in percent, alpha in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsla {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: f32,
}

impl Hsla {
    pub const fn new(h: f32, s: f32, l: f32, a: f32) -> Self {
        Self { h, s, l, a }
    }

    /// Parse `#rrggbb` or `#rgb` (leading `#` optional) into an opaque color
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
        let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);
        let (h, s, l) = rgb_to_hsl(r, g, b);
        Some(Self::new(h, s, l, 1.0))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `hsla(...)` notation
    pub fn css(&self) -> String {
        format!("hsla({}, {}%, {}%, {})", self.h, self.s, self.l, self.a)
    }
}

/// Integer HSL conversion (hue in degrees, saturation/lightness in percent)
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let l = (max + min) / 2.0;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let s = if delta == 0.0 {
        0.0
    } else {
        delta / (1.0 - (2.0 * l - 1.0).abs())
    };

    (h.round(), (s * 100.0).round(), (l * 100.0).round())
}

/// Fallback palette
pub mod palette {
    use super::Hsla;

    pub const SPARK: Hsla = Hsla::new(50.0, 100.0, 50.0, 1.0);
    pub const BURN: Hsla = Hsla::new(0.0, 100.0, 50.0, 1.0);
    pub const SPLASH: Hsla = Hsla::new(320.0, 100.0, 90.0, 1.0);
    pub const SHIMMER: Hsla = Hsla::new(200.0, 100.0, 90.0, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_primaries() {
        assert_eq!(Hsla::from_hex("#ff0000"), Some(Hsla::new(0.0, 100.0, 50.0, 1.0)));
        assert_eq!(Hsla::from_hex("00ff00"), Some(Hsla::new(120.0, 100.0, 50.0, 1.0)));
        assert_eq!(Hsla::from_hex("#00f"), Some(Hsla::new(240.0, 100.0, 50.0, 1.0)));
        assert_eq!(Hsla::from_hex("#ffffff"), Some(Hsla::new(0.0, 0.0, 100.0, 1.0)));
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert_eq!(Hsla::from_hex("#12"), None);
        assert_eq!(Hsla::from_hex("#zzzzzz"), None);
        // Six bytes but not six hex digits
        assert_eq!(Hsla::from_hex("#aébcd"), None);
        assert_eq!(Hsla::from_hex("#ééé"), None);
    }

    #[test]
    fn test_css() {
        assert_eq!(Hsla::new(10.0, 20.0, 30.0, 0.5).css(), "hsla(10, 20%, 30%, 0.5)");
    }
}
