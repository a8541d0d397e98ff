//! Color values and the built-in palettes.
//!
//! Colors travel through settings files as CSS-style strings (`#ff4757`,
//! `rgba(0,0,0,0.25)`), so [`Color`] parses and prints that form and
//! serializes as a string.
//!
//! ```ignore
//! let red: Color = "#ff4757".parse()?;
//! assert_eq!(red.to_hex(), "#ff4757");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Straight (non-premultiplied) RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Opaque color from float components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Color from float components including alpha.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a `0xRRGGBB` literal.
    pub const fn from_hex(rgb: u32) -> Self {
        Self::rgb(
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
        )
    }

    /// Opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Clamp every channel to `0.0..=1.0`.
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    /// Linear interpolation between two colors.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// 8-bit RGBA channels, rounded.
    pub fn to_rgba8(self) -> [u8; 4] {
        let c = self.clamped();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
            (c.a * 255.0).round() as u8,
        ]
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid color '{}': expected #rgb, #rrggbb, #rrggbbaa, rgb() or rgba()", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let err = || ParseColorError(s.to_string());

        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(err);
        }

        let lower = text.to_ascii_lowercase();
        let args = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(err)?;

        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(err());
        }

        let number = |p: &str| p.parse::<f32>().ok().filter(|v| v.is_finite());
        let channel = |p: &str| number(p).map(|v| v.clamp(0.0, 255.0) / 255.0);
        let r = channel(parts[0]).ok_or_else(err)?;
        let g = channel(parts[1]).ok_or_else(err)?;
        let b = channel(parts[2]).ok_or_else(err)?;
        let a = match parts.get(3) {
            Some(p) => number(p).ok_or_else(err)?.clamp(0.0, 1.0),
            None => 1.0,
        };

        Ok(Color::rgba(r, g, b, a))
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    let [r, g, b, a] = match hex.len() {
        3 => [nibble(0)?, nibble(1)?, nibble(2)?, 255],
        4 => [nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?],
        6 => [byte(0)?, byte(2)?, byte(4)?, 255],
        8 => [byte(0)?, byte(2)?, byte(4)?, byte(6)?],
        _ => return None,
    };

    Some(Color::from_rgb8(r, g, b).with_alpha(a as f32 / 255.0))
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Default click palette.
pub const DEFAULT_PALETTE: [Color; 7] = [
    Color::from_hex(0xff4757),
    Color::from_hex(0x3742fa),
    Color::from_hex(0x2ed573),
    Color::from_hex(0xffa502),
    Color::from_hex(0xa55eea),
    Color::from_hex(0x1e90ff),
    Color::from_hex(0xff6b81),
];

/// Yellow through red, used by flames regardless of the caller's colors.
pub const FLAME_PALETTE: [Color; 5] = [
    Color::from_hex(0xfff3b0),
    Color::from_hex(0xffd166),
    Color::from_hex(0xff9f1c),
    Color::from_hex(0xff6b35),
    Color::from_hex(0xe63946),
];

/// Autumn browns, used by leaves regardless of the caller's colors.
pub const LEAF_PALETTE: [Color; 5] = [
    Color::from_hex(0x8b4513),
    Color::from_hex(0xa0522d),
    Color::from_hex(0xcd853f),
    Color::from_hex(0xd2691e),
    Color::from_hex(0xb5651d),
];

/// The default click palette as colors.
pub fn default_colors() -> Vec<Color> {
    DEFAULT_PALETTE.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        let c: Color = "#ff4757".parse().unwrap();
        assert_eq!(c.to_rgba8(), [0xff, 0x47, 0x57, 0xff]);

        let short: Color = "#fff".parse().unwrap();
        assert_eq!(short.to_rgba8(), [255, 255, 255, 255]);

        let alpha: Color = "#00000080".parse().unwrap();
        assert_eq!(alpha.to_rgba8()[3], 0x80);
    }

    #[test]
    fn test_parse_rgba_function() {
        let c: Color = "rgba(0,0,0,0.25)".parse().unwrap();
        assert_eq!(c.r, 0.0);
        assert!((c.a - 0.25).abs() < 1e-6);

        let opaque: Color = "rgb(255, 128, 0)".parse().unwrap();
        assert_eq!(opaque.to_rgba8(), [255, 128, 0, 255]);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("red".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert!("rgba(1,2)".parse::<Color>().is_err());
        assert!("rgba(255,0,0,nan)".parse::<Color>().is_err());
        assert!("rgb(inf,0,0)".parse::<Color>().is_err());
        assert!("rgba(0,NaN,0,1)".parse::<Color>().is_err());
    }

    #[test]
    fn test_hex_round_trip_through_serde() {
        let c: Color = "#1e90ff".parse().unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#1e90ff\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_hex(), "#1e90ff");
    }

    #[test]
    fn test_builtin_palettes_match_their_hex() {
        assert_eq!(default_colors().len(), 7);
        assert_eq!(DEFAULT_PALETTE[0], "#ff4757".parse().unwrap());
        assert_eq!(FLAME_PALETTE[4].to_hex(), "#e63946");
        assert_eq!(LEAF_PALETTE[0], Color::from_rgb8(0x8b, 0x45, 0x13));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::BLACK;
        let b = Color::WHITE;
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert!((a.lerp(b, 0.5).r - 0.5).abs() < 1e-6);
    }
}
