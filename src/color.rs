//! Color representation and perceptual blending.
//!
//! Colors are stored as sRGB but blended in CIE L\*a\*b\* (D65), where equal numeric
//! steps look like equal visual steps. Blending red into yellow in raw RGB passes
//! through a muddy orange; in Lab it stays bright. Lab points between two in-gamut
//! colors can fall outside sRGB, so every blend is clamped back into the gamut.
//!
//! The canonical identity of a color is its lowercase `#rrggbb` string. Two colors
//! are the same for update purposes exactly when those strings match.

use palette::convert::FromColorUnclamped;
use palette::rgb::FromHexError;
use palette::white_point::D65;
use palette::{Clamp, Lab, Mix, Srgb};
use std::fmt;
use std::str::FromStr;

/// An sRGB color that blends in Lab space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(Srgb<f64>);

impl Color {
    /// Create a color from 8-bit channels.
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue).into_format())
    }

    pub fn black() -> Self {
        Self(Srgb::new(0.0, 0.0, 0.0))
    }

    /// Parse `#rrggbb`, `rrggbb` or the short `#rgb` form.
    pub fn from_hex(hex: &str) -> Result<Self, FromHexError> {
        let rgb: Srgb<u8> = hex.trim().parse()?;
        Ok(Self(rgb.into_format()))
    }

    /// Canonical lowercase `#rrggbb` representation, used as the dedup key.
    pub fn hex(&self) -> String {
        let [red, green, blue] = self.to_rgb8();
        format!("#{:02x}{:02x}{:02x}", red, green, blue)
    }

    /// 8-bit channels as sent to the device.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let rgb: Srgb<u8> = self.0.into_format();
        [rgb.red, rgb.green, rgb.blue]
    }

    fn to_lab(self) -> Lab<D65, f64> {
        Lab::from_color_unclamped(self.0)
    }

    /// Blend towards `other` in Lab space and clamp the result into the sRGB gamut.
    ///
    /// `fraction` is clamped to [0.0, 1.0]; `0.0` returns `self`, `1.0` returns `other`.
    pub fn blend(&self, other: &Color, fraction: f64) -> Color {
        let fraction = fraction.clamp(0.0, 1.0);
        if fraction == 0.0 {
            return *self;
        }
        if fraction == 1.0 {
            return *other;
        }

        let mixed = self.to_lab().mix(other.to_lab(), fraction);
        Color(Srgb::from_color_unclamped(mixed).clamp())
    }

    /// CIE76 color difference (Euclidean distance in Lab).
    pub fn perceptual_distance(&self, other: &Color) -> f64 {
        let a = self.to_lab();
        let b = other.to_lab();
        ((a.l - b.l).powi(2) + (a.a - b.a).powi(2) + (a.b - b.b).powi(2)).sqrt()
    }
}

impl FromStr for Color {
    type Err = FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Color {
        Color::from_hex(s).unwrap()
    }

    #[test]
    fn test_hex_round_trip_is_canonical_lowercase() {
        assert_eq!(hex("#FF00aa").hex(), "#ff00aa");
        assert_eq!(hex("00ff00").hex(), "#00ff00");
        assert_eq!(hex("#fff").hex(), "#ffffff");
    }

    #[test]
    fn test_invalid_hex_is_rejected() {
        assert!(Color::from_hex("#gg0000").is_err());
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn test_rgb8_channels() {
        assert_eq!(hex("#102030").to_rgb8(), [0x10, 0x20, 0x30]);
        assert_eq!(Color::from_rgb8(1, 2, 3).hex(), "#010203");
        assert_eq!(Color::black().hex(), "#000000");
    }

    #[test]
    fn test_display_matches_hex() {
        assert_eq!(hex("#00ffff").to_string(), "#00ffff");
    }

    #[test]
    fn test_blend_endpoints_are_exact() {
        let red = hex("#ff0000");
        let yellow = hex("#ffff00");
        assert_eq!(red.blend(&yellow, 0.0), red);
        assert_eq!(red.blend(&yellow, 1.0), yellow);
    }

    #[test]
    fn test_blend_clamps_fraction() {
        let red = hex("#ff0000");
        let blue = hex("#0000ff");
        assert_eq!(red.blend(&blue, -0.5), red);
        assert_eq!(red.blend(&blue, 7.0), blue);
    }

    #[test]
    fn test_blend_is_not_rgb_average() {
        let red = hex("#ff0000");
        let yellow = hex("#ffff00");
        let mid = red.blend(&yellow, 0.5);

        // Naive RGB averaging gives #ff8000
        assert_eq!(mid.hex(), "#ffa100");
    }

    #[test]
    fn test_blend_grey_axis_stays_grey() {
        let black = Color::black();
        let white = hex("#ffffff");
        for step in 1..10 {
            let [r, g, b] = black.blend(&white, f64::from(step) / 10.0).to_rgb8();
            assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1);
        }
    }

    #[test]
    fn test_blend_stays_in_gamut() {
        let red = hex("#ff0000");
        let cyan = hex("#00ffff");
        for step in 0..=20 {
            let mixed = red.blend(&cyan, f64::from(step) / 20.0);
            let rgb = mixed.0;
            for channel in [rgb.red, rgb.green, rgb.blue] {
                assert!((0.0..=1.0).contains(&channel));
            }
        }
    }

    #[test]
    fn test_perceptual_distance() {
        let black = Color::black();
        let white = hex("#ffffff");
        assert_eq!(black.perceptual_distance(&black), 0.0);
        let distance = black.perceptual_distance(&white);
        assert!((distance - 100.0).abs() < 0.5, "got {}", distance);
    }
}
