// src/color.rs

//! Color values used by skin descriptions, palettes and the software sink.

use serde::{Deserialize, Serialize};

/// An opaque 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from the `0xRRGGBB` notation used in skin descriptions.
    /// Bits above the low 24 are ignored.
    pub const fn from_rgb_hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    /// Packs the color with red and blue swapped (`0x00BBGGRR`), the channel order
    /// platform sinks built on device-independent bitmaps expect.
    pub const fn to_bgr_u32(self) -> u32 {
        (self.b as u32) << 16 | (self.g as u32) << 8 | self.r as u32
    }

    /// Inverse of [`Rgb::to_bgr_u32`].
    pub const fn from_bgr_u32(value: u32) -> Self {
        Self {
            r: (value & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: ((value >> 16) & 0xFF) as u8,
        }
    }

    /// A neutral gray of the given intensity.
    pub const fn gray(level: u8) -> Self {
        Self::new(level, level, level)
    }
}

/// RGBA color in 32-bit format (8 bits per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert to RGBA byte array
    pub fn to_bytes(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Rgb> for Rgba {
    fn from(color: Rgb) -> Self {
        Rgba::opaque(color.r, color.g, color.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_notation_is_red_green_blue() {
        let c = Rgb::from_rgb_hex(0x123456);
        assert_eq!(c, Rgb::new(0x12, 0x34, 0x56));
    }

    #[test]
    fn bgr_packing_swaps_red_and_blue() {
        let c = Rgb::from_rgb_hex(0x123456);
        assert_eq!(c.to_bgr_u32(), 0x563412);
        assert_eq!(Rgb::from_bgr_u32(0x563412), c);
    }

    #[test]
    fn rgba_from_rgb_is_opaque() {
        let rgba: Rgba = Rgb::new(1, 2, 3).into();
        assert_eq!(rgba.to_bytes(), [1, 2, 3, 255]);
    }
}
