// src/skin/mod.rs

//! The parsed skin model.
//!
//! A [`SkinLayout`] is everything a `.layout` description yields: faceplate and
//! display geometry, keys, annunciators, skin macros and the host keymap. It is
//! built by [`parser::parse_description`], magnified once by [`scale`], and then
//! frozen inside a [`Skin`] snapshot together with the decoded faceplate raster.

pub mod parser;
pub mod scale;

use crate::color::Rgb;
use crate::geometry::{Point, Rect};
use crate::keys::KeyModifiers;
use crate::raster::RasterImage;
use serde::{Deserialize, Serialize};

/// Number of annunciator slots on the faceplate.
pub const ANNUNCIATOR_COUNT: usize = 7;

/// Longest key sequence a `macro:` directive may carry.
pub const SKIN_MAX_MACRO_LENGTH: usize = 31;

/// Longest key sequence a keymap entry may carry.
pub const KEYMAP_MAX_MACRO_LENGTH: usize = 16;

/// Unscaled size of the emulated LCD in upright orientation.
pub const LCD_WIDTH: i32 = 131;
pub const LCD_HEIGHT: i32 = 16;

/// Device-pixel width of the legacy non-uniform display layout.
pub const LEGACY_DISPLAY_WIDTH: i32 = 219;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Upright,
    /// The LCD is turned 90 degrees; the skin is laid out in landscape.
    Rotated,
}

/// Per-axis display magnification. An `x` of [`DisplayScale::LEGACY`] selects the
/// fixed 219-pixel-wide non-uniform layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayScale {
    pub x: i32,
    pub y: i32,
}

impl DisplayScale {
    pub const LEGACY: i32 = 0;

    pub fn is_legacy(&self) -> bool {
        self.x == Self::LEGACY
    }

    /// Whether a display drawn at `origin` with this scale stays inside `i32`
    /// pixel space on both axes, in either orientation.
    pub fn fits_at(&self, origin: Point) -> bool {
        let extent = |scale: i32| {
            LCD_WIDTH
                .checked_mul(scale.max(1))
                .map(|e| e.max(LEGACY_DISPLAY_WIDTH))
        };
        match (extent(self.x), extent(self.y)) {
            (Some(w), Some(h)) => {
                origin.x.checked_add(w).is_some() && origin.y.checked_add(h).is_some()
            }
            _ => false,
        }
    }
}

impl Default for DisplayScale {
    fn default() -> Self {
        DisplayScale { x: 1, y: 1 }
    }
}

/// Faceplate-level parameters from the `skin:`, `display:` and `landscape:` directives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinDescription {
    /// The part of the raster that is the faceplate.
    pub skin: Rect,
    /// Where the LCD is drawn on the faceplate.
    pub display_origin: Point,
    pub display_scale: DisplayScale,
    pub background: Rgb,
    pub foreground: Rgb,
    pub orientation: Orientation,
    /// `None` until the geometry scaler has run.
    pub magnification: Option<u8>,
}

impl Default for SkinDescription {
    fn default() -> Self {
        SkinDescription {
            skin: Rect::default(),
            display_origin: Point::default(),
            display_scale: DisplayScale::default(),
            background: Rgb::WHITE,
            foreground: Rgb::BLACK,
            orientation: Orientation::Upright,
            magnification: None,
        }
    }
}

impl SkinDescription {
    pub fn is_rotated(&self) -> bool {
        self.orientation == Orientation::Rotated
    }
}

/// One `key:` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDefinition {
    pub code: u8,
    pub shifted_code: u8,
    /// Pointer hit-test area.
    pub sensitive: Rect,
    /// Where the key image is drawn.
    pub display: Rect,
    /// Top-left of the pressed-key image in the raster.
    pub source: Point,
}

impl KeyDefinition {
    /// The code this key produces under the given calculator shift state.
    pub fn code_for(&self, cshift: bool) -> u8 {
        if cshift {
            self.shifted_code
        } else {
            self.code
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnnunciatorDefinition {
    pub display: Rect,
    pub source: Point,
}

/// One `macro:` directive: a skin code above the calculator keys that expands to a
/// sequence of calculator keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroDefinition {
    pub trigger: u8,
    pub keys: Vec<u8>,
}

/// One host-key binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeymapEntry {
    pub modifiers: KeyModifiers,
    /// Platform key code, always at least 1.
    pub keycode: u32,
    pub keys: Vec<u8>,
}

/// Everything parsed out of a skin description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinLayout {
    pub description: SkinDescription,
    /// Definition order; the first geometric match wins on hit-test.
    pub keys: Vec<KeyDefinition>,
    pub annunciators: [AnnunciatorDefinition; ANNUNCIATOR_COUNT],
    /// Definition order; lookups search from the most recent definition.
    pub macros: Vec<MacroDefinition>,
    /// Insertion order; first-match semantics depend on it.
    pub keymap: Vec<KeymapEntry>,
}

/// A fully loaded skin. Immutable once built; reloading replaces the whole value.
#[derive(Debug)]
pub struct Skin {
    pub name: String,
    pub layout: SkinLayout,
    pub image: RasterImage,
}

impl Skin {
    pub fn description(&self) -> &SkinDescription {
        &self.layout.description
    }

    pub fn magnification(&self) -> u8 {
        self.layout.description.magnification.unwrap_or(1)
    }
}

impl Default for Skin {
    fn default() -> Self {
        Skin {
            name: String::new(),
            layout: SkinLayout::default(),
            image: RasterImage::empty(),
        }
    }
}
