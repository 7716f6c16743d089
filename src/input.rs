// src/input.rs

//! Input resolution against a loaded layout: pointer hit-testing, host-key
//! bindings and skin macros.

use crate::keys::KeyModifiers;
use crate::skin::{
    Orientation, SkinDescription, SkinLayout, LCD_WIDTH, LEGACY_DISPLAY_WIDTH,
};
use log::trace;

/// Answers whether the calculator is currently showing a soft-key menu.
pub trait MenuQuery {
    fn menu_showing(&self) -> bool;
}

impl MenuQuery for bool {
    fn menu_showing(&self) -> bool {
        *self
    }
}

impl<F> MenuQuery for F
where
    F: Fn() -> bool,
{
    fn menu_showing(&self) -> bool {
        self()
    }
}

/// What a pointer position landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySlot {
    /// Soft key 1..=6 under the display.
    SoftKey(u8),
    /// Index into the layout's key list.
    Key(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHit {
    pub slot: KeySlot,
    /// The calculator key code to send.
    pub code: u8,
}

impl KeyHit {
    /// Single-integer slot encoding used by front ends: key indices as is, soft
    /// key `k` as `-1 - k`.
    pub fn legacy_slot(&self) -> i32 {
        match self.slot {
            KeySlot::SoftKey(k) => -1 - i32::from(k),
            KeySlot::Key(index) => index as i32,
        }
    }
}

/// The outcome of a host-key lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeymapMatch<'a> {
    pub keys: &'a [u8],
    /// True when the calculator shift state matched as well.
    pub exact: bool,
}

/// Soft key under `(x, y)`, if the point is inside the soft-key band of the display.
///
/// Works in `i64` so that no description, however large its geometry, overflows.
fn soft_key_at(desc: &SkinDescription, x: i32, y: i32) -> Option<u8> {
    let (sx, sy) = (
        i64::from(desc.display_scale.x),
        i64::from(desc.display_scale.y),
    );
    let (lx, ly) = (
        i64::from(desc.display_origin.x),
        i64::from(desc.display_origin.y),
    );
    let (x, y) = (i64::from(x), i64::from(y));
    let lcd_w = i64::from(LCD_WIDTH);
    match desc.orientation {
        Orientation::Rotated => {
            if sx <= 0 || sy <= 0 {
                return None;
            }
            let in_band =
                x >= lx + 9 * sx && x < lx + 16 * sx && y >= ly && y < ly + lcd_w * sy;
            in_band.then(|| (6 - (y - ly) / (22 * sy)) as u8)
        }
        Orientation::Upright => {
            if sy <= 0 || sx < 0 {
                return None;
            }
            let legacy = desc.display_scale.is_legacy();
            let width = if legacy {
                i64::from(LEGACY_DISPLAY_WIDTH)
            } else {
                lcd_w * sx
            };
            let in_band =
                x >= lx && x < lx + width && y >= ly + 9 * sy && y < ly + 16 * sy;
            if !in_band {
                return None;
            }
            let k = if legacy {
                ((x - lx + 37) * 3) / 110
            } else {
                (x - lx) / (22 * sx) + 1
            };
            Some(k as u8)
        }
    }
}

impl SkinLayout {
    /// Hit-tests a pointer position in device pixels.
    ///
    /// `menu` is only consulted for positions in the display area; when it reports
    /// a menu, the soft-key band takes precedence over any key rectangle.
    pub fn locate(&self, x: i32, y: i32, cshift: bool, menu: &dyn MenuQuery) -> Option<KeyHit> {
        if let Some(k) = soft_key_at(&self.description, x, y) {
            if menu.menu_showing() {
                trace!("({}, {}) hits soft key {}", x, y, k);
                return Some(KeyHit {
                    slot: KeySlot::SoftKey(k),
                    code: k,
                });
            }
        }
        let hit = self
            .keys
            .iter()
            .enumerate()
            .find(|(_, key)| key.sensitive.contains(x, y))
            .map(|(index, key)| KeyHit {
                slot: KeySlot::Key(index),
                code: key.code_for(cshift),
            });
        trace!("({}, {}) hits {:?}", x, y, hit);
        hit
    }

    /// Finds the key sequence bound to a host key.
    ///
    /// Entries must match `keycode` and the host modifiers (ctrl, alt, shift). The
    /// first one whose calculator shift also matches is returned as exact;
    /// otherwise the first host-level match is returned as inexact.
    pub fn resolve(&self, keycode: u32, modifiers: KeyModifiers) -> Option<KeymapMatch<'_>> {
        let host = modifiers.host_modifiers();
        let mut fallback = None;
        for entry in &self.keymap {
            if entry.keycode != keycode || entry.modifiers.host_modifiers() != host {
                continue;
            }
            if entry.modifiers == modifiers {
                return Some(KeymapMatch {
                    keys: &entry.keys,
                    exact: true,
                });
            }
            if fallback.is_none() {
                fallback = Some(KeymapMatch {
                    keys: &entry.keys,
                    exact: false,
                });
            }
        }
        fallback
    }

    /// The key sequence of the most recently defined macro for `code`.
    pub fn macro_for(&self, code: u8) -> Option<&[u8]> {
        self.macros
            .iter()
            .rev()
            .find(|m| m.trigger == code)
            .map(|m| m.keys.as_slice())
    }

    /// Index of the first key producing `code`, shifted or not.
    pub fn find_key_slot(&self, code: u8) -> Option<usize> {
        self.keys
            .iter()
            .position(|key| key.code == code || key.shifted_code == code)
    }
}
