// src/keys.rs

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Modifier state attached to a physical key event or a keymap entry.
    ///
    /// `SHIFT` is the host keyboard's shift key. `CSHIFT` is the calculator's own
    /// shift state, which the front end tracks independently.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct KeyModifiers: u8 {
        const CTRL = 1 << 0;
        const ALT = 1 << 1;
        const SHIFT = 1 << 2;
        const CSHIFT = 1 << 3;
    }
}

impl KeyModifiers {
    /// Builds the flag set from individual booleans, in keymap-file order.
    pub fn from_flags(ctrl: bool, alt: bool, shift: bool, cshift: bool) -> Self {
        let mut mods = KeyModifiers::empty();
        mods.set(KeyModifiers::CTRL, ctrl);
        mods.set(KeyModifiers::ALT, alt);
        mods.set(KeyModifiers::SHIFT, shift);
        mods.set(KeyModifiers::CSHIFT, cshift);
        mods
    }

    /// The modifiers that must match for a keymap entry to apply at all.
    pub fn host_modifiers(self) -> Self {
        self - KeyModifiers::CSHIFT
    }

    /// Parses one modifier keyword (`ctrl`, `alt`, `shift`, `cshift`), ignoring case.
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("ctrl") {
            Some(KeyModifiers::CTRL)
        } else if word.eq_ignore_ascii_case("alt") {
            Some(KeyModifiers::ALT)
        } else if word.eq_ignore_ascii_case("shift") {
            Some(KeyModifiers::SHIFT)
        } else if word.eq_ignore_ascii_case("cshift") {
            Some(KeyModifiers::CSHIFT)
        } else {
            None
        }
    }
}

/// Calculator key codes live in `1..=37`.
pub const MIN_CALC_KEY: u8 = 1;
pub const MAX_CALC_KEY: u8 = 37;

/// Skin macro trigger codes live above the calculator keys.
pub const MIN_MACRO_TRIGGER: u8 = 38;

/// Number of soft keys under the display.
pub const SOFT_KEY_COUNT: u8 = 6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(KeyModifiers::from_keyword("CTRL"), Some(KeyModifiers::CTRL));
        assert_eq!(KeyModifiers::from_keyword("Alt"), Some(KeyModifiers::ALT));
        assert_eq!(KeyModifiers::from_keyword("shift"), Some(KeyModifiers::SHIFT));
        assert_eq!(KeyModifiers::from_keyword("cShift"), Some(KeyModifiers::CSHIFT));
        assert_eq!(KeyModifiers::from_keyword("meta"), None);
    }

    #[test]
    fn host_modifiers_drop_calculator_shift() {
        let mods = KeyModifiers::from_flags(true, false, true, true);
        assert_eq!(mods.host_modifiers(), KeyModifiers::CTRL | KeyModifiers::SHIFT);
    }
}
