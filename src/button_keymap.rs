// src/button_keymap.rs

//! Named-button keymaps.
//!
//! A simpler keymap dialect than the skin's host keymap: an INI document in which
//! every `[section]` is a keymap and every `button = STEP STEP ...` line binds a
//! button name to a sequence of calculator keys, also given by name:
//!
//! ```text
//! [Stack]
//! F1 = ENTER
//! F2 = SWAP CHS
//! ```
//!
//! One keymap is current at a time; [`ButtonKeymaps::resolve`] looks buttons up
//! in it.

use anyhow::{bail, Result};
use log::{debug, info, warn};

/// Longest keymap name kept; longer section names are truncated.
pub const MAX_KEYMAP_NAME: usize = 15;
/// Longest button name kept.
pub const MAX_BUTTON_NAME: usize = 11;
/// Steps beyond this are dropped.
pub const MAX_STEPS: usize = 10;

/// Button names in key-code order: `KEY_NAMES[code - 1]`.
const KEY_NAMES: [&str; 43] = [
    "SIGMA", "INV", "SQRT", "LOG", "LN", "XEQ", //
    "STO", "RCL", "RDN", "SIN", "COS", "TAN", //
    "ENTER", "SWAP", "CHS", "E", "BSP", //
    "UP", "7", "8", "9", "DIV", //
    "DOWN", "4", "5", "6", "MUL", //
    "SHIFT", "1", "2", "3", "SUB", //
    "EXIT", "0", "DOT", "RUN", "ADD", //
    "F1", "F2", "F3", "F4", "F5", "F6",
];

/// Name of key `code` (1..=43).
pub fn keycode_to_name(code: u8) -> Option<&'static str> {
    KEY_NAMES.get(usize::from(code).checked_sub(1)?).copied()
}

/// Key code for a button name, ignoring case.
pub fn name_to_keycode(name: &str) -> Option<u8> {
    KEY_NAMES
        .iter()
        .position(|k| k.eq_ignore_ascii_case(name))
        .map(|i| (i + 1) as u8)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ButtonMacro {
    button: String,
    keys: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Keymap {
    name: String,
    macros: Vec<ButtonMacro>,
}

/// Every keymap from the last loaded document.
#[derive(Debug, Clone, Default)]
pub struct ButtonKeymaps {
    keymaps: Vec<Keymap>,
    current: Option<usize>,
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

impl ButtonKeymaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all keymaps with the ones in `text`. The last keymap becomes current.
    ///
    /// Lines that are neither a section header nor a `key = value` pair are skipped;
    /// if there were any, the first one is reported as an error once the rest of
    /// the document has been loaded.
    pub fn load_str(&mut self, text: &str) -> Result<()> {
        self.keymaps.clear();
        self.current = None;

        let mut section = String::new();
        let mut first_bad_line = None;
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(rest) = line.strip_prefix('[') {
                match rest.find(']') {
                    Some(end) => section = rest[..end].trim().to_string(),
                    None => {
                        warn!("Button keymap, line {}: unterminated section header", index + 1);
                        first_bad_line.get_or_insert(index + 1);
                    }
                }
                continue;
            }
            let Some((button, steps)) = line.split_once(['=', ':']) else {
                warn!("Button keymap, line {}: expected 'button = keys'", index + 1);
                first_bad_line.get_or_insert(index + 1);
                continue;
            };
            self.add_macro(&section, button.trim(), steps);
        }

        info!("Loaded {} button keymaps", self.keymaps.len());
        if let Some(line) = first_bad_line {
            bail!("Malformed button keymap at line {}", line);
        }
        Ok(())
    }

    fn add_macro(&mut self, section: &str, button: &str, steps: &str) {
        let name = truncate(section, MAX_KEYMAP_NAME);
        let starts_new = match self.current {
            Some(i) => self.keymaps[i].name != name,
            None => true,
        };
        if starts_new {
            self.keymaps.push(Keymap {
                name,
                macros: Vec::new(),
            });
            self.current = Some(self.keymaps.len() - 1);
        }

        let mut keys = Vec::new();
        for step in steps.split_whitespace() {
            match name_to_keycode(step) {
                Some(code) if keys.len() < MAX_STEPS => keys.push(code),
                Some(_) => debug!("Button '{}': steps past {} dropped", button, MAX_STEPS),
                None => debug!("Button '{}': unknown step '{}' skipped", button, step),
            }
        }
        if let Some(i) = self.current {
            self.keymaps[i].macros.push(ButtonMacro {
                button: truncate(button, MAX_BUTTON_NAME),
                keys,
            });
        }
    }

    /// Makes the keymap called `name` current. Unknown names change nothing.
    pub fn set_current(&mut self, name: &str) -> bool {
        match self.keymaps.iter().position(|k| k.name == name) {
            Some(i) => {
                self.current = Some(i);
                true
            }
            None => false,
        }
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.map(|i| self.keymaps[i].name.as_str())
    }

    /// Name of the `n`th keymap, in document order.
    pub fn name_at(&self, n: usize) -> Option<&str> {
        self.keymaps.get(n).map(|k| k.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.keymaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keymaps.is_empty()
    }

    /// Key codes bound to `button` in the current keymap, ignoring case.
    pub fn resolve(&self, button: &str) -> Option<&[u8]> {
        let keymap = &self.keymaps[self.current?];
        keymap
            .macros
            .iter()
            .find(|m| m.button.eq_ignore_ascii_case(button))
            .map(|m| m.keys.as_slice())
    }
}
