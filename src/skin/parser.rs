// src/skin/parser.rs

//! Skin description parser.
//!
//! A description is line oriented. Each line is cleaned (comment stripped, leading
//! whitespace dropped), then mapped by [`parse_line`] to at most one [`Directive`].
//! A line that fails its checks yields `None` and is logged; it never aborts the
//! rest of the description.

use super::{
    AnnunciatorDefinition, DisplayScale, KeyDefinition, KeymapEntry, MacroDefinition,
    Orientation, SkinLayout, ANNUNCIATOR_COUNT, KEYMAP_MAX_MACRO_LENGTH,
    SKIN_MAX_MACRO_LENGTH,
};
use crate::color::Rgb;
use crate::geometry::{Point, Rect};
use crate::keys::{KeyModifiers, MAX_CALC_KEY, MIN_CALC_KEY, MIN_MACRO_TRIGGER};
use log::{debug, trace, warn};
use std::fmt;

/// One recognized line of a skin description.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Skin(Rect),
    Display {
        origin: Point,
        scale: DisplayScale,
        background: Rgb,
        foreground: Rgb,
    },
    Key(KeyDefinition),
    Landscape(bool),
    Macro(MacroDefinition),
    /// `slot` is zero-based.
    Annunciator {
        slot: usize,
        definition: AnnunciatorDefinition,
    },
    Keymap(KeymapEntry),
}

/// Why a keymap line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeymapEntryError {
    NoColon,
    ExcessTokens,
    BadKeycode(String),
    MissingKeycode,
    BadMacroValue(String),
    MacroTooLong,
}

impl fmt::Display for KeymapEntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeymapEntryError::NoColon => write!(f, "Missing ':' separator."),
            KeymapEntryError::ExcessTokens => write!(f, "Excess tokens in key spec."),
            KeymapEntryError::BadKeycode(tok) => write!(f, "Bad keycode ({}).", tok),
            KeymapEntryError::MissingKeycode => write!(f, "Unrecognized keycode."),
            KeymapEntryError::BadMacroValue(tok) => write!(f, "Bad value ({}) in macro.", tok),
            KeymapEntryError::MacroTooLong => {
                write!(f, "Macro too long (max={}).", KEYMAP_MAX_MACRO_LENGTH)
            }
        }
    }
}

impl std::error::Error for KeymapEntryError {}

/// Splits description text into cleaned, non-empty lines paired with their
/// 1-based line numbers.
///
/// Both `\n` and `\r` end a line. Everything from `#` onwards is a comment.
pub fn description_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split('\n')
        .enumerate()
        .flat_map(|(idx, raw)| raw.split('\r').map(move |piece| (idx + 1, piece)))
        .map(|(line_no, piece)| (line_no, clean_line(piece)))
        .filter(|(_, line)| !line.is_empty())
}

/// Strips the trailing comment and leading whitespace from one raw line.
pub fn clean_line(raw: &str) -> &str {
    let without_comment = match raw.find('#') {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    without_comment.trim_start()
}

/// Parses a whole description into a fresh layout. Geometry is left unscaled.
pub fn parse_description(text: &str) -> SkinLayout {
    let mut layout = SkinLayout::default();

    for (line_no, line) in description_lines(text) {
        if let Some(directive) = parse_line(line, line_no) {
            trace!("line {}: {:?}", line_no, directive);
            apply_directive(&mut layout, directive);
        }
    }

    if layout.description.display_scale.is_legacy()
        && layout.description.orientation == Orientation::Rotated
    {
        debug!("Legacy display layout cannot be rotated; using upright orientation");
        layout.description.orientation = Orientation::Upright;
    }

    debug!(
        "Parsed skin description: {} keys, {} macros, {} keymap entries",
        layout.keys.len(),
        layout.macros.len(),
        layout.keymap.len()
    );
    layout
}

fn apply_directive(layout: &mut SkinLayout, directive: Directive) {
    let desc = &mut layout.description;
    match directive {
        Directive::Skin(rect) => desc.skin = rect,
        Directive::Display {
            origin,
            scale,
            background,
            foreground,
        } => {
            desc.display_origin = origin;
            desc.display_scale = scale;
            desc.background = background;
            desc.foreground = foreground;
        }
        Directive::Key(key) => layout.keys.push(key),
        Directive::Landscape(rotated) => {
            desc.orientation = if rotated {
                Orientation::Rotated
            } else {
                Orientation::Upright
            };
        }
        Directive::Macro(m) => layout.macros.push(m),
        Directive::Annunciator { slot, definition } => layout.annunciators[slot] = definition,
        Directive::Keymap(entry) => layout.keymap.push(entry),
    }
}

/// Maps one cleaned line to a directive.
///
/// The directive family is chosen by a case-insensitive prefix. A line of a known
/// family that fails its checks is dropped; it is not retried as a keymap entry.
pub fn parse_line(line: &str, line_no: usize) -> Option<Directive> {
    if let Some(rest) = strip_prefix_ignore_case(line, "skin:") {
        parse_skin(rest).or_else(|| drop_line(line_no, "skin"))
    } else if let Some(rest) = strip_prefix_ignore_case(line, "display:") {
        parse_display(rest).or_else(|| drop_line(line_no, "display"))
    } else if let Some(rest) = strip_prefix_ignore_case(line, "key:") {
        parse_key(rest).or_else(|| drop_line(line_no, "key"))
    } else if let Some(rest) = strip_prefix_ignore_case(line, "landscape:") {
        parse_landscape(rest).or_else(|| drop_line(line_no, "landscape"))
    } else if let Some(rest) = strip_prefix_ignore_case(line, "macro:") {
        parse_macro(rest).or_else(|| drop_line(line_no, "macro"))
    } else if let Some(rest) = strip_prefix_ignore_case(line, "annunciator:") {
        parse_annunciator(rest).or_else(|| drop_line(line_no, "annunciator"))
    } else if line.contains(':') {
        match parse_keymap_entry(line) {
            Ok(entry) => Some(Directive::Keymap(entry)),
            Err(e) => {
                warn!("Keymap, line {}: {}", line_no, e);
                None
            }
        }
    } else {
        trace!("line {}: ignoring '{}'", line_no, line);
        None
    }
}

fn drop_line(line_no: usize, family: &str) -> Option<Directive> {
    warn!("Skin description, line {}: malformed {} directive ignored", line_no, family);
    None
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}

/// Splits on whitespace and commas, the separators used by geometric directives.
fn fields(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
}

/// Parses every field as an integer; `None` unless there are exactly `count`.
fn exact_ints(s: &str, count: usize) -> Option<Vec<i32>> {
    let values = fields(s)
        .map(|t| t.parse::<i32>().ok())
        .collect::<Option<Vec<_>>>()?;
    (values.len() == count).then_some(values)
}

fn parse_hex_color(token: &str) -> Option<Rgb> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u32::from_str_radix(digits, 16).ok().map(Rgb::from_rgb_hex)
}

fn parse_skin(rest: &str) -> Option<Directive> {
    let v = exact_ints(rest, 4)?;
    Some(Directive::Skin(Rect::new(v[0], v[1], v[2], v[3])))
}

fn parse_display(rest: &str) -> Option<Directive> {
    let tokens: Vec<&str> = fields(rest).collect();
    if tokens.len() != 6 {
        return None;
    }
    let ints = tokens[..4]
        .iter()
        .map(|t| t.parse::<i32>().ok())
        .collect::<Option<Vec<_>>>()?;
    let origin = Point::new(ints[0], ints[1]);
    let scale = DisplayScale {
        x: ints[2],
        y: ints[3],
    };
    if !scale.fits_at(origin) {
        warn!(
            "Display at {},{} scale {}x{} is out of range",
            origin.x, origin.y, scale.x, scale.y
        );
        return None;
    }
    Some(Directive::Display {
        origin,
        scale,
        background: parse_hex_color(tokens[4])?,
        foreground: parse_hex_color(tokens[5])?,
    })
}

fn parse_code(token: &str) -> Option<u8> {
    token.parse::<u8>().ok()
}

fn parse_key(rest: &str) -> Option<Directive> {
    let rest = rest.trim_start();
    let split = rest.find(char::is_whitespace)?;
    let (code_token, geometry) = rest.split_at(split);

    let (code, shifted_code) = match code_token.split_once(',') {
        Some((plain, shifted)) => (parse_code(plain)?, parse_code(shifted)?),
        None => {
            let code = parse_code(code_token)?;
            (code, code)
        }
    };

    let v = exact_ints(geometry, 10)?;
    Some(Directive::Key(KeyDefinition {
        code,
        shifted_code,
        sensitive: Rect::new(v[0], v[1], v[2], v[3]),
        display: Rect::new(v[4], v[5], v[6], v[7]),
        source: Point::new(v[8], v[9]),
    }))
}

fn parse_landscape(rest: &str) -> Option<Directive> {
    let v = exact_ints(rest, 1)?;
    Some(Directive::Landscape(v[0] != 0))
}

/// `macro: TRIGGER KEY...`. Any bad token discards the whole macro. Keys beyond
/// the maximum length are ignored, but must still be integers.
fn parse_macro(rest: &str) -> Option<Directive> {
    let mut tokens = rest.split_whitespace();
    let trigger = tokens.next()?.parse::<i64>().ok()?;
    if trigger < i64::from(MIN_MACRO_TRIGGER) || trigger > 255 {
        return None;
    }

    let mut keys = Vec::new();
    for token in tokens {
        let key = token.parse::<i64>().ok()?;
        if keys.len() < SKIN_MAX_MACRO_LENGTH {
            if key < i64::from(MIN_CALC_KEY) || key > i64::from(MAX_CALC_KEY) {
                return None;
            }
            keys.push(key as u8);
        }
    }

    Some(Directive::Macro(MacroDefinition {
        trigger: trigger as u8,
        keys,
    }))
}

fn parse_annunciator(rest: &str) -> Option<Directive> {
    let v = exact_ints(rest, 7)?;
    let number = v[0];
    if number < 1 || number > ANNUNCIATOR_COUNT as i32 {
        debug!("annunciator number {} out of range", number);
        return None;
    }
    Some(Directive::Annunciator {
        slot: (number - 1) as usize,
        definition: AnnunciatorDefinition {
            display: Rect::new(v[1], v[2], v[3], v[4]),
            source: Point::new(v[5], v[6]),
        },
    })
}

/// Parses `[ctrl] [alt] [shift] [cshift] KEYCODE : KEY...`.
///
/// Modifier keywords may appear in any order before the key code; nothing may follow
/// it. Every macro value must be in `1..=255`.
pub fn parse_keymap_entry(line: &str) -> Result<KeymapEntry, KeymapEntryError> {
    let line = clean_line(line);
    let (lhs, value) = line.split_once(':').ok_or(KeymapEntryError::NoColon)?;

    let mut modifiers = KeyModifiers::empty();
    let mut keycode = None;
    for tok in lhs.split([' ', '\t']).filter(|t| !t.is_empty()) {
        if keycode.is_some() {
            return Err(KeymapEntryError::ExcessTokens);
        }
        match KeyModifiers::from_keyword(tok) {
            Some(flag) => modifiers |= flag,
            None => {
                let k = tok
                    .parse::<u32>()
                    .ok()
                    .filter(|&k| k >= 1)
                    .ok_or_else(|| KeymapEntryError::BadKeycode(tok.to_string()))?;
                keycode = Some(k);
            }
        }
    }
    let keycode = keycode.ok_or(KeymapEntryError::MissingKeycode)?;

    let mut keys = Vec::new();
    for tok in value.split([' ', '\t']).filter(|t| !t.is_empty()) {
        let k = tok
            .parse::<u8>()
            .ok()
            .filter(|&k| k >= 1)
            .ok_or_else(|| KeymapEntryError::BadMacroValue(tok.to_string()))?;
        if keys.len() == KEYMAP_MAX_MACRO_LENGTH {
            return Err(KeymapEntryError::MacroTooLong);
        }
        keys.push(k);
    }

    Ok(KeymapEntry {
        modifiers,
        keycode,
        keys,
    })
}

#[cfg(test)]
mod tests;
