// src/skin/parser/tests.rs

//! Per-directive tests for the description parser. Each family is exercised
//! through `parse_line`, and whole-file behavior through `parse_description`.

use super::*;
use crate::skin::Orientation;
use test_log::test;

fn line(text: &str) -> Option<Directive> {
    parse_line(clean_line(text), 1)
}

#[test]
fn clean_line_strips_comments_and_leading_space() {
    assert_eq!(clean_line("   skin: 1,2,3,4  # faceplate"), "skin: 1,2,3,4  ");
    assert_eq!(clean_line("# only a comment"), "");
    assert_eq!(clean_line("\t\t"), "");
}

#[test]
fn description_lines_skip_blanks_and_number_from_one() {
    let text = "skin: 0,0,10,10\r\n\n   \n# note\nlandscape: 1\n";
    let lines: Vec<_> = description_lines(text).collect();
    assert_eq!(lines, vec![(1, "skin: 0,0,10,10"), (5, "landscape: 1")]);
}

#[test]
fn skin_directive() {
    assert_eq!(line("skin: 0,5,200,300"), Some(Directive::Skin(Rect::new(0, 5, 200, 300))));
    assert_eq!(line("SKIN: 1,2,3,4"), Some(Directive::Skin(Rect::new(1, 2, 3, 4))));
    assert_eq!(line("skin: 1,2,3"), None);
}

#[test]
fn display_directive_parses_hex_colors() {
    let parsed = line("display: 26,66 2 3 c0d0a0 101010").expect("display line");
    assert_eq!(
        parsed,
        Directive::Display {
            origin: Point::new(26, 66),
            scale: DisplayScale { x: 2, y: 3 },
            background: Rgb::new(0xc0, 0xd0, 0xa0),
            foreground: Rgb::new(0x10, 0x10, 0x10),
        }
    );
    match parsed {
        Directive::Display { background, .. } => assert_eq!(background.to_bgr_u32(), 0xa0d0c0),
        _ => unreachable!(),
    }
}

#[test]
fn display_directive_accepts_legacy_x_scale() {
    match line("display: 10,20 0 2 ffffff 000000") {
        Some(Directive::Display { scale, .. }) => {
            assert!(scale.is_legacy());
            assert_eq!(scale.y, 2);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn display_directive_rejects_bad_color() {
    assert_eq!(line("display: 10,20 1 1 zzzzzz 000000"), None);
    assert_eq!(line("display: 10,20 1 1 ffffff"), None);
}

#[test]
fn display_directive_rejects_unrepresentable_scale() {
    assert_eq!(line("display: 0,0 20000000 1 ffffff 000000"), None);
    assert_eq!(line("display: 0,0 1 20000000 ffffff 000000"), None);
    assert_eq!(line("display: 2147483600,0 1 1 ffffff 000000"), None);
    // The largest scale that still fits is kept.
    let big = i32::MAX / 131;
    assert!(line(&format!("display: 0,0 {} 1 ffffff 000000", big)).is_some());
}

#[test]
fn key_directive_with_single_code() {
    let parsed = line("key: 12 1,2,3,4 5,6,7,8 9,10");
    assert_eq!(
        parsed,
        Some(Directive::Key(KeyDefinition {
            code: 12,
            shifted_code: 12,
            sensitive: Rect::new(1, 2, 3, 4),
            display: Rect::new(5, 6, 7, 8),
            source: Point::new(9, 10),
        }))
    );
}

#[test]
fn key_directive_with_shifted_code() {
    match line("key: 13,40 0,0,10,10 0,0,10,10 100,0") {
        Some(Directive::Key(k)) => {
            assert_eq!(k.code, 13);
            assert_eq!(k.shifted_code, 40);
            assert_eq!(k.code_for(false), 13);
            assert_eq!(k.code_for(true), 40);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn key_directive_with_wrong_count_is_dropped() {
    assert_eq!(line("key: 12 1,2,3,4 5,6,7,8 9"), None);
    assert_eq!(line("key: 12 1,2,3,4 5,6,7,8 9,10,11"), None);
    assert_eq!(line("key: x 1,2,3,4 5,6,7,8 9,10"), None);
}

#[test]
fn landscape_directive() {
    assert_eq!(line("landscape: 1"), Some(Directive::Landscape(true)));
    assert_eq!(line("Landscape: 0"), Some(Directive::Landscape(false)));
    assert_eq!(line("landscape: yes"), None);
}

#[test]
fn macro_directive() {
    assert_eq!(
        line("macro: 38 1 2 3"),
        Some(Directive::Macro(MacroDefinition {
            trigger: 38,
            keys: vec![1, 2, 3],
        }))
    );
    assert_eq!(
        line("macro: 255"),
        Some(Directive::Macro(MacroDefinition {
            trigger: 255,
            keys: vec![],
        }))
    );
}

#[test]
fn macro_directive_is_all_or_nothing() {
    assert_eq!(line("macro: 38 1 2 999"), None);
    assert_eq!(line("macro: 38 1 two 3"), None);
    assert_eq!(line("macro: 38 0"), None);
    assert_eq!(line("macro: 37 1 2"), None);
    assert_eq!(line("macro: 256 1"), None);
}

#[test]
fn macro_directive_truncates_past_maximum_length() {
    let mut text = String::from("macro: 40");
    for _ in 0..(SKIN_MAX_MACRO_LENGTH + 3) {
        text.push_str(" 5");
    }
    match line(&text) {
        Some(Directive::Macro(m)) => assert_eq!(m.keys.len(), SKIN_MAX_MACRO_LENGTH),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn annunciator_directive() {
    assert_eq!(
        line("annunciator: 7 1,2,3,4 5,6"),
        Some(Directive::Annunciator {
            slot: 6,
            definition: AnnunciatorDefinition {
                display: Rect::new(1, 2, 3, 4),
                source: Point::new(5, 6),
            },
        })
    );
    assert_eq!(line("annunciator: 0 1,2,3,4 5,6"), None);
    assert_eq!(line("annunciator: 8 1,2,3,4 5,6"), None);
}

#[test]
fn keymap_entry_with_modifiers() {
    let entry = parse_keymap_entry("Ctrl shift 65 : 1 2 37").expect("valid entry");
    assert_eq!(entry.modifiers, KeyModifiers::CTRL | KeyModifiers::SHIFT);
    assert_eq!(entry.keycode, 65);
    assert_eq!(entry.keys, vec![1, 2, 37]);
}

#[test]
fn keymap_entry_accepts_values_up_to_255() {
    let entry = parse_keymap_entry("cshift 112: 255 38").expect("valid entry");
    assert_eq!(entry.modifiers, KeyModifiers::CSHIFT);
    assert_eq!(entry.keys, vec![255, 38]);
}

#[test]
fn keymap_entry_rejections() {
    assert_eq!(
        parse_keymap_entry("65 ctrl: 1"),
        Err(KeymapEntryError::ExcessTokens)
    );
    assert_eq!(
        parse_keymap_entry("ctrl: 1"),
        Err(KeymapEntryError::MissingKeycode)
    );
    assert_eq!(
        parse_keymap_entry("0: 1"),
        Err(KeymapEntryError::BadKeycode("0".to_string()))
    );
    assert_eq!(
        parse_keymap_entry("meta 5: 1"),
        Err(KeymapEntryError::BadKeycode("meta".to_string()))
    );
    assert_eq!(
        parse_keymap_entry("5: 1 256"),
        Err(KeymapEntryError::BadMacroValue("256".to_string()))
    );
    assert_eq!(
        parse_keymap_entry("5: 1 x"),
        Err(KeymapEntryError::BadMacroValue("x".to_string()))
    );
}

#[test]
fn keymap_entry_too_long_is_void() {
    let mut text = String::from("5:");
    for _ in 0..=KEYMAP_MAX_MACRO_LENGTH {
        text.push_str(" 1");
    }
    assert_eq!(parse_keymap_entry(&text), Err(KeymapEntryError::MacroTooLong));

    let mut text = String::from("5:");
    for _ in 0..KEYMAP_MAX_MACRO_LENGTH {
        text.push_str(" 1");
    }
    assert_eq!(parse_keymap_entry(&text).map(|e| e.keys.len()), Ok(KEYMAP_MAX_MACRO_LENGTH));
}

#[test]
fn malformed_known_directive_does_not_fall_through_to_keymap() {
    assert_eq!(line("skin: 1 2"), None);
}

#[test]
fn unrecognized_line_without_colon_is_ignored() {
    assert_eq!(line("just some words"), None);
}

#[test]
fn whole_description_keeps_order_and_skips_bad_lines() {
    let text = "\
# sample
Skin: 0,0,100,200
Display: 10,20 2 2 ffffff 000000
Key: 1 0,0,10,10 0,0,10,10 200,0
Key: 2 0,0,10,10 bogus
Key: 3 5,5,10,10 5,5,10,10 210,0
Macro: 38 1 2 999
Macro: 39 4 5
Annunciator: 1 10,10,5,5 300,10
5: 1 2
cshift 5: 3
ctrl 6: 7 x
";
    let layout = parse_description(text);
    assert_eq!(layout.description.skin, Rect::new(0, 0, 100, 200));
    assert_eq!(layout.description.display_origin, Point::new(10, 20));
    assert_eq!(layout.keys.iter().map(|k| k.code).collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(layout.macros.len(), 1);
    assert_eq!(layout.macros[0].trigger, 39);
    assert_eq!(layout.annunciators[0].source, Point::new(300, 10));
    assert_eq!(layout.keymap.len(), 2);
    assert_eq!(layout.keymap[1].modifiers, KeyModifiers::CSHIFT);
    assert_eq!(layout.description.magnification, None);
}

#[test]
fn legacy_layout_forces_upright() {
    let layout = parse_description("display: 0,0 0 2 ffffff 000000\nlandscape: 1\n");
    assert_eq!(layout.description.orientation, Orientation::Upright);

    let layout = parse_description("display: 0,0 1 1 ffffff 000000\nlandscape: 1\n");
    assert_eq!(layout.description.orientation, Orientation::Rotated);
}
