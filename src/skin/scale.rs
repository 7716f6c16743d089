// src/skin/scale.rs

//! Fits a parsed layout to the drawing surface by an integer magnification.

use super::SkinLayout;
use crate::geometry::{Point, Rect};
use anyhow::{bail, Context, Result};
use log::{debug, warn};

/// The monochrome replication tables only cover factors up to this value.
pub const MAX_MAGNIFICATION: u8 = 4;

/// `clamp(min(surface_w / skin_w, surface_h / skin_h), 1, cap)`, where `cap` is
/// itself limited to [`MAX_MAGNIFICATION`].
pub fn compute_magnification(
    skin_width: i32,
    skin_height: i32,
    surface_width: i32,
    surface_height: i32,
    cap: u8,
) -> u8 {
    let cap = cap.clamp(1, MAX_MAGNIFICATION);
    if skin_width <= 0 || skin_height <= 0 {
        warn!(
            "Skin has degenerate size {}x{}; not magnifying",
            skin_width, skin_height
        );
        return 1;
    }
    let xs = surface_width / skin_width;
    let ys = surface_height / skin_height;
    xs.min(ys).clamp(1, i32::from(cap)) as u8
}

impl SkinLayout {
    /// Resolves the magnification for the given surface and multiplies every
    /// geometric field by it.
    ///
    /// Runs at most once per layout: once a magnification is recorded, later calls
    /// return it without touching the geometry again. Geometry that would leave
    /// `i32` pixel space is an error, and the layout is then left unchanged.
    pub fn magnify_to_surface(
        &mut self,
        surface_width: i32,
        surface_height: i32,
        cap: u8,
    ) -> Result<u8> {
        if let Some(m) = self.description.magnification {
            warn!("Skin geometry already magnified x{}; not scaling again", m);
            return Ok(m);
        }

        let skin = self.description.skin;
        let m = compute_magnification(skin.width, skin.height, surface_width, surface_height, cap);
        debug!(
            "Magnification x{} for {}x{} skin on {}x{} surface",
            m, skin.width, skin.height, surface_width, surface_height
        );
        if m == 1 {
            self.description.magnification = Some(m);
            return Ok(m);
        }

        let f = i32::from(m);
        let mut scaled = self.clone();
        let desc = &mut scaled.description;
        desc.magnification = Some(m);
        desc.skin = magnified_rect(desc.skin, f, "skin")?;
        desc.display_origin = magnified_point(desc.display_origin, f, "display origin")?;
        // The legacy x-scale is a fixed device-pixel layout and stays as is.
        if !desc.display_scale.is_legacy() {
            desc.display_scale.x = desc
                .display_scale
                .x
                .checked_mul(f)
                .context("Display x-scale overflows")?;
        }
        desc.display_scale.y = desc
            .display_scale
            .y
            .checked_mul(f)
            .context("Display y-scale overflows")?;
        if !desc.display_scale.fits_at(desc.display_origin) {
            bail!("Display does not fit in pixel space at x{}", m);
        }

        for key in &mut scaled.keys {
            key.sensitive = magnified_rect(key.sensitive, f, "key")?;
            key.display = magnified_rect(key.display, f, "key")?;
            key.source = magnified_point(key.source, f, "key")?;
        }
        for ann in &mut scaled.annunciators {
            ann.display = magnified_rect(ann.display, f, "annunciator")?;
            ann.source = magnified_point(ann.source, f, "annunciator")?;
        }
        *self = scaled;
        Ok(m)
    }
}

fn magnified_rect(rect: Rect, factor: i32, what: &str) -> Result<Rect> {
    rect.checked_magnify(factor)
        .with_context(|| format!("{} {:?} overflows at x{}", what, rect, factor))
}

fn magnified_point(point: Point, factor: i32, what: &str) -> Result<Point> {
    point
        .checked_magnify(factor)
        .with_context(|| format!("{} {:?} overflows at x{}", what, point, factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skin::parser::parse_description;
    use crate::skin::DisplayScale;
    use test_log::test;

    const LAYOUT: &str = "\
skin: 0,0,100,150
display: 10,20 2 3 ffffff 000000
key: 1 1,2,3,4 5,6,7,8 9,10
annunciator: 2 11,12,13,14 15,16
";

    #[test]
    fn magnification_is_floor_of_smaller_ratio() {
        assert_eq!(compute_magnification(100, 150, 250, 600, 4), 2);
        assert_eq!(compute_magnification(100, 150, 399, 600, 4), 3);
        assert_eq!(compute_magnification(100, 150, 99, 600, 4), 1);
        assert_eq!(compute_magnification(100, 150, 5000, 5000, 4), 4);
        assert_eq!(compute_magnification(100, 150, 5000, 5000, 9), 4);
        assert_eq!(compute_magnification(100, 150, 5000, 5000, 2), 2);
        assert_eq!(compute_magnification(0, 150, 5000, 5000, 4), 1);
    }

    #[test]
    fn magnification_matches_formula_over_a_grid() {
        for w in (0..900).step_by(37) {
            for h in (0..900).step_by(41) {
                let expected = (w / 100).min(h / 150).clamp(1, 4) as u8;
                assert_eq!(compute_magnification(100, 150, w, h, 4), expected);
            }
        }
    }

    #[test]
    fn scaling_multiplies_all_geometry() {
        let mut layout = parse_description(LAYOUT);
        assert_eq!(layout.magnify_to_surface(200, 300, 4).expect("scale"), 2);

        let d = &layout.description;
        assert_eq!(d.skin, Rect::new(0, 0, 200, 300));
        assert_eq!(d.display_origin, Point::new(20, 40));
        assert_eq!(d.display_scale, DisplayScale { x: 4, y: 6 });
        assert_eq!(layout.keys[0].sensitive, Rect::new(2, 4, 6, 8));
        assert_eq!(layout.keys[0].display, Rect::new(10, 12, 14, 16));
        assert_eq!(layout.keys[0].source, Point::new(18, 20));
        assert_eq!(layout.annunciators[1].display, Rect::new(22, 24, 26, 28));
        assert_eq!(layout.annunciators[1].source, Point::new(30, 32));
    }

    #[test]
    fn magnification_one_leaves_geometry_alone() {
        let mut layout = parse_description(LAYOUT);
        let before = layout.clone();
        assert_eq!(layout.magnify_to_surface(100, 150, 4).expect("scale"), 1);
        assert_eq!(layout.keys, before.keys);
        assert_eq!(layout.description.skin, before.description.skin);
        assert_eq!(layout.description.magnification, Some(1));
    }

    #[test]
    fn legacy_x_scale_is_not_multiplied() {
        let mut layout =
            parse_description("skin: 0,0,100,100\ndisplay: 1,1 0 2 ffffff 000000\n");
        layout.magnify_to_surface(300, 300, 4).expect("scale");
        assert_eq!(layout.description.display_scale, DisplayScale { x: 0, y: 6 });
    }

    #[test]
    fn second_scaling_is_a_no_op() {
        let mut layout = parse_description(LAYOUT);
        layout.magnify_to_surface(200, 300, 4).expect("scale");
        let once = layout.clone();
        assert_eq!(layout.magnify_to_surface(400, 600, 4).expect("scale"), 2);
        assert_eq!(layout, once);
    }

    #[test]
    fn overflowing_key_geometry_is_an_error() {
        let mut layout = parse_description(
            "skin: 0,0,10,10\nkey: 1 1000000000,0,10,10 0,0,10,10 0,0\n",
        );
        let before = layout.clone();
        let err = layout.magnify_to_surface(40, 40, 4).unwrap_err();
        assert!(err.to_string().contains("key"));
        assert_eq!(layout, before);
        assert_eq!(layout.description.magnification, None);
    }

    #[test]
    fn display_that_outgrows_pixel_space_is_an_error() {
        let scale = i32::MAX / 131;
        let mut layout = parse_description(&format!(
            "skin: 0,0,10,10\ndisplay: 0,0 {} 1 ffffff 000000\n",
            scale
        ));
        assert_eq!(layout.description.display_scale.x, scale);
        assert!(layout.magnify_to_surface(20, 20, 4).is_err());
    }
}
