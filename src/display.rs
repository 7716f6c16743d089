// src/display.rs

//! The emulated LCD as a monochrome bitmap at skin scale and orientation.
//!
//! The calculator core always reports its display as an upright 131x16 grid,
//! packed least-significant bit first, with a set bit meaning a lit pixel. The
//! bitmap here is packed most-significant bit first and stores the opposite
//! polarity: a set bit is an unlit pixel, so a freshly reset bitmap (all ones) is
//! blank. A rotated skin turns the grid 90 degrees; the legacy layout squeezes the
//! 131 columns into 219 device pixels by doubling four out of every six.

use crate::geometry::{Point, Rect};
use crate::rasterizer::{BlitCommand, BlitSource};
use crate::skin::{
    DisplayScale, Orientation, SkinDescription, LCD_HEIGHT, LCD_WIDTH, LEGACY_DISPLAY_WIDTH,
};
use anyhow::{anyhow, Context, Result};
use log::{debug, warn};

/// Row length in bytes of the legacy 219-pixel layout.
const LEGACY_STRIDE: usize = 28;

/// Device column of LCD column `h` under the legacy layout.
pub fn legacy_column(h: i32) -> i32 {
    let a = h / 6;
    let b = h - 6 * a;
    let mut x = a * 10 + 2 * b;
    if b > 1 {
        x -= 1;
    }
    x
}

/// Device-pixel width of LCD column `h` under the legacy layout.
pub fn legacy_column_width(h: i32) -> i32 {
    match h % 6 {
        1 | 5 => 1,
        _ => 2,
    }
}

/// A region of the oriented, unscaled LCD grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone)]
pub struct DisplayBitmap {
    orientation: Orientation,
    scale: DisplayScale,
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl Default for DisplayBitmap {
    /// A blank upright bitmap at scale 1.
    fn default() -> Self {
        let stride = upright_stride(LCD_WIDTH as usize);
        DisplayBitmap {
            orientation: Orientation::Upright,
            scale: DisplayScale::default(),
            width: LCD_WIDTH as usize,
            height: LCD_HEIGHT as usize,
            stride,
            data: vec![0xFF; stride * LCD_HEIGHT as usize],
        }
    }
}

impl DisplayBitmap {
    /// Allocates a blank bitmap for the given orientation and scale.
    ///
    /// Fails when the size does not fit in memory.
    pub fn new(orientation: Orientation, scale: DisplayScale) -> Result<Self> {
        let scale = sanitize_scale(scale);
        let (lcd_w, lcd_h) = match orientation {
            Orientation::Upright => (LCD_WIDTH, LCD_HEIGHT),
            Orientation::Rotated => (LCD_HEIGHT, LCD_WIDTH),
        };
        let too_large = || {
            format!(
                "Display {:?} at scale {}x{} is too large",
                orientation, scale.x, scale.y
            )
        };
        let (width, stride) = if scale.is_legacy() {
            (LEGACY_DISPLAY_WIDTH as usize, LEGACY_STRIDE)
        } else {
            let w = lcd_w.checked_mul(scale.x).with_context(too_large)? as usize;
            (w, upright_stride(w))
        };
        let height = lcd_h.checked_mul(scale.y).with_context(too_large)? as usize;
        let bytes = stride.checked_mul(height).with_context(too_large)?;

        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|e| anyhow!("{}: {}", too_large(), e))?;
        data.resize(bytes, 0xFF);
        debug!(
            "Display bitmap {}x{} ({:?}, scale {}x{})",
            width, height, orientation, scale.x, scale.y
        );
        Ok(DisplayBitmap {
            orientation,
            scale,
            width,
            height,
            stride,
            data,
        })
    }

    /// Reallocates and blanks the bitmap. On failure the bitmap is unchanged.
    pub fn reset_for_orientation_and_scale(
        &mut self,
        orientation: Orientation,
        scale: DisplayScale,
    ) -> Result<()> {
        *self = DisplayBitmap::new(orientation, scale)?;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn scale(&self) -> DisplayScale {
        self.scale
    }

    /// Whether the bitmap pixel at `(x, y)` is unlit. Out of range reads as unlit.
    pub fn is_blank(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return true;
        }
        self.data[y * self.stride + (x >> 3)] & (0x80 >> (x & 7)) != 0
    }

    fn put(&mut self, x: i32, y: i32, lit: bool) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let byte = &mut self.data[y * self.stride + (x >> 3)];
        let mask = 0x80 >> (x & 7);
        if lit {
            *byte &= !mask;
        } else {
            *byte |= mask;
        }
    }

    /// Copies a region of the core's display bits into the bitmap.
    ///
    /// `bits` is the core's whole display, `bytes_per_line` bytes per row. Returns
    /// the touched region in oriented, unscaled LCD coordinates.
    pub fn update_region(
        &mut self,
        bits: &[u8],
        bytes_per_line: usize,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> DisplayRegion {
        let x0 = x.clamp(0, LCD_WIDTH);
        let y0 = y.clamp(0, LCD_HEIGHT);
        let (x_end, y_end) = (x.saturating_add(width), y.saturating_add(height));
        let x1 = x_end.clamp(x0, LCD_WIDTH);
        let y1 = y_end.clamp(y0, LCD_HEIGHT);
        if (x0, y0, x1, y1) != (x, y, x_end, y_end) {
            warn!(
                "Display update {},{} {}x{} clipped to the {}x{} LCD",
                x, y, width, height, LCD_WIDTH, LCD_HEIGHT
            );
        }
        let (sx, sy) = (self.scale.x, self.scale.y);

        for v in y0..y1 {
            for h in x0..x1 {
                let byte = bits
                    .get(v as usize * bytes_per_line + (h as usize >> 3))
                    .copied()
                    .unwrap_or(0);
                let lit = byte & (1 << (h & 7)) != 0;
                match self.orientation {
                    Orientation::Rotated => {
                        for vv in (LCD_WIDTH - 1 - h) * sy..(LCD_WIDTH - h) * sy {
                            for hh in v * sx..(v + 1) * sx {
                                self.put(hh, vv, lit);
                            }
                        }
                    }
                    Orientation::Upright => {
                        let (first, count) = if self.scale.is_legacy() {
                            (legacy_column(h), legacy_column_width(h))
                        } else {
                            (h * sx, sx)
                        };
                        for vv in v * sy..(v + 1) * sy {
                            for hh in first..first + count {
                                self.put(hh, vv, lit);
                            }
                        }
                    }
                }
            }
        }

        let (w, h) = (x1 - x0, y1 - y0);
        match self.orientation {
            Orientation::Rotated => DisplayRegion {
                x: y0,
                y: LCD_WIDTH - x0 - w,
                width: h,
                height: w,
            },
            Orientation::Upright => DisplayRegion {
                x: x0,
                y: y0,
                width: w,
                height: h,
            },
        }
    }

    /// Blit of the whole bitmap to the display location.
    pub fn full_blit(&self, desc: &SkinDescription) -> BlitCommand {
        BlitCommand {
            source: display_source(desc, false),
            dst: Rect::new(
                desc.display_origin.x,
                desc.display_origin.y,
                self.width as i32,
                self.height as i32,
            ),
            src: Point::new(0, 0),
        }
    }

    /// Blit of one region returned by [`DisplayBitmap::update_region`].
    pub fn region_blit(&self, desc: &SkinDescription, region: DisplayRegion) -> BlitCommand {
        let (sx, sy) = (self.scale.x, self.scale.y);
        let (bx, bw) = if self.scale.is_legacy() {
            let bx = legacy_column(region.x);
            (bx, legacy_column(region.x + region.width) - bx)
        } else {
            (region.x * sx, region.width * sx)
        };
        BlitCommand {
            source: display_source(desc, false),
            dst: Rect::new(
                desc.display_origin.x + bx,
                desc.display_origin.y + region.y * sy,
                bw,
                region.height * sy,
            ),
            src: Point::new(bx, region.y * sy),
        }
    }

    /// Blit of soft key `number` (1..=6), drawn inverted when `pressed`.
    pub fn soft_key_blit(&self, desc: &SkinDescription, number: u8, pressed: bool) -> BlitCommand {
        let k = i32::from(number);
        let (sx, sy) = (self.scale.x, self.scale.y);
        let (x, y, w, h) = match self.orientation {
            Orientation::Rotated => (9 * sx, (6 - k) * 22 * sy, 7 * sx, 21 * sy),
            Orientation::Upright if self.scale.is_legacy() => {
                let w = if k == 2 || k == 5 { 36 } else { 35 };
                (((k + 1) * 110) / 3 - 73, 9 * sy, w, 7 * sy)
            }
            Orientation::Upright => ((k - 1) * 22 * sx, 9 * sy, 21 * sx, 7 * sy),
        };
        BlitCommand {
            source: display_source(desc, pressed),
            dst: Rect::new(desc.display_origin.x + x, desc.display_origin.y + y, w, h),
            src: Point::new(x, y),
        }
    }
}

fn display_source(desc: &SkinDescription, inverted: bool) -> BlitSource {
    let (foreground, background) = if inverted {
        (desc.background, desc.foreground)
    } else {
        (desc.foreground, desc.background)
    };
    BlitSource::Display {
        foreground,
        background,
    }
}

/// Row length in bytes for a uniform layout `width` pixels wide, kept even.
fn upright_stride(width: usize) -> usize {
    ((width + 15) >> 3) & !1
}

fn sanitize_scale(scale: DisplayScale) -> DisplayScale {
    let mut fixed = scale;
    if fixed.x < 0 {
        warn!("Negative display x-scale {}; using 1", fixed.x);
        fixed.x = 1;
    }
    if fixed.y < 1 {
        warn!("Display y-scale {} is not positive; using 1", fixed.y);
        fixed.y = 1;
    }
    fixed
}
