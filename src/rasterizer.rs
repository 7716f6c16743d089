// src/rasterizer.rs

//! Blit commands and a software framebuffer that executes them.
//!
//! The engine never draws. Each compositing request yields [`BlitCommand`]s
//! naming a destination rectangle on the host surface and a source origin in
//! either the faceplate raster or the display bitmap. A host with its own
//! graphics stack executes them itself; [`FramebufferSink`] is the built-in
//! RGBA implementation, used headless and in tests.

use crate::color::{Rgb, Rgba};
use crate::display::DisplayBitmap;
use crate::geometry::{Point, Rect};
use crate::skin::Skin;
use log::trace;

/// Where a blit reads its pixels from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitSource {
    /// The faceplate raster, colors as decoded.
    Skin,
    /// The display bitmap; unlit pixels draw `background`, lit ones `foreground`.
    Display { foreground: Rgb, background: Rgb },
}

/// Copy `dst.width` x `dst.height` pixels from `src` in `source` to `dst` on
/// the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitCommand {
    pub source: BlitSource,
    pub dst: Rect,
    pub src: Point,
}

impl BlitCommand {
    pub fn skin(dst: Rect, src: Point) -> Self {
        BlitCommand {
            source: BlitSource::Skin,
            dst,
            src,
        }
    }
}

/// Something that can execute blit commands against a surface.
pub trait RasterSink {
    fn blit(&mut self, command: &BlitCommand, skin: &Skin, display: &DisplayBitmap);

    fn blit_all(&mut self, commands: &[BlitCommand], skin: &Skin, display: &DisplayBitmap) {
        for command in commands {
            self.blit(command, skin, display);
        }
    }
}

/// A plain RGBA8 framebuffer.
#[derive(Debug, Clone)]
pub struct FramebufferSink {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl FramebufferSink {
    /// A framebuffer cleared to `fill`.
    pub fn new(width: usize, height: usize, fill: Rgb) -> Self {
        let bytes = Rgba::from(fill).to_bytes();
        let mut pixels = vec![0u8; width * height * 4];
        for pixel in pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&bytes);
        }
        FramebufferSink {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major RGBA8 bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = (y * self.width + x) * 4;
        let p = &self.pixels[at..at + 4];
        Some(Rgba::new(p[0], p[1], p[2], p[3]))
    }

    fn put(&mut self, x: usize, y: usize, color: Rgba) {
        let at = (y * self.width + x) * 4;
        self.pixels[at..at + 4].copy_from_slice(&color.to_bytes());
    }
}

/// The part of `start..start + len` inside `0..limit`, as an empty range when
/// there is none.
fn clip_span(start: i32, len: i32, limit: usize) -> (usize, usize) {
    let lo = i64::from(start).max(0);
    let hi = (i64::from(start) + i64::from(len)).min(limit as i64);
    if hi <= lo {
        (0, 0)
    } else {
        (lo as usize, hi as usize)
    }
}

impl RasterSink for FramebufferSink {
    fn blit(&mut self, command: &BlitCommand, skin: &Skin, display: &DisplayBitmap) {
        let dst = command.dst;
        let (x0, x1) = clip_span(dst.x, dst.width, self.width);
        let (y0, y1) = clip_span(dst.y, dst.height, self.height);
        if x0 == x1 || y0 == y1 {
            return;
        }
        trace!("blit {:?} from {:?} ({:?})", dst, command.src, command.source);
        // Source coordinate = destination coordinate + offset.
        let ox = i64::from(command.src.x) - i64::from(dst.x);
        let oy = i64::from(command.src.y) - i64::from(dst.y);

        match command.source {
            BlitSource::Skin => {
                let image = &skin.image;
                let backing = image.backing_rgba();
                let (iw, ih) = (image.width() as i64, image.height() as i64);
                for y in y0..y1 {
                    let sy = y as i64 + oy;
                    if sy < 0 || sy >= ih {
                        continue;
                    }
                    for x in x0..x1 {
                        let sx = x as i64 + ox;
                        if sx < 0 || sx >= iw {
                            continue;
                        }
                        let color = backing[sy as usize * image.width() + sx as usize];
                        self.put(x, y, color);
                    }
                }
            }
            BlitSource::Display {
                foreground,
                background,
            } => {
                let (fg, bg) = (Rgba::from(foreground), Rgba::from(background));
                for y in y0..y1 {
                    let sy = y as i64 + oy;
                    for x in x0..x1 {
                        let sx = x as i64 + ox;
                        if sx < 0 || sy < 0 {
                            continue;
                        }
                        let blank = display.is_blank(sx as usize, sy as usize);
                        self.put(x, y, if blank { bg } else { fg });
                    }
                }
            }
        }
    }
}
