// src/raster/mod.rs

//! Faceplate raster construction.
//!
//! Image decoding is delegated to an [`ImageDecoder`], which knows nothing about
//! magnification. It reports the unscaled image through the three-call
//! [`PixelSink`] protocol (`init`, one `put_row` per source row, `finish`), and
//! [`RasterBuilder`] scales each row as it arrives. The result is an immutable
//! [`RasterImage`].

pub mod bits;
pub mod netpbm;

use crate::color::{Rgb, Rgba};
use log::{debug, trace, warn};
use once_cell::sync::OnceCell;
use std::fmt;

/// Pixel layout of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 1 bit per pixel, 1 = white.
    Monochrome,
    /// 8-bit intensity.
    Grayscale,
    /// 8-bit index into a decoder-supplied palette.
    ColorMapped,
    /// 24-bit RGB.
    TrueColor,
}

impl PixelFormat {
    /// Bytes per raster row for an image `width` pixels wide.
    ///
    /// Monochrome rows are padded to a multiple of 2 bytes, all others to a
    /// multiple of 4. `None` when the row length does not fit in `usize`.
    pub fn stride(self, width: usize) -> Option<usize> {
        let stride = match self {
            PixelFormat::Monochrome => (width.checked_add(15)? >> 3) & !1,
            PixelFormat::Grayscale | PixelFormat::ColorMapped => width.checked_add(3)? & !3,
            PixelFormat::TrueColor => width.checked_mul(3)?.checked_add(3)? & !3,
        };
        Some(stride)
    }

    pub fn bit_depth(self) -> u8 {
        match self {
            PixelFormat::Monochrome => 1,
            PixelFormat::Grayscale | PixelFormat::ColorMapped => 8,
            PixelFormat::TrueColor => 24,
        }
    }

    /// Bytes one pixel occupies in a decoder's source row. Truecolor source pixels
    /// carry a leading padding byte before red, green and blue.
    pub fn source_bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Monochrome => 0,
            PixelFormat::Grayscale | PixelFormat::ColorMapped => 1,
            PixelFormat::TrueColor => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    EmptyImage { width: usize, height: usize },
    TooLarge { width: usize, height: usize },
    AllocationFailed { bytes: usize },
    MissingPalette,
    NotInitialized,
    TooManyRows { height: usize },
    AlreadyFinished,
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::EmptyImage { width, height } => {
                write!(f, "image has no pixels ({}x{})", width, height)
            }
            RasterError::TooLarge { width, height } => {
                write!(f, "image size {}x{} is out of range", width, height)
            }
            RasterError::AllocationFailed { bytes } => {
                write!(f, "could not allocate {} bytes for the skin raster", bytes)
            }
            RasterError::MissingPalette => write!(f, "color-mapped image without a palette"),
            RasterError::NotInitialized => write!(f, "pixel data before init"),
            RasterError::TooManyRows { height } => {
                write!(f, "more rows than the declared height of {}", height)
            }
            RasterError::AlreadyFinished => write!(f, "image already finished"),
        }
    }
}

impl std::error::Error for RasterError {}

/// Receiver side of the decoder protocol.
pub trait PixelSink {
    /// Announces an image of `width` x `height` unscaled pixels.
    fn init(
        &mut self,
        format: PixelFormat,
        palette: Option<&[Rgb]>,
        width: usize,
        height: usize,
    ) -> Result<(), RasterError>;

    /// Delivers the next unscaled source row, top to bottom.
    fn put_row(&mut self, row: &[u8]) -> Result<(), RasterError>;

    fn finish(&mut self) -> Result<(), RasterError>;
}

/// A format-specific image decoder.
pub trait ImageDecoder {
    /// Decodes `data`, driving `sink` through `init`, `put_row` and `finish`.
    fn decode(&self, data: &[u8], sink: &mut dyn PixelSink) -> anyhow::Result<()>;
}

/// An immutable, already magnified faceplate raster.
pub struct RasterImage {
    format: PixelFormat,
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
    palette: Option<Vec<Rgb>>,
    /// RGBA copy for sinks that want one; built on first request.
    backing: OnceCell<Vec<Rgba>>,
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("palette_len", &self.palette.as_ref().map(Vec::len))
            .field("backing_built", &self.backing.get().is_some())
            .finish()
    }
}

impl RasterImage {
    /// A zero-sized placeholder used before the first skin is loaded.
    pub fn empty() -> Self {
        RasterImage {
            format: PixelFormat::Monochrome,
            width: 0,
            height: 0,
            stride: 0,
            data: Vec::new(),
            palette: None,
            backing: OnceCell::new(),
        }
    }

    pub fn format(&self) -> PixelFormat {
        self.format
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

    pub fn bit_depth(&self) -> u8 {
        self.format.bit_depth()
    }

    /// Raw rows, `stride` bytes each.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Present for grayscale (a 256-step ramp) and color-mapped images.
    pub fn palette(&self) -> Option<&[Rgb]> {
        self.palette.as_deref()
    }

    /// Raw bytes of row `y`, `stride` long, or `None` outside the image.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        self.data.get(y * self.stride..(y + 1) * self.stride)
    }

    /// The color at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let row = self.row(y)?;
        let color = match self.format {
            PixelFormat::Monochrome => {
                if row[x >> 3] & (0x80 >> (x & 7)) != 0 {
                    Rgb::WHITE
                } else {
                    Rgb::BLACK
                }
            }
            PixelFormat::Grayscale | PixelFormat::ColorMapped => self
                .palette
                .as_ref()
                .and_then(|p| p.get(row[x] as usize).copied())
                .unwrap_or(Rgb::BLACK),
            PixelFormat::TrueColor => Rgb::new(row[3 * x], row[3 * x + 1], row[3 * x + 2]),
        };
        Some(color)
    }

    /// Row-major RGBA pixels, `width * height` entries. Built once, on first call.
    pub fn backing_rgba(&self) -> &[Rgba] {
        self.backing.get_or_init(|| {
            debug!(
                "Materializing {}x{} {:?} skin raster",
                self.width, self.height, self.format
            );
            let mut pixels = Vec::with_capacity(self.width * self.height);
            for y in 0..self.height {
                for x in 0..self.width {
                    let rgb = self.pixel(x, y).unwrap_or(Rgb::BLACK);
                    pixels.push(rgb.into());
                }
            }
            pixels
        })
    }

    pub fn is_materialized(&self) -> bool {
        self.backing.get().is_some()
    }
}

struct InProgress {
    format: PixelFormat,
    source_palette: Option<Vec<Rgb>>,
    /// Unscaled source width.
    source_width: usize,
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
    next_row: usize,
}

/// Scales decoder rows into a [`RasterImage`].
pub struct RasterBuilder {
    magnification: usize,
    current: Option<InProgress>,
    finished: Option<RasterImage>,
}

impl RasterBuilder {
    /// `magnification` is clamped to the range the monochrome tables support.
    pub fn new(magnification: u8) -> Self {
        RasterBuilder {
            magnification: usize::from(magnification).clamp(1, bits::MAX_FACTOR),
            current: None,
            finished: None,
        }
    }

    pub fn magnification(&self) -> usize {
        self.magnification
    }

    /// Hands over the finished image. Fails if `finish` was never reached.
    pub fn into_image(self) -> Result<RasterImage, RasterError> {
        self.finished.ok_or(RasterError::NotInitialized)
    }
}

impl PixelSink for RasterBuilder {
    fn init(
        &mut self,
        format: PixelFormat,
        palette: Option<&[Rgb]>,
        width: usize,
        height: usize,
    ) -> Result<(), RasterError> {
        // A new init discards anything built so far.
        self.current = None;
        self.finished = None;

        if width == 0 || height == 0 {
            return Err(RasterError::EmptyImage { width, height });
        }
        if format == PixelFormat::ColorMapped && palette.is_none() {
            return Err(RasterError::MissingPalette);
        }

        let m = self.magnification;
        let too_large = RasterError::TooLarge { width, height };
        let (scaled_width, scaled_height) = width
            .checked_mul(m)
            .zip(height.checked_mul(m))
            .ok_or_else(|| too_large.clone())?;
        let (stride, bytes) = format
            .stride(scaled_width)
            .and_then(|stride| Some((stride, stride.checked_mul(scaled_height)?)))
            .ok_or(too_large)?;

        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| RasterError::AllocationFailed { bytes })?;
        data.resize(bytes, 0);

        debug!(
            "Raster init: {:?} {}x{} -> {}x{} (stride {})",
            format, width, height, scaled_width, scaled_height, stride
        );
        self.current = Some(InProgress {
            format,
            source_palette: palette.map(<[Rgb]>::to_vec),
            source_width: width,
            width: scaled_width,
            height: scaled_height,
            stride,
            data,
            next_row: 0,
        });
        Ok(())
    }

    fn put_row(&mut self, row: &[u8]) -> Result<(), RasterError> {
        let m = self.magnification;
        let img = self.current.as_mut().ok_or(RasterError::NotInitialized)?;
        if img.next_row + m > img.height {
            return Err(RasterError::TooManyRows { height: img.height / m });
        }

        let stride = img.stride;
        let start = img.next_row * stride;
        let (first, rest) = img.data[start..start + m * stride].split_at_mut(stride);
        scale_row(img.format, img.source_width, m, row, first);
        for copy in rest.chunks_exact_mut(stride) {
            copy.copy_from_slice(first);
        }
        img.next_row += m;
        trace!("Raster row {} of {}", img.next_row / m, img.height / m);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RasterError> {
        if self.finished.is_some() {
            return Err(RasterError::AlreadyFinished);
        }
        let img = self.current.take().ok_or(RasterError::NotInitialized)?;
        if img.next_row < img.height {
            warn!(
                "Skin image ended after {} of {} rows; the rest stays blank",
                img.next_row / self.magnification,
                img.height / self.magnification
            );
        }

        let palette = match img.format {
            PixelFormat::Grayscale => Some((0..=255u8).map(Rgb::gray).collect()),
            PixelFormat::ColorMapped => img.source_palette,
            PixelFormat::Monochrome | PixelFormat::TrueColor => None,
        };

        self.finished = Some(RasterImage {
            format: img.format,
            width: img.width,
            height: img.height,
            stride: img.stride,
            data: img.data,
            palette,
            backing: OnceCell::new(),
        });
        Ok(())
    }
}

/// Produces one magnified destination row from one source row.
fn scale_row(format: PixelFormat, source_width: usize, m: usize, src: &[u8], dst: &mut [u8]) {
    match format {
        PixelFormat::Monochrome => bits::scale_mono_row(src, dst, m),
        PixelFormat::TrueColor => {
            for (x, pixel) in src.chunks_exact(4).take(source_width).enumerate() {
                let rgb = &pixel[1..4];
                let at = x * m * 3;
                for copy in dst[at..at + m * 3].chunks_exact_mut(3) {
                    copy.copy_from_slice(rgb);
                }
            }
        }
        PixelFormat::Grayscale | PixelFormat::ColorMapped => {
            if m == 1 {
                let n = src.len().min(dst.len());
                dst[..n].copy_from_slice(&src[..n]);
            } else {
                for (x, &value) in src.iter().take(source_width).enumerate() {
                    dst[x * m..(x + 1) * m].fill(value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
