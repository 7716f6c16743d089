// src/raster/netpbm.rs

//! Decoder for the netpbm family (PBM, PGM, PPM), used for the built-in skins.
//!
//! Rows are re-packed into the source conventions the raster bridge expects:
//! monochrome rows least-significant bit first with 1 = white (PBM uses 1 = black,
//! most-significant bit first), and truecolor pixels as `[pad, r, g, b]`.

use super::{ImageDecoder, PixelFormat, PixelSink};
use anyhow::{anyhow, bail, Context, Result};
use log::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct NetpbmDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Bitmap,
    Graymap,
    Pixmap,
}

struct Header {
    kind: Kind,
    ascii: bool,
    width: usize,
    height: usize,
    maxval: u32,
}

/// Cursor over the header and ASCII sample area.
struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn skip_space_and_comments(&mut self) {
        while let Some(&b) = self.data.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.data.get(self.pos) {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.pos += 1;
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn number(&mut self) -> Result<u32> {
        self.skip_space_and_comments();
        let start = self.pos;
        while self.data.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        let digits = std::str::from_utf8(&self.data[start..self.pos])?;
        digits
            .parse::<u32>()
            .with_context(|| format!("expected a number at byte {}", start))
    }

    /// A single ASCII bitmap digit; P1 allows samples without separators.
    fn bit(&mut self) -> Result<u8> {
        self.skip_space_and_comments();
        match self.data.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                Ok(0)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(1)
            }
            other => Err(anyhow!("bad bitmap sample {:?} at byte {}", other, self.pos)),
        }
    }
}

fn parse_header(scanner: &mut Scanner<'_>) -> Result<Header> {
    let magic = scanner
        .data
        .get(..2)
        .ok_or_else(|| anyhow!("file too short for a netpbm header"))?;
    let (kind, ascii) = match magic {
        b"P1" => (Kind::Bitmap, true),
        b"P2" => (Kind::Graymap, true),
        b"P3" => (Kind::Pixmap, true),
        b"P4" => (Kind::Bitmap, false),
        b"P5" => (Kind::Graymap, false),
        b"P6" => (Kind::Pixmap, false),
        _ => bail!("unsupported image signature {:?}", String::from_utf8_lossy(magic)),
    };
    scanner.pos = 2;

    let width = scanner.number().context("image width")? as usize;
    let height = scanner.number().context("image height")? as usize;
    let maxval = match kind {
        Kind::Bitmap => 1,
        _ => scanner.number().context("image maxval")?,
    };
    if maxval == 0 || maxval > 255 {
        bail!("unsupported maxval {}", maxval);
    }
    if !ascii {
        // Exactly one whitespace byte separates the header from binary samples.
        scanner.pos += 1;
    }
    Ok(Header {
        kind,
        ascii,
        width,
        height,
        maxval,
    })
}

fn rescale(sample: u32, maxval: u32) -> u8 {
    (sample.min(maxval) * 255 / maxval) as u8
}

impl ImageDecoder for NetpbmDecoder {
    fn decode(&self, data: &[u8], sink: &mut dyn PixelSink) -> Result<()> {
        let mut scanner = Scanner { data, pos: 0 };
        let header = parse_header(&mut scanner)?;
        let (w, h) = (header.width, header.height);
        debug!("netpbm {:?} {}x{} maxval {}", header.kind, w, h, header.maxval);

        let format = match header.kind {
            Kind::Bitmap => PixelFormat::Monochrome,
            Kind::Graymap => PixelFormat::Grayscale,
            Kind::Pixmap => PixelFormat::TrueColor,
        };
        // Every sample takes at least one byte, so a header promising more
        // samples than there are bytes left is corrupt.
        let binary_row_len = match header.kind {
            Kind::Bitmap => Some(w.div_ceil(8)),
            Kind::Graymap => Some(w),
            Kind::Pixmap => w.checked_mul(3),
        };
        let samples_per_pixel = if header.kind == Kind::Pixmap { 3 } else { 1 };
        let needed = if header.ascii {
            w.checked_mul(h)
                .and_then(|n| n.checked_mul(samples_per_pixel))
        } else {
            binary_row_len.and_then(|len| len.checked_mul(h))
        };
        let available = data.len().saturating_sub(scanner.pos);
        let binary_row_len = match (needed, binary_row_len) {
            (Some(n), Some(len)) if n <= available => len,
            _ => bail!(
                "{}x{} image needs more data than the {} bytes present",
                w,
                h,
                available
            ),
        };

        sink.init(format, None, w, h)?;

        let mut row = match format {
            PixelFormat::Monochrome => vec![0u8; w.div_ceil(8)],
            _ => vec![0u8; w * format.source_bytes_per_pixel()],
        };

        for y in 0..h {
            row.fill(0);
            if header.ascii {
                read_ascii_row(&mut scanner, &header, &mut row)
                    .with_context(|| format!("row {}", y))?;
            } else {
                let start = scanner.pos;
                let samples = data
                    .get(start..start + binary_row_len)
                    .ok_or_else(|| anyhow!("image data ends at row {}", y))?;
                scanner.pos += binary_row_len;
                convert_binary_row(&header, samples, &mut row);
            }
            sink.put_row(&row)?;
        }
        sink.finish()?;
        Ok(())
    }
}

fn set_white(row: &mut [u8], x: usize) {
    row[x >> 3] |= 1 << (x & 7);
}

fn read_ascii_row(scanner: &mut Scanner<'_>, header: &Header, row: &mut [u8]) -> Result<()> {
    for x in 0..header.width {
        match header.kind {
            Kind::Bitmap => {
                if scanner.bit()? == 0 {
                    set_white(row, x);
                }
            }
            Kind::Graymap => row[x] = rescale(scanner.number()?, header.maxval),
            Kind::Pixmap => {
                for c in 0..3 {
                    row[4 * x + 1 + c] = rescale(scanner.number()?, header.maxval);
                }
            }
        }
    }
    Ok(())
}

fn convert_binary_row(header: &Header, samples: &[u8], row: &mut [u8]) {
    match header.kind {
        Kind::Bitmap => {
            for x in 0..header.width {
                if samples[x >> 3] & (0x80 >> (x & 7)) == 0 {
                    set_white(row, x);
                }
            }
        }
        Kind::Graymap => {
            for (dst, &s) in row.iter_mut().zip(samples) {
                *dst = rescale(u32::from(s), header.maxval);
            }
        }
        Kind::Pixmap => {
            for (dst, rgb) in row.chunks_exact_mut(4).zip(samples.chunks_exact(3)) {
                for c in 0..3 {
                    dst[1 + c] = rescale(u32::from(rgb[c]), header.maxval);
                }
            }
        }
    }
}
