// src/raster/bits.rs

//! Monochrome row scaling.
//!
//! Decoders deliver monochrome rows least-significant bit first; the faceplate
//! raster stores them most-significant bit first. Scaling by `m` turns each source
//! byte into `m` output bytes in which every source bit becomes a run of `m`
//! identical bits, with the bit order reversed in the same step.

use once_cell::sync::Lazy;

/// Largest factor the expansion table covers.
pub const MAX_FACTOR: usize = 4;

/// `EXPANSION[m - 1][byte]` holds the `m` output bytes for `byte`.
static EXPANSION: Lazy<[[[u8; MAX_FACTOR]; 256]; MAX_FACTOR]> = Lazy::new(|| {
    let mut table = [[[0u8; MAX_FACTOR]; 256]; MAX_FACTOR];
    for (m_idx, per_factor) in table.iter_mut().enumerate() {
        for (byte, out) in per_factor.iter_mut().enumerate() {
            *out = expand_byte(byte as u8, m_idx + 1);
        }
    }
    table
});

/// Expands one source byte by `factor` (1..=4). Source bit `i` (LSB first) fills
/// output bit positions `i*factor .. (i+1)*factor`, counted MSB first.
pub fn expand_byte(byte: u8, factor: usize) -> [u8; MAX_FACTOR] {
    let mut out = [0u8; MAX_FACTOR];
    for pos in 0..8 * factor {
        if byte & (1 << (pos / factor)) != 0 {
            out[pos / 8] |= 0x80 >> (pos % 8);
        }
    }
    out
}

/// Fills `dst` from `src` at the given factor. Source bytes past the end of `src`
/// read as zero, since the destination stride may round past the source row.
pub fn scale_mono_row(src: &[u8], dst: &mut [u8], factor: usize) {
    debug_assert!((1..=MAX_FACTOR).contains(&factor));
    let table = &EXPANSION[factor - 1];
    for (i, out) in dst.iter_mut().enumerate() {
        let byte = src.get(i / factor).copied().unwrap_or(0);
        *out = table[byte as usize][i % factor];
    }
}
