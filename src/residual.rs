//! Signed-residual framing shared by the intra and inter coders (§4.5).
//!
//! A residual is a sign bit plus a Golomb-coded magnitude. In quantized
//! mode the magnitude coded is the quotient `n = |e| / q`, and decoding
//! produces the scaled-back residual `sign * n * q` rather than the
//! original exact `e` — this one function captures both paths so the
//! two callers (`intra`, `inter`) can't drift apart on the framing.

use crate::bitstream::{BitReader, BitWriter};
use crate::error::Result;
use crate::golomb::{decode_signed, encode_signed, Golomb};

/// Per-component quantization steps. `0` means lossless for that
/// component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuantSteps {
    pub y: u8,
    pub u: u8,
    pub v: u8,
}

impl QuantSteps {
    pub fn lossless() -> Self {
        Self::default()
    }

    pub fn as_array(self) -> [u8; 3] {
        [self.y, self.u, self.v]
    }
}

/// Encodes signed value `e` for component quantization step `q`.
/// Returns the residual the decoder will recover from what was just
/// written — the exact `e` when `q == 0`, or the quantized-and-scaled
/// `sign * floor(|e|/q) * q` otherwise.
pub fn encode_residual(golomb: &Golomb, w: &mut BitWriter, e: i32, q: u8) -> i32 {
    if q == 0 {
        encode_signed(golomb, w, e);
        return e;
    }
    let qi = q as i32;
    let sign = e < 0;
    let mag = e.unsigned_abs() as i32;
    let n = mag / qi;
    w.write_bits(sign as u32, 1);
    golomb.encode(w, n as u32);
    (if sign { -n } else { n }) * qi
}

/// Decodes a residual written by `encode_residual` for quantization
/// step `q`.
pub fn decode_residual(golomb: &Golomb, r: &mut BitReader, q: u8) -> Result<i32> {
    if q == 0 {
        return decode_signed(golomb, r);
    }
    let qi = q as i32;
    let sign = r.read_bit()?;
    let n = golomb.decode(r)? as i32;
    Ok((if sign == 1 { -n } else { n }) * qi)
}
