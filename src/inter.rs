//! Block-matching inter-frame coder: every frame after the first is
//! coded against the immediately preceding **reconstructed** frame.
//!
//! Grounded on `HybridCodec.py::findBestBlock`/`blockDif`/`lessError` for
//! the exact SAD scoring and strict-less-than tie-break (so the first
//! candidate encountered in row-major reference-block scan order wins
//! any tie), and on `encode_video`'s `else` branch for the motion-vector
//! + residual-block emission order.

use crate::bitstream::{BitReader, BitWriter};
use crate::error::Result;
use crate::framestore::Frame;
use crate::golomb::{decode_signed, encode_signed, Golomb};
use crate::residual::{decode_residual, encode_residual, QuantSteps};

/// Sum of absolute differences across all `b*b*3` component samples of
/// two same-sized blocks, assembled via `Frame::get_block`.
fn block_sad(cur: &Frame, cur_l0: usize, cur_c0: usize, refr: &Frame, ref_l0: usize, ref_c0: usize, b: usize) -> i64 {
    let cur_block = cur.get_block(cur_l0, cur_c0, b);
    let ref_block = refr.get_block(ref_l0, ref_c0, b);
    let mut sad: i64 = 0;
    for (cur_row, ref_row) in cur_block.iter().zip(ref_block.iter()) {
        for (&(cy, cu, cv), &(ry, ru, rv)) in cur_row.iter().zip(ref_row.iter()) {
            sad += (cy as i64 - ry as i64).abs();
            sad += (cu as i64 - ru as i64).abs();
            sad += (cv as i64 - rv as i64).abs();
        }
    }
    sad
}

/// Searches every reference block within the `|l-i| <= s, |m-j| <= s`
/// box (in block coordinates) and returns the absolute block coordinates
/// of the minimum-SAD match. Ties go to the first candidate encountered
/// in row-major (l ascending, then m ascending) scan order.
pub fn find_best_block(
    cur: &Frame,
    refr: &Frame,
    bi: usize,
    bj: usize,
    b: usize,
    s: usize,
) -> (usize, usize) {
    let (ref_rows, ref_cols) = refr.block_grid_dims(b);
    let mut best: Option<(i64, usize, usize)> = None;

    for l in 0..ref_rows {
        for m in 0..ref_cols {
            if (l as isize - bi as isize).abs() > s as isize || (m as isize - bj as isize).abs() > s as isize {
                continue;
            }
            let score = block_sad(cur, bi * b, bj * b, refr, l * b, m * b, b);
            match &best {
                Some((best_score, _, _)) if score >= *best_score => {}
                _ => best = Some((score, l, m)),
            }
        }
    }

    let (_, l, m) = best.expect("search window always contains the co-located block");
    (l, m)
}

/// Encodes every block of `cur` against the reference blocks of `refr`.
/// In quantized mode, `cur` is mutated in place with the decoder-visible
/// reconstruction so the *next* inter frame matches against the same
/// samples the decoder will hold.
#[allow(clippy::too_many_arguments)]
pub fn encode_frame(
    cur: &mut Frame,
    refr: &Frame,
    golomb: &Golomb,
    writer: &mut BitWriter,
    b: usize,
    s: usize,
    quant: QuantSteps,
) {
    let (rows, cols) = cur.block_grid_dims(b);
    let q = quant.as_array();

    for bi in 0..rows {
        for bj in 0..cols {
            let (l, m) = find_best_block(cur, refr, bi, bj, b, s);
            encode_signed(golomb, writer, l as i32);
            encode_signed(golomb, writer, m as i32);

            for a in 0..b {
                for dc in 0..b {
                    let cur_l = (bi * b + a) as isize;
                    let cur_c = (bj * b + dc) as isize;
                    let (cy, cu, cv) = cur.get_pixel(cur_l, cur_c);
                    let (ry, ru, rv) = refr.get_pixel((l * b + a) as isize, (m * b + dc) as isize);
                    let c = [cy as i32, cu as i32, cv as i32];
                    let r = [ry as i32, ru as i32, rv as i32];

                    for i in 0..3 {
                        let e = c[i] - r[i];
                        let effective = encode_residual(golomb, writer, e, q[i]);
                        if q[i] != 0 {
                            let recon = (r[i] + effective) as u8;
                            cur.put_component(i, cur_l, cur_c, recon);
                        }
                    }
                }
            }
        }
    }
}

/// Decodes every block of `cur` against `refr`, the previously
/// reconstructed frame.
pub fn decode_frame(
    cur: &mut Frame,
    refr: &Frame,
    golomb: &Golomb,
    reader: &mut BitReader,
    b: usize,
    s: usize,
    quant: QuantSteps,
) -> Result<()> {
    let (rows, cols) = cur.block_grid_dims(b);
    let q = quant.as_array();
    let _ = s; // the search window only bounds the encoder's search.

    for bi in 0..rows {
        for bj in 0..cols {
            let l = decode_signed(golomb, reader)? as usize;
            let m = decode_signed(golomb, reader)? as usize;

            for a in 0..b {
                for dc in 0..b {
                    let cur_l = (bi * b + a) as isize;
                    let cur_c = (bj * b + dc) as isize;
                    let (ry, ru, rv) = refr.get_pixel((l * b + a) as isize, (m * b + dc) as isize);
                    let r = [ry as i32, ru as i32, rv as i32];

                    for i in 0..3 {
                        let e = decode_residual(golomb, reader, q[i])?;
                        let val = r[i] + e;
                        cur.put_component(i, cur_l, cur_c, val as u8);
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framestore::ColorSpace;

    #[test]
    fn identity_match_picks_tie_break_in_row_major_order() {
        // E3: constant frame repeated, B=4, S=1 over an 8x8 grid.
        let mut prev = Frame::new(ColorSpace::C444, 8, 8);
        for (i, v) in prev.y.iter_mut().enumerate() {
            *v = (i % 251) as u8;
        }
        let cur = prev.clone();

        assert_eq!(find_best_block(&cur, &prev, 0, 0, 4, 1), (0, 0));
        assert_eq!(find_best_block(&cur, &prev, 0, 1, 4, 1), (0, 1));
        assert_eq!(find_best_block(&cur, &prev, 1, 0, 4, 1), (1, 0));
        assert_eq!(find_best_block(&cur, &prev, 1, 1, 4, 1), (1, 1));
    }

    #[test]
    fn lossless_inter_roundtrip() {
        let mut prev = Frame::new(ColorSpace::C444, 8, 8);
        for (i, v) in prev.y.iter_mut().enumerate() {
            *v = (i * 3 % 200) as u8;
        }
        let mut cur = prev.clone();
        // Perturb one block so it doesn't trivially match (0,0).
        cur.y[0] = cur.y[0].wrapping_add(5);

        let golomb = Golomb::new(4).unwrap();
        let mut writer = BitWriter::new();
        encode_frame(&mut cur, &prev, &golomb, &mut writer, 4, 2, QuantSteps::lossless());
        let bytes = writer.close();

        let mut decoded = Frame::new(ColorSpace::C444, 8, 8);
        let mut reader = BitReader::new(&bytes);
        decode_frame(&mut decoded, &prev, &golomb, &mut reader, 4, 2, QuantSteps::lossless()).unwrap();

        assert_eq!(decoded.y, cur.y);
    }
}
