//! MED-predictive intra-frame coder: the first frame of a stream is
//! always coded this way.
//!
//! Grounded on `HybridCodec.py`'s frame-0 branch of `encode_video`/
//! `read_encoded_video`: residuals are coded one full-resolution pixel
//! at a time, row-major, three components per pixel — matching the
//! `(signed_res{3}) repeated H*W times` stream grammar.

use crate::bitstream::{BitReader, BitWriter};
use crate::error::Result;
use crate::framestore::Frame;
use crate::golomb::Golomb;
use crate::pred::med_predict_triple;
use crate::residual::{decode_residual, encode_residual, QuantSteps};

fn neighbours(frame: &Frame, l: isize, c: isize) -> ((i32, i32, i32), (i32, i32, i32), (i32, i32, i32)) {
    let to_i32 = |(y, u, v): (u8, u8, u8)| (y as i32, u as i32, v as i32);
    (
        to_i32(frame.get_pixel(l, c - 1)),
        to_i32(frame.get_pixel(l - 1, c)),
        to_i32(frame.get_pixel(l - 1, c - 1)),
    )
}

/// Encodes the intra frame held in `frame` (its current sample values are
/// the source); in quantized mode, `frame` is mutated in place so later
/// predictions (within this frame, and the next inter frame) see the
/// same samples the decoder will reconstruct.
pub fn encode_frame(frame: &mut Frame, golomb: &Golomb, writer: &mut BitWriter, quant: QuantSteps) {
    let (height, width) = (frame.height, frame.width);
    let q = quant.as_array();

    for l in 0..height as isize {
        for c in 0..width as isize {
            let (west, north, northwest) = neighbours(frame, l, c);
            let pred = med_predict_triple(west, north, northwest);
            let pred = [pred.0, pred.1, pred.2];

            let (oy, ou, ov) = frame.get_pixel(l, c);
            let orig = [oy as i32, ou as i32, ov as i32];

            for i in 0..3 {
                let e = orig[i] - pred[i];
                let effective = encode_residual(golomb, writer, e, q[i]);

                // Writeback suppressed at line 0 / column 0 to preserve
                // the fixed-seed (0,0,0) boundary contract.
                if q[i] != 0 && l != 0 && c != 0 {
                    let recon = (pred[i] + effective) as u8;
                    frame.put_component(i, l, c, recon);
                }
            }
        }
    }
}

/// Decodes an intra frame into `frame`, filling every plane exactly
/// once, in row-major causal order.
pub fn decode_frame(
    frame: &mut Frame,
    golomb: &Golomb,
    reader: &mut BitReader,
    quant: QuantSteps,
) -> Result<()> {
    let (height, width) = (frame.height, frame.width);
    let q = quant.as_array();

    for l in 0..height as isize {
        for c in 0..width as isize {
            let (west, north, northwest) = neighbours(frame, l, c);
            let pred = med_predict_triple(west, north, northwest);
            let pred = [pred.0, pred.1, pred.2];

            for i in 0..3 {
                let e = decode_residual(golomb, reader, q[i])?;
                let val = pred[i] + e;
                frame.put_component(i, l, c, val as u8);
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
    fn lossless_roundtrip_single_frame() {
        let mut frame = Frame::new(ColorSpace::C444, 8, 8);
        for (i, v) in frame.y.iter_mut().enumerate() {
            *v = (i * 7 % 251) as u8;
        }
        for (i, v) in frame.u.iter_mut().enumerate() {
            *v = (i * 11 % 241) as u8;
        }
        let original = frame.clone();

        let golomb = Golomb::new(4).unwrap();
        let mut writer = BitWriter::new();
        encode_frame(&mut frame, &golomb, &mut writer, QuantSteps::lossless());
        let bytes = writer.close();

        let mut decoded = Frame::new(ColorSpace::C444, 8, 8);
        let mut reader = BitReader::new(&bytes);
        decode_frame(&mut decoded, &golomb, &mut reader, QuantSteps::lossless()).unwrap();

        assert_eq!(decoded.y, original.y);
        assert_eq!(decoded.u, original.u);
        assert_eq!(decoded.v, original.v);
    }

    #[test]
    fn all_zero_frame_emits_all_zero_sign_bits() {
        // E1: 8x8 4:4:4 all-zero frame, M=4.
        let mut frame = Frame::new(ColorSpace::C444, 8, 8);
        let golomb = Golomb::new(4).unwrap();
        let mut writer = BitWriter::new();
        encode_frame(&mut frame, &golomb, &mut writer, QuantSteps::lossless());
        let bytes = writer.close();
        // Every residual is zero: sign=0, Golomb(0) with M=4 is `0` then 2
        // remainder bits `00`, i.e. 4 bits per component: 8*8*3*4 = 768.
        assert_eq!(bytes.len() * 8, 768);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn single_nonzero_sample_e2() {
        // E2: 4x4 4:4:4, Y[0,0]=5, all else 0.
        let mut frame = Frame::new(ColorSpace::C444, 4, 4);
        frame.y[0] = 5;
        let golomb = Golomb::new(4).unwrap();
        let mut writer = BitWriter::new();
        encode_frame(&mut frame, &golomb, &mut writer, QuantSteps::lossless());
        let bytes = writer.close();

        let mut reader = BitReader::new(&bytes);
        // First component (Y at 0,0): sign=0, Golomb(5) with M=4 => q=1,r=1
        assert_eq!(reader.read_bit().unwrap(), 0);
        assert_eq!(reader.read_bit().unwrap(), 1); // unary q=1
        assert_eq!(reader.read_bit().unwrap(), 0); // terminator
        assert_eq!(reader.read_bits(2).unwrap(), 0b01); // remainder = 1
    }

    #[test]
    fn quantized_boundary_bound_e5_like() {
        // E5: lossy cycle with q=(2,0,0) on an 8x8 gradient in Y; U,V
        // round-trip exactly since their quant step is 0.
        let mut frame = Frame::new(ColorSpace::C444, 8, 8);
        for l in 0..8usize {
            for c in 0..8usize {
                frame.y[l * 8 + c] = (l * 8 + c) as u8;
            }
        }
        let original = frame.clone();

        let golomb = Golomb::new(4).unwrap();
        let quant = QuantSteps { y: 2, u: 0, v: 0 };
        let mut writer = BitWriter::new();
        encode_frame(&mut frame, &golomb, &mut writer, quant);
        let bytes = writer.close();

        let mut decoded = Frame::new(ColorSpace::C444, 8, 8);
        let mut reader = BitReader::new(&bytes);
        decode_frame(&mut decoded, &golomb, &mut reader, quant).unwrap();

        assert_eq!(decoded.u, original.u);
        assert_eq!(decoded.v, original.v);
        for l in 1..8usize {
            for c in 1..8usize {
                let o = original.y[l * 8 + c] as i32;
                let d = decoded.y[l * 8 + c] as i32;
                assert!((o - d).abs() <= 2, "bound violated at ({},{})", l, c);
            }
        }
    }
}
