//! Orchestrates whole-stream encode/decode: owns the frame sequence and
//! drives `IntraCoder` for frame 0, `InterCoder` for every frame after.
//!
//! Grounded on `HybridCodec.py::encode_video`/`read_encoded_video`'s
//! frame-0-is-special loop, and on `src/decoder.rs`'s per-frame driving
//! loop for the logging/error-propagation shape.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{Error, Result};
use crate::framestore::{ColorSpace, Frame};
use crate::golomb::Golomb;
use crate::header::{self, EncodedHeader, HeaderDialect, ParsedHeader, RawHeader};
use crate::rawio;
use crate::residual::QuantSteps;
use crate::{inter, intra};

/// An opened stream: either loaded from a raw YUV container or decoded
/// from a previously encoded one. Both paths converge on a plain `Frame`
/// sequence.
pub struct Codec {
    pub color_space: ColorSpace,
    pub width: usize,
    pub height: usize,
    pub fps: u32,
    frames: Vec<Frame>,
}

impl Codec {
    /// Builds a `Codec` directly from an already-loaded frame sequence,
    /// e.g. frames produced programmatically rather than read from disk.
    pub fn from_frames(
        color_space: ColorSpace,
        width: usize,
        height: usize,
        fps: u32,
        frames: Vec<Frame>,
    ) -> Codec {
        Codec {
            color_space,
            width,
            height,
            fps,
            frames,
        }
    }

    /// Loads frames straight from a raw YUV container (spec.md §6's
    /// `open_raw`).
    pub fn open_raw(path: &Path, limit_frames: Option<usize>) -> Result<Codec> {
        let (header, frames) = rawio::read_raw_video(path, limit_frames)?;
        Ok(Codec {
            color_space: header.colorspace,
            width: header.width as usize,
            height: header.height as usize,
            fps: header.fps,
            frames,
        })
    }

    /// Decodes a previously encoded stream (spec.md §6's `open_encoded`).
    ///
    /// Framing per spec.md §6: byte 0 is `header_length` (unsigned 8-bit),
    /// the following `header_length` bytes are the ASCII header, and the
    /// rest of the file is the bit-packed payload.
    pub fn open_encoded(path: &Path, limit_frames: Option<usize>) -> Result<Codec> {
        let mut file = File::open(path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let header_len = *bytes
            .first()
            .ok_or_else(|| Error::HeaderMalformed("empty stream".into()))? as usize;
        if bytes.len() < 1 + header_len {
            return Err(Error::HeaderMalformed(
                "header_length exceeds the stream's size".into(),
            ));
        }
        let header_str = std::str::from_utf8(&bytes[1..1 + header_len])
            .map_err(|_| Error::HeaderMalformed("header is not valid UTF-8".into()))?;
        let encoded = match header::parse_header(header_str)? {
            ParsedHeader::Encoded(e) => e,
            ParsedHeader::Raw(_) => {
                return Err(Error::HeaderMalformed(
                    "expected an encoded-stream header, found a raw YUV header".into(),
                ))
            }
        };

        let payload = &bytes[1 + header_len..];
        let golomb = Golomb::new(encoded.golomb_m)?;
        let quant = encoded.quant.unwrap_or_else(QuantSteps::lossless);
        let frame_count = limit_frames.map_or(encoded.total_frames as usize, |n| {
            (encoded.total_frames as usize).min(n)
        });

        let raw = encoded.raw;
        let mut reader = BitReader::new(payload);
        let mut frames = Vec::with_capacity(frame_count);

        for i in 0..frame_count {
            let mut frame = Frame::new(raw.colorspace, raw.width as usize, raw.height as usize);
            if i == 0 {
                intra::decode_frame(&mut frame, &golomb, &mut reader, quant)?;
            } else {
                let refr = frames[i - 1].clone();
                inter::decode_frame(
                    &mut frame,
                    &refr,
                    &golomb,
                    &mut reader,
                    encoded.block_size as usize,
                    encoded.search_area as usize,
                    quant,
                )?;
            }
            log::info!("decoded frame {}/{}", i + 1, frame_count);
            frames.push(frame);
        }

        Ok(Codec {
            color_space: raw.colorspace,
            width: raw.width as usize,
            height: raw.height as usize,
            fps: raw.fps,
            frames,
        })
    }

    /// Encodes the currently loaded frames to `path`, with Golomb divisor
    /// `m`, block size `b`, search window `s`, and optional per-component
    /// quantization (spec.md §6's `encode_to`).
    #[allow(clippy::too_many_arguments)]
    pub fn encode_to(
        &self,
        path: &Path,
        m: u32,
        b: usize,
        s: usize,
        q: Option<(u8, u8, u8)>,
    ) -> Result<()> {
        if self.width % b != 0 || self.height % b != 0 {
            return Err(Error::PlaneSizeMismatch(format!(
                "frame dimensions {}x{} are not multiples of block size {}",
                self.width, self.height, b
            )));
        }

        let golomb = Golomb::new(m)?;
        let quant = q
            .map(|(y, u, v)| QuantSteps { y, u, v })
            .unwrap_or_else(QuantSteps::lossless);

        let header = EncodedHeader {
            raw: RawHeader {
                width: self.width as u32,
                height: self.height as u32,
                fps: self.fps,
                colorspace: self.color_space,
            },
            golomb_m: m,
            total_frames: self.frames.len() as u32,
            block_size: b as u32,
            search_area: s as u32,
            quant: q.map(|(y, u, v)| QuantSteps { y, u, v }),
        };

        let mut writer = BitWriter::new();
        let mut working: Vec<Frame> = self.frames.clone();

        for i in 0..working.len() {
            if i == 0 {
                let mut frame = working[0].clone();
                intra::encode_frame(&mut frame, &golomb, &mut writer, quant);
                working[0] = frame;
            } else {
                let refr = working[i - 1].clone();
                let mut cur = working[i].clone();
                inter::encode_frame(&mut cur, &refr, &golomb, &mut writer, b, s, quant);
                working[i] = cur;
            }
            log::info!("encoded frame {}/{}", i + 1, working.len());
        }

        let header_str = header.to_header_string(HeaderDialect::Full);
        if header_str.len() > u8::MAX as usize {
            return Err(Error::HeaderMalformed(format!(
                "serialised header is {} bytes, exceeds the 255-byte header_length limit",
                header_str.len()
            )));
        }

        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        out.write_all(&[header_str.len() as u8])?;
        out.write_all(header_str.as_bytes())?;
        out.write_all(&writer.close())?;
        out.flush()?;
        Ok(())
    }

    /// The frames currently held by this `Codec` (loaded or decoded).
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn gradient_frame(cs: ColorSpace, w: usize, h: usize, seed: u8) -> Frame {
        let mut frame = Frame::new(cs, w, h);
        for (i, v) in frame.y.iter_mut().enumerate() {
            *v = ((i as u32 + seed as u32) % 251) as u8;
        }
        for (i, v) in frame.u.iter_mut().enumerate() {
            *v = ((i as u32 * 3 + seed as u32) % 241) as u8;
        }
        for (i, v) in frame.v.iter_mut().enumerate() {
            *v = ((i as u32 * 5 + seed as u32) % 239) as u8;
        }
        frame
    }

    #[test]
    fn lossless_whole_stream_roundtrip() {
        let frames = vec![
            gradient_frame(ColorSpace::C444, 8, 8, 0),
            gradient_frame(ColorSpace::C444, 8, 8, 7),
            gradient_frame(ColorSpace::C444, 8, 8, 13),
        ];
        let codec = Codec {
            color_space: ColorSpace::C444,
            width: 8,
            height: 8,
            fps: 25,
            frames: frames.clone(),
        };

        let path = temp_dir().join("yuvcodec_codec_test_lossless.bin");
        codec.encode_to(&path, 4, 4, 1, None).unwrap();
        let decoded = Codec::open_encoded(&path, None).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(decoded.frames().len(), 3);
        for (orig, got) in frames.iter().zip(decoded.frames()) {
            assert_eq!(orig.y, got.y);
            assert_eq!(orig.u, got.u);
            assert_eq!(orig.v, got.v);
        }
    }

    #[test]
    fn non_multiple_of_block_size_is_rejected() {
        let frames = vec![gradient_frame(ColorSpace::C444, 6, 6, 0)];
        let codec = Codec {
            color_space: ColorSpace::C444,
            width: 6,
            height: 6,
            fps: 25,
            frames,
        };
        let path = temp_dir().join("yuvcodec_codec_test_reject.bin");
        let result = codec.encode_to(&path, 4, 4, 1, None);
        assert!(matches!(result, Err(Error::PlaneSizeMismatch(_))));
    }
}
