//! Raw YUV container I/O: a single ASCII header line followed by the
//! concatenated Y/U/V planes of each frame, back to back.
//!
//! Grounded on `HybridCodec.py::read_video`/`computeShape` for plane-size
//! derivation per color space, and on the teacher's `ffv1-decoder` binary
//! for streaming frames through a `BufReader`/`BufWriter` rather than
//! holding the whole file twice in memory.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::framestore::Frame;
use crate::header::RawHeader;

fn frame_byte_len(header: RawHeader) -> usize {
    let y_len = header.width as usize * header.height as usize;
    let (ch, cw) = header
        .colorspace
        .chroma_dims(header.height as usize, header.width as usize);
    y_len + 2 * ch * cw
}

/// Reads a raw YUV file: the header line plus up to `limit_frames`
/// frames (or all frames present, if `None`).
pub fn read_raw_video(path: &Path, limit_frames: Option<usize>) -> Result<(RawHeader, Vec<Frame>)> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut line = String::new();
    reader.read_line(&mut line)?;
    let header = match crate::header::parse_header(line.trim_end())? {
        crate::header::ParsedHeader::Raw(raw) => raw,
        crate::header::ParsedHeader::Encoded(_) => {
            return Err(Error::HeaderMalformed(
                "raw YUV file carries an encoded-stream header".into(),
            ))
        }
    };

    let mut rest = Vec::new();
    reader.read_to_end(&mut rest)?;

    let frame_len = frame_byte_len(header);
    if frame_len == 0 || rest.len() % frame_len != 0 {
        return Err(Error::PlaneSizeMismatch(format!(
            "raw payload of {} bytes is not a multiple of the {}-byte frame size",
            rest.len(),
            frame_len
        )));
    }

    let total_frames = rest.len() / frame_len;
    let frames_to_read = limit_frames.map_or(total_frames, |n| n.min(total_frames));

    let (ch, cw) = header
        .colorspace
        .chroma_dims(header.height as usize, header.width as usize);
    let y_len = header.width as usize * header.height as usize;
    let c_len = ch * cw;

    let mut frames = Vec::with_capacity(frames_to_read);
    for i in 0..frames_to_read {
        let base = i * frame_len;
        let mut frame = Frame::new(header.colorspace, header.width as usize, header.height as usize);
        frame.y.copy_from_slice(&rest[base..base + y_len]);
        frame.u.copy_from_slice(&rest[base + y_len..base + y_len + c_len]);
        frame
            .v
            .copy_from_slice(&rest[base + y_len + c_len..base + y_len + 2 * c_len]);
        frames.push(frame);
    }

    Ok((header, frames))
}

/// Writes a raw YUV file: the header line followed by every frame's
/// planes, concatenated.
pub fn write_raw_video(path: &Path, header: RawHeader, frames: &[Frame]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", header.to_header_string())?;
    for frame in frames {
        writer.write_all(&frame.y)?;
        writer.write_all(&frame.u)?;
        writer.write_all(&frame.v)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framestore::ColorSpace;
    use std::env::temp_dir;

    #[test]
    fn raw_video_roundtrip() {
        let header = RawHeader {
            width: 4,
            height: 4,
            fps: 25,
            colorspace: ColorSpace::C420,
        };
        let mut frame = Frame::new(ColorSpace::C420, 4, 4);
        for (i, v) in frame.y.iter_mut().enumerate() {
            *v = i as u8;
        }
        for (i, v) in frame.u.iter_mut().enumerate() {
            *v = (i + 1) as u8;
        }

        let path = temp_dir().join("yuvcodec_rawio_test_roundtrip.yuv");
        write_raw_video(&path, header, std::slice::from_ref(&frame)).unwrap();
        let (parsed_header, frames) = read_raw_video(&path, None).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(parsed_header, header);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].y, frame.y);
        assert_eq!(frames[0].u, frame.u);
        assert_eq!(frames[0].v, frame.v);
    }

    #[test]
    fn truncated_payload_is_plane_size_mismatch() {
        let header = RawHeader {
            width: 4,
            height: 4,
            fps: 25,
            colorspace: ColorSpace::C444,
        };
        let path = temp_dir().join("yuvcodec_rawio_test_truncated.yuv");
        {
            let file = File::create(&path).unwrap();
            let mut writer = BufWriter::new(file);
            writeln!(writer, "{}", header.to_header_string()).unwrap();
            writer.write_all(&[0u8; 10]).unwrap();
        }
        let result = read_raw_video(&path, None);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(Error::PlaneSizeMismatch(_))));
    }

    #[test]
    fn limit_frames_caps_returned_count() {
        let header = RawHeader {
            width: 2,
            height: 2,
            fps: 25,
            colorspace: ColorSpace::C444,
        };
        let frame = Frame::new(ColorSpace::C444, 2, 2);
        let path = temp_dir().join("yuvcodec_rawio_test_limit.yuv");
        write_raw_video(&path, header, &[frame.clone(), frame.clone(), frame]).unwrap();
        let (_, frames) = read_raw_video(&path, Some(2)).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(frames.len(), 2);
    }
}
