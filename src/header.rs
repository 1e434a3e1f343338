//! Serialises and parses the stream header described in spec.md §4.7.
//!
//! Two dialects are supported, per the REDESIGN FLAG in spec.md §9's
//! "Header parsing quirks" note: [`HeaderDialect::Legacy`] reproduces the
//! original parser's bugs byte-for-byte (`F` read as exactly two digits,
//! `G` read as only the last digit of its numeric suffix, grounded on
//! `HybridCodec.py::handleHeader`), while [`HeaderDialect::Full`] writes
//! and reads `F`/`G` as their whole decimal value. A leading `V2` token
//! marks a header as `Full`; its absence means `Legacy`.

use crate::error::{Error, Result};
use crate::framestore::ColorSpace;
use crate::residual::QuantSteps;

/// Which header-token framing a stream uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderDialect {
    /// Reproduces `HybridCodec.py`'s `F` (two-digit) and `G` (last-digit)
    /// truncation bugs, for decoding legacy-encoded streams.
    Legacy,
    /// Writes and reads `F`/`G` as full, untruncated integers.
    Full,
}

/// The required fields of a raw YUV container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHeader {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub colorspace: ColorSpace,
}

impl RawHeader {
    pub fn to_header_string(self) -> String {
        format!(
            "W{} H{} F{:02} C{}",
            self.width,
            self.height,
            self.fps,
            self.colorspace.code()
        )
    }
}

/// The full header of a compressed stream: the raw fields plus the
/// encoder-added tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedHeader {
    pub raw: RawHeader,
    pub golomb_m: u32,
    pub total_frames: u32,
    pub block_size: u32,
    pub search_area: u32,
    pub quant: Option<QuantSteps>,
}

impl EncodedHeader {
    pub fn to_header_string(self, dialect: HeaderDialect) -> String {
        let q = self
            .quant
            .map(|q| format!(" q{}:{}:{}", q.y, q.u, q.v))
            .unwrap_or_default();
        match dialect {
            HeaderDialect::Legacy => format!(
                "ENCODED {} Golomb{} z{} b{} s{}{}",
                self.raw.to_header_string(),
                self.golomb_m,
                self.total_frames,
                self.block_size,
                self.search_area,
                q,
            ),
            HeaderDialect::Full => format!(
                "V2 {} G{} z{} b{} s{}{}",
                self.raw.to_header_string(),
                self.golomb_m,
                self.total_frames,
                self.block_size,
                self.search_area,
                q,
            ),
        }
    }
}

/// The result of parsing a header string: a bare raw-YUV header, or a
/// full encoded-stream header. Presence of a `G`/`Golomb` token is what
/// distinguishes the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedHeader {
    Raw(RawHeader),
    Encoded(EncodedHeader),
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::HeaderMalformed(msg.into())
}

fn parse_u32(s: &str, field: &str) -> Result<u32> {
    s.parse::<u32>()
        .map_err(|_| malformed(format!("unparsable {} token value: {:?}", field, s)))
}

fn parse_quant(suffix: &str) -> Result<QuantSteps> {
    let parts: Vec<&str> = suffix.split(':').collect();
    if parts.len() != 3 {
        return Err(malformed(format!("malformed q token: {:?}", suffix)));
    }
    let y = parts[0]
        .parse::<u8>()
        .map_err(|_| malformed("unparsable q.y"))?;
    let u = parts[1]
        .parse::<u8>()
        .map_err(|_| malformed("unparsable q.u"))?;
    let v = parts[2]
        .parse::<u8>()
        .map_err(|_| malformed("unparsable q.v"))?;
    Ok(QuantSteps { y, u, v })
}

#[derive(Default)]
struct Fields {
    width: Option<u32>,
    height: Option<u32>,
    fps: Option<u32>,
    colorspace_code: Option<u32>,
    golomb_m: Option<u32>,
    total_frames: Option<u32>,
    block_size: Option<u32>,
    search_area: Option<u32>,
    quant: Option<QuantSteps>,
}

impl Fields {
    fn into_raw(self) -> Result<RawHeader> {
        let width = self.width.ok_or_else(|| malformed("missing W token"))?;
        let height = self.height.ok_or_else(|| malformed("missing H token"))?;
        let fps = self.fps.ok_or_else(|| malformed("missing F token"))?;
        let code = self
            .colorspace_code
            .ok_or_else(|| malformed("missing C token"))?;
        Ok(RawHeader {
            width,
            height,
            fps,
            colorspace: ColorSpace::from_code(code)?,
        })
    }
}

/// Parses a header string in the legacy dialect, reproducing
/// `HybridCodec.py::handleHeader`'s truncation bugs.
fn parse_fields_legacy(tokens: &[&str]) -> Result<Fields> {
    let mut fields = Fields::default();
    for &token in tokens {
        if token.is_empty() {
            continue;
        }
        let c = token.chars().next().unwrap();
        match c {
            'W' => fields.width = Some(parse_u32(&token[1..], "W")?),
            'H' => fields.height = Some(parse_u32(&token[1..], "H")?),
            'F' => {
                // Bug-for-bug: only the first two characters after 'F'.
                let end = (3).min(token.len());
                fields.fps = Some(parse_u32(&token[1..end], "F")?);
            }
            'C' => fields.colorspace_code = Some(parse_u32(&token[1..], "C")?),
            'G' => {
                // Bug-for-bug: only the last digit of the token.
                let last = token
                    .chars()
                    .last()
                    .and_then(|ch| ch.to_digit(10))
                    .ok_or_else(|| malformed("unparsable G token"))?;
                fields.golomb_m = Some(last);
            }
            'z' => fields.total_frames = Some(parse_u32(&token[1..], "z")?),
            'b' => fields.block_size = Some(parse_u32(&token[1..], "b")?),
            's' => fields.search_area = Some(parse_u32(&token[1..], "s")?),
            'q' => fields.quant = Some(parse_quant(&token[1..])?),
            // Unrecognised tokens (e.g. the literal "ENCODED" marker) are
            // silently ignored, matching the source parser.
            _ => {}
        }
    }
    Ok(fields)
}

/// Parses a header string in the full dialect: `F` and `G` carry their
/// whole decimal value, no truncation.
fn parse_fields_full(tokens: &[&str]) -> Result<Fields> {
    let mut fields = Fields::default();
    for &token in tokens {
        if token.is_empty() || token == "V2" {
            continue;
        }
        let c = token.chars().next().unwrap();
        match c {
            'W' => fields.width = Some(parse_u32(&token[1..], "W")?),
            'H' => fields.height = Some(parse_u32(&token[1..], "H")?),
            'F' => fields.fps = Some(parse_u32(&token[1..], "F")?),
            'C' => fields.colorspace_code = Some(parse_u32(&token[1..], "C")?),
            'G' => fields.golomb_m = Some(parse_u32(&token[1..], "G")?),
            'z' => fields.total_frames = Some(parse_u32(&token[1..], "z")?),
            'b' => fields.block_size = Some(parse_u32(&token[1..], "b")?),
            's' => fields.search_area = Some(parse_u32(&token[1..], "s")?),
            'q' => fields.quant = Some(parse_quant(&token[1..])?),
            _ => {}
        }
    }
    Ok(fields)
}

/// Parses a header string, auto-detecting dialect from a leading `V2`
/// token, and auto-detecting raw-vs-encoded from the presence of a
/// Golomb token.
pub fn parse_header(s: &str) -> Result<ParsedHeader> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    let dialect = if tokens.first() == Some(&"V2") {
        HeaderDialect::Full
    } else {
        HeaderDialect::Legacy
    };

    let fields = match dialect {
        HeaderDialect::Legacy => parse_fields_legacy(&tokens)?,
        HeaderDialect::Full => parse_fields_full(&tokens)?,
    };

    let golomb_m = fields.golomb_m;
    let total_frames = fields.total_frames;
    let block_size = fields.block_size;
    let search_area = fields.search_area;
    let quant = fields.quant;
    let raw = fields.into_raw()?;

    match golomb_m {
        None => Ok(ParsedHeader::Raw(raw)),
        Some(golomb_m) => Ok(ParsedHeader::Encoded(EncodedHeader {
            raw,
            golomb_m,
            total_frames: total_frames.ok_or_else(|| malformed("missing z token"))?,
            block_size: block_size.ok_or_else(|| malformed("missing b token"))?,
            search_area: search_area.ok_or_else(|| malformed("missing s token"))?,
            quant,
        })),
    }
}
