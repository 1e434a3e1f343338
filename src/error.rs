use thiserror::Error;

/// Errors produced while parsing, encoding, or decoding a stream.
#[derive(Debug, Error)]
pub enum Error {
    /// The ASCII header was missing a required token or carried an
    /// unparsable one.
    #[error("malformed header: {0}")]
    HeaderMalformed(String),
    /// The `C` token did not name 444, 422, or 420.
    #[error("unsupported colorspace code: {0}")]
    UnsupportedColorSpace(u32),
    /// The Golomb divisor `M` was not a positive power of two.
    #[error("golomb divisor must be a positive power of two, got {0}")]
    GolombParamInvalid(u32),
    /// A BitStream read reached end-of-input mid-code.
    #[error("stream truncated while decoding")]
    StreamTruncated,
    /// The raw input was shorter than `frames * frame_length` implies.
    #[error("plane size mismatch: {0}")]
    PlaneSizeMismatch(String),
    /// Underlying byte source/sink failure.
    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),
}

/// A specialised `Result` type for codec operations.
pub type Result<T> = ::std::result::Result<T, Error>;
