pub mod bitstream;
pub mod codec;
pub mod error;
pub mod framestore;
pub mod golomb;
pub mod header;
pub mod inter;
pub mod intra;
pub mod pred;
pub mod rawio;
pub mod residual;

pub use codec::Codec;
pub use error::{Error, Result};
pub use framestore::{ColorSpace, Frame};
pub use header::{EncodedHeader, HeaderDialect, ParsedHeader, RawHeader};
