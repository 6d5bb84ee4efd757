pub mod codec;
pub mod error;
pub mod leb128;
pub mod primitives;
pub mod sections;

pub use codec::{decode, decode_from, encode, encode_to_vec};
pub use error::{CodecError, ParseError, ParseErrorKind, ParseResult};
