//! Binary codec for WebAssembly modules.
//!
//! Translates between an in-memory [`Module`] and its canonical binary
//! encoding. Encoding always emits minimal-length varints; any binary
//! that sticks to them (every binary this crate emits does) decodes and
//! re-encodes to the identical bytes. Decoding is structural only; index
//! bounds and type well-formedness are a validator's job, not this
//! crate's.
//!
//! ```
//! use wasmbin::{decode, encode_to_vec};
//!
//! let bytes = [0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00];
//! let module = decode(&bytes).unwrap();
//! assert!(module.sections.is_empty());
//! assert_eq!(encode_to_vec(&module).unwrap(), bytes);
//! ```

pub mod binary;
pub mod module;
pub mod types;

pub use binary::codec::{decode, decode_from, encode, encode_to_vec};
pub use binary::error::CodecError;
pub use module::{ExportEntry, FunctionBody, LocalEntry, Module, Section};
