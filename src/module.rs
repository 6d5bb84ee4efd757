//! In-memory representation of a module: a header plus an ordered list of
//! sections. A `Module` is built either by decoding a byte stream or by a
//! caller assembling values, and is treated as immutable for the duration
//! of any single encode or decode.

use crate::types::{ExternalKind, FuncType, ValueType};

/// First four bytes of every module: `\0asm`.
pub const MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];

/// The only module version this codec accepts.
pub const VERSION: u32 = 1;

/// Section ids as they appear on the wire.
pub mod section_id {
    pub const CUSTOM: u8 = 0;
    pub const TYPE: u8 = 1;
    pub const IMPORT: u8 = 2;
    pub const FUNCTION: u8 = 3;
    pub const TABLE: u8 = 4;
    pub const MEMORY: u8 = 5;
    pub const GLOBAL: u8 = 6;
    pub const EXPORT: u8 = 7;
    pub const START: u8 = 8;
    pub const ELEMENT: u8 = 9;
    pub const CODE: u8 = 10;
    pub const DATA: u8 = 11;
}

/// One exported definition: a name, what kind of thing it is, and an index
/// into that kind's index space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    pub field: String,
    pub kind: ExternalKind,
    pub index: u32,
}

/// A run of identical locals in a function body. Groups are preserved
/// as declared so that decode followed by encode reproduces the input
/// byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalEntry {
    pub count: u32,
    pub ty: ValueType,
}

/// The body of one function: local declarations plus raw instruction
/// bytes. The terminating end opcode is implicit; the codec appends it on
/// encode and strips it on decode. The declared body size is never stored:
/// it is recomputed from the emitted bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionBody {
    pub locals: Vec<LocalEntry>,
    pub code: Vec<u8>,
}

/// A module section. The enum is closed over the kinds this codec
/// implements; every other id surfaces as
/// [`CodecError::Unsupported`](crate::CodecError::Unsupported).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Type(Vec<FuncType>),
    Function(Vec<u32>),
    Export(Vec<ExportEntry>),
    Code(Vec<FunctionBody>),
}

impl Section {
    pub fn id(&self) -> u8 {
        match self {
            Section::Type(_) => section_id::TYPE,
            Section::Function(_) => section_id::FUNCTION,
            Section::Export(_) => section_id::EXPORT,
            Section::Code(_) => section_id::CODE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub version: u32,
    pub sections: Vec<Section>,
}

impl Module {
    /// An empty module at the supported version.
    pub fn new() -> Self {
        Module {
            version: VERSION,
            sections: vec![],
        }
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}
