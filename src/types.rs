//! Pure data definitions for the module type model.
//!
//! Type tags are encoded on the wire as signed 7-bit varints with fixed
//! negative sentinels. The constants here must match the binary format
//! exactly; they are never derived.

/// A value type, encoded as a varint7 sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    I32,
    I64,
    F32,
    F64,
}

impl ValueType {
    pub const fn code(self) -> i8 {
        match self {
            ValueType::I32 => -0x01,
            ValueType::I64 => -0x02,
            ValueType::F32 => -0x03,
            ValueType::F64 => -0x04,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -0x01 => Some(ValueType::I32),
            -0x02 => Some(ValueType::I64),
            -0x03 => Some(ValueType::F32),
            -0x04 => Some(ValueType::F64),
            _ => None,
        }
    }
}

/// Element type of a table. Only `anyfunc` exists in the MVP format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElemType {
    AnyFunc,
}

impl ElemType {
    pub const fn code(self) -> i8 {
        -0x10
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -0x10 => Some(ElemType::AnyFunc),
            _ => None,
        }
    }
}

/// Result type of a block-structured instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Empty,
    Value(ValueType),
}

impl BlockType {
    pub const fn code(self) -> i8 {
        match self {
            BlockType::Empty => -0x40,
            BlockType::Value(v) => v.code(),
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -0x40 => Some(BlockType::Empty),
            _ => ValueType::from_code(code).map(BlockType::Value),
        }
    }
}

/// A function signature: ordered parameter and result types.
///
/// The `func` form tag that prefixes every signature on the wire is fixed;
/// the codec emits and checks [`FuncType::FORM`], the model never stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncType {
    pub params: Vec<ValueType>,
    pub results: Vec<ValueType>,
}

impl FuncType {
    pub const FORM: i8 = -0x20;
}

/// Kind of definition an export (or import) refers to, one byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalKind {
    Function,
    Table,
    Memory,
    Global,
}

impl ExternalKind {
    pub const fn code(self) -> u8 {
        match self {
            ExternalKind::Function => 0,
            ExternalKind::Table => 1,
            ExternalKind::Memory => 2,
            ExternalKind::Global => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ExternalKind::Function),
            1 => Some(ExternalKind::Table),
            2 => Some(ExternalKind::Memory),
            3 => Some(ExternalKind::Global),
            _ => None,
        }
    }
}

/// Size bounds of a table or memory region.
///
/// On the wire: a flags varint (bit 0 set when `maximum` is present),
/// the initial bound, then the maximum when flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizableLimits {
    pub initial: u32,
    pub maximum: Option<u32>,
}

impl ResizableLimits {
    pub fn flags(&self) -> u32 {
        self.maximum.is_some() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Const,
    Var,
}

/// Type of a global variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalType {
    pub content_type: ValueType,
    pub mutability: Mutability,
}

/// Type of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableType {
    pub elem_type: ElemType,
    pub limits: ResizableLimits,
}

/// Type of a linear memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryType {
    pub limits: ResizableLimits,
}

/// An initializer expression: raw instruction bytes without the
/// terminating end opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitExpr {
    pub expr: Vec<u8>,
}
