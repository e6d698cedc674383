use crate::TargetAbi;
use core::fmt;

/// FastC primitive types plus raw pointers, as they appear in C.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    Usize,
    Isize,
    /// Any data pointer (`T*`).
    Ptr,
}

impl Scalar {
    pub const ALL: [Self; 14] = [
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Bool,
        Self::Usize,
        Self::Isize,
        Self::Ptr,
    ];

    /// Size in bytes on `target`.
    #[must_use]
    pub const fn size(self, target: &TargetAbi) -> usize {
        match self {
            Self::I8 | Self::U8 | Self::Bool => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
            Self::Usize | Self::Isize => target.size_width,
            Self::Ptr => target.pointer_width,
        }
    }

    /// Alignment in bytes when used as a struct field on `target`.
    #[must_use]
    pub const fn align(self, target: &TargetAbi) -> usize {
        match self {
            Self::I64 | Self::U64 | Self::F64 => target.align_64,
            _ => self.size(target),
        }
    }

    /// The C spelling used by generated code and the runtime header.
    #[must_use]
    pub const fn c_name(self) -> &'static str {
        match self {
            Self::I8 => "int8_t",
            Self::I16 => "int16_t",
            Self::I32 => "int32_t",
            Self::I64 => "int64_t",
            Self::U8 => "uint8_t",
            Self::U16 => "uint16_t",
            Self::U32 => "uint32_t",
            Self::U64 => "uint64_t",
            Self::F32 => "float",
            Self::F64 => "double",
            Self::Bool => "bool",
            Self::Usize => "size_t",
            Self::Isize => "ptrdiff_t",
            Self::Ptr => "void*",
        }
    }

    /// The FastC source spelling.
    #[must_use]
    pub const fn fastc_name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Bool => "bool",
            Self::Usize => "usize",
            Self::Isize => "isize",
            Self::Ptr => "raw",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fastc_name())
    }
}
