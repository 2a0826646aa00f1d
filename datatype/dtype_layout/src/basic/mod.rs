//! Builtin element table.
//!
//! Basic elements are the leaves of every derived datatype. They have a
//! fixed byte size, no internal structure, and are always contiguous. The
//! table is process-wide and constant: basic elements are never created or
//! destroyed.
//!
//! # Discriminant Ranges
//!
//! - 0-15: C character and integer types
//! - 16-31: floating point and complex types
//! - 32-47: fixed-width integer types
//! - 48-63: address-sized runtime types

use std::fmt;

/// A builtin element identifier (u8 = 256 possible kinds).
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BasicType {
    // === C character and integer types (0-15) ===
    Char = 0,
    SignedChar = 1,
    UnsignedChar = 2,
    /// Uninterpreted byte.
    Byte = 3,
    Short = 4,
    UnsignedShort = 5,
    Int = 6,
    Unsigned = 7,
    Long = 8,
    UnsignedLong = 9,
    LongLong = 10,
    UnsignedLongLong = 11,
    WChar = 12,
    CBool = 13,

    // === Floating point and complex (16-31) ===
    Float = 16,
    Double = 17,
    /// Stored in 16 bytes on every supported target.
    LongDouble = 18,
    CFloatComplex = 19,
    CDoubleComplex = 20,

    // === Fixed-width integers (32-47) ===
    Int8 = 32,
    Int16 = 33,
    Int32 = 34,
    Int64 = 35,
    UInt8 = 36,
    UInt16 = 37,
    UInt32 = 38,
    UInt64 = 39,

    // === Address-sized runtime types (48-63) ===
    /// Address integer, the same width as a byte displacement.
    Aint = 48,
    Offset = 49,
    Count = 50,
}

impl BasicType {
    /// Every builtin element, in discriminant order.
    pub const ALL: [BasicType; 30] = [
        Self::Char,
        Self::SignedChar,
        Self::UnsignedChar,
        Self::Byte,
        Self::Short,
        Self::UnsignedShort,
        Self::Int,
        Self::Unsigned,
        Self::Long,
        Self::UnsignedLong,
        Self::LongLong,
        Self::UnsignedLongLong,
        Self::WChar,
        Self::CBool,
        Self::Float,
        Self::Double,
        Self::LongDouble,
        Self::CFloatComplex,
        Self::CDoubleComplex,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Aint,
        Self::Offset,
        Self::Count,
    ];

    /// Byte size of one element.
    #[inline]
    pub const fn size(self) -> i64 {
        match self {
            Self::Char
            | Self::SignedChar
            | Self::UnsignedChar
            | Self::Byte
            | Self::CBool
            | Self::Int8
            | Self::UInt8 => 1,
            Self::Short | Self::UnsignedShort | Self::Int16 | Self::UInt16 => 2,
            Self::Int
            | Self::Unsigned
            | Self::WChar
            | Self::Float
            | Self::Int32
            | Self::UInt32 => 4,
            Self::Long
            | Self::UnsignedLong
            | Self::LongLong
            | Self::UnsignedLongLong
            | Self::Double
            | Self::CFloatComplex
            | Self::Int64
            | Self::UInt64
            | Self::Aint
            | Self::Offset
            | Self::Count => 8,
            Self::LongDouble | Self::CDoubleComplex => 16,
        }
    }

    /// Name used in scripts and diagnostics.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::SignedChar => "signed_char",
            Self::UnsignedChar => "unsigned_char",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::UnsignedShort => "unsigned_short",
            Self::Int => "int",
            Self::Unsigned => "unsigned",
            Self::Long => "long",
            Self::UnsignedLong => "unsigned_long",
            Self::LongLong => "long_long",
            Self::UnsignedLongLong => "unsigned_long_long",
            Self::WChar => "wchar",
            Self::CBool => "c_bool",
            Self::Float => "float",
            Self::Double => "double",
            Self::LongDouble => "long_double",
            Self::CFloatComplex => "c_float_complex",
            Self::CDoubleComplex => "c_double_complex",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Aint => "aint",
            Self::Offset => "offset",
            Self::Count => "count",
        }
    }

    /// Look up a builtin by its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|basic| basic.name() == name)
    }
}

impl fmt::Debug for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BasicType::{}", self.name())
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Compile-time size assertion: BasicType must be exactly 1 byte
const _: () = assert!(std::mem::size_of::<BasicType>() == 1);

#[cfg(test)]
mod tests;
