// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque datatype handles and the builtin datatype enumeration.
//!
//! A `Datatype` is whatever the communication library hands out to describe a
//! payload layout. Builtin handles are owned by the library; derived handles
//! are created by the [`DatatypeCache`](super::DatatypeCache) and owned by it.

/// Opaque datatype handle issued by a [`CommBackend`](crate::CommBackend).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Datatype(u64);

impl Datatype {
    /// Null handle (`MPI_DATATYPE_NULL` equivalent).
    pub const NULL: Datatype = Datatype(0);

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for Datatype {
    fn default() -> Self {
        Self::NULL
    }
}

impl std::fmt::Debug for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "Datatype(NULL)")
        } else {
            write!(f, "Datatype({:#x})", self.0)
        }
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Elementary datatypes predefined by the communication library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
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
    /// Extended precision float (C `long double`); no Rust type maps to it.
    LongDouble,
    Bool,
    /// 32-bit character (`wchar_t` on LP64 targets), used for Rust `char`.
    WChar,
    /// Untyped byte, base of every derived datatype.
    Byte,
}

impl BuiltinKind {
    /// Every builtin kind, in declaration order.
    pub const ALL: [BuiltinKind; 14] = [
        BuiltinKind::I8,
        BuiltinKind::I16,
        BuiltinKind::I32,
        BuiltinKind::I64,
        BuiltinKind::U8,
        BuiltinKind::U16,
        BuiltinKind::U32,
        BuiltinKind::U64,
        BuiltinKind::F32,
        BuiltinKind::F64,
        BuiltinKind::LongDouble,
        BuiltinKind::Bool,
        BuiltinKind::WChar,
        BuiltinKind::Byte,
    ];

    /// Size in bytes of one element on the wire.
    #[must_use]
    pub const fn size_bytes(self) -> usize {
        match self {
            BuiltinKind::I8 | BuiltinKind::U8 | BuiltinKind::Bool | BuiltinKind::Byte => 1,
            BuiltinKind::I16 | BuiltinKind::U16 => 2,
            BuiltinKind::I32 | BuiltinKind::U32 | BuiltinKind::F32 | BuiltinKind::WChar => 4,
            BuiltinKind::I64 | BuiltinKind::U64 | BuiltinKind::F64 => 8,
            BuiltinKind::LongDouble => 16,
        }
    }

    /// Position in [`BuiltinKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name of the equivalent MPI predefined datatype.
    #[must_use]
    pub const fn mpi_name(self) -> &'static str {
        match self {
            BuiltinKind::I8 => "MPI_INT8_T",
            BuiltinKind::I16 => "MPI_INT16_T",
            BuiltinKind::I32 => "MPI_INT32_T",
            BuiltinKind::I64 => "MPI_INT64_T",
            BuiltinKind::U8 => "MPI_UINT8_T",
            BuiltinKind::U16 => "MPI_UINT16_T",
            BuiltinKind::U32 => "MPI_UINT32_T",
            BuiltinKind::U64 => "MPI_UINT64_T",
            BuiltinKind::F32 => "MPI_FLOAT",
            BuiltinKind::F64 => "MPI_DOUBLE",
            BuiltinKind::LongDouble => "MPI_LONG_DOUBLE",
            BuiltinKind::Bool => "MPI_C_BOOL",
            BuiltinKind::WChar => "MPI_WCHAR",
            BuiltinKind::Byte => "MPI_BYTE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handle() {
        assert!(Datatype::NULL.is_null());
        assert!(Datatype::default().is_null());
        assert!(!Datatype::from_raw(7).is_null());
        assert_eq!(format!("{:?}", Datatype::NULL), "Datatype(NULL)");
        assert_eq!(format!("{:?}", Datatype::from_raw(0x10)), "Datatype(0x10)");
    }

    #[test]
    fn all_kinds_indexed_in_order() {
        for (idx, kind) in BuiltinKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), idx);
        }
    }

    #[test]
    fn sizes_match_native_types() {
        assert_eq!(BuiltinKind::I16.size_bytes(), std::mem::size_of::<i16>());
        assert_eq!(BuiltinKind::U64.size_bytes(), std::mem::size_of::<u64>());
        assert_eq!(BuiltinKind::F32.size_bytes(), std::mem::size_of::<f32>());
        assert_eq!(BuiltinKind::Bool.size_bytes(), std::mem::size_of::<bool>());
        assert_eq!(BuiltinKind::WChar.size_bytes(), std::mem::size_of::<char>());
    }
}
