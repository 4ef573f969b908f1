// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Types that can be handed to the communication library.
//!
//! Elementary numeric, boolean and character types map to a predefined
//! datatype. Everything else is sent as an opaque block of
//! `size_of::<T>()` bytes, so only plain-old-data types (no pointers, no heap
//! ownership) should opt in.

use crate::types::BuiltinKind;

/// Wire contract: which datatype describes `Self`.
///
/// The default (`BUILTIN = None`) sends `Self` as opaque bytes through a
/// derived datatype registered on first use. Aggregates usually opt in with
/// [`opaque_wire_type!`](crate::opaque_wire_type):
///
/// ```
/// use datatype_registry::{opaque_wire_type, WireType};
///
/// #[derive(Clone, Copy)]
/// #[repr(C)]
/// struct Triple {
///     row: u64,
///     col: u64,
///     val: f64,
/// }
///
/// opaque_wire_type!(Triple);
/// assert!(Triple::BUILTIN.is_none());
/// ```
pub trait WireType: Copy + 'static {
    /// Predefined datatype for `Self`, if the library has one.
    const BUILTIN: Option<BuiltinKind> = None;
}

/// Opt one or more types into opaque-bytes transmission.
#[macro_export]
macro_rules! opaque_wire_type {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::WireType for $ty {})+
    };
}

macro_rules! builtin_wire_type {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(impl WireType for $ty {
            const BUILTIN: Option<BuiltinKind> = Some(BuiltinKind::$kind);
        })+
    };
}

builtin_wire_type! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    char => WChar,
}

#[cfg(target_pointer_width = "64")]
builtin_wire_type! {
    isize => I64,
    usize => U64,
}

#[cfg(target_pointer_width = "32")]
builtin_wire_type! {
    isize => I32,
    usize => U32,
}

// Fixed-size arrays travel as opaque blocks keyed by their own type.
impl<T: WireType, const N: usize> WireType for [T; N] {}

// 128-bit integers have no predefined datatype.
impl WireType for i128 {}
impl WireType for u128 {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy)]
    struct Pair {
        _a: u32,
        _b: u32,
    }

    opaque_wire_type!(Pair);

    #[test]
    fn elementary_types_are_builtin() {
        assert_eq!(i8::BUILTIN, Some(BuiltinKind::I8));
        assert_eq!(u16::BUILTIN, Some(BuiltinKind::U16));
        assert_eq!(i32::BUILTIN, Some(BuiltinKind::I32));
        assert_eq!(u64::BUILTIN, Some(BuiltinKind::U64));
        assert_eq!(f32::BUILTIN, Some(BuiltinKind::F32));
        assert_eq!(f64::BUILTIN, Some(BuiltinKind::F64));
        assert_eq!(bool::BUILTIN, Some(BuiltinKind::Bool));
        assert_eq!(char::BUILTIN, Some(BuiltinKind::WChar));
    }

    #[test]
    fn builtin_sizes_match_rust_sizes() {
        fn check<T: WireType>() {
            let kind = T::BUILTIN.expect("builtin");
            assert_eq!(kind.size_bytes(), std::mem::size_of::<T>());
        }
        check::<i8>();
        check::<i64>();
        check::<u32>();
        check::<f64>();
        check::<bool>();
        check::<char>();
        check::<isize>();
        check::<usize>();
    }

    #[test]
    fn aggregates_are_opaque() {
        assert!(Pair::BUILTIN.is_none());
        assert!(<[f64; 3]>::BUILTIN.is_none());
        assert!(u128::BUILTIN.is_none());
    }
}
