// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Datatype handles, type identity keys and the per-type datatype cache.
//!
//! Provides `Datatype` for opaque backend handles, `BuiltinKind` for the fixed
//! set of elementary datatypes, `TypeKey` for type identity and `DatatypeCache`
//! for derived datatypes registered at first use.

pub mod cache;
pub mod datatype;
pub mod key;

pub use cache::{CacheEntry, ClearOutcome, DatatypeCache, LookupStats};
pub use datatype::{BuiltinKind, Datatype};
pub use key::TypeKey;
