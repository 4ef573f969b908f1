// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # datatype-registry - Communication datatypes for Rust types
//!
//! Every point-to-point or collective call of a message-passing library needs a
//! datatype handle describing the payload. This crate maps a Rust type to that
//! handle: elementary types resolve to the library's predefined datatypes,
//! everything else is registered once as a contiguous block of opaque bytes and
//! cached for the rest of the process.
//!
//! ## Quick Start
//!
//! ```rust
//! use datatype_registry::{opaque_wire_type, LoopbackBackend, RegistryConfig, Result};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Copy)]
//! #[repr(C)]
//! struct Triple {
//!     row: u64,
//!     col: u64,
//!     val: f64,
//! }
//! opaque_wire_type!(Triple);
//!
//! fn main() -> Result<()> {
//!     let backend = Arc::new(LoopbackBackend::new());
//!     let _guard = datatype_registry::init_global(backend, RegistryConfig::default())?;
//!
//!     let int32 = datatype_registry::resolve::<i32>()?;    // predefined
//!     let triple = datatype_registry::resolve::<Triple>()?; // registered once
//!     assert_eq!(triple, datatype_registry::resolve::<Triple>()?);
//!     assert_ne!(int32, triple);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! resolve::<T>()
//!   |
//!   +-- T::BUILTIN is Some(kind) --> backend.builtin(kind)
//!   |
//!   +-- otherwise --> DatatypeCache::get_or_create(TypeKey::of::<T>(), size_of::<T>())
//!                       |-- hit  --> cached Datatype
//!                       +-- miss --> type_contiguous + type_commit, cache, return
//! ```
//!
//! ## Modules Overview
//!
//! - [`resolver`] - `Resolver`, process-wide registry (start here)
//! - [`types`] - `Datatype`, `BuiltinKind`, `TypeKey`, `DatatypeCache`
//! - [`backend`] - `CommBackend` seam and the in-process `LoopbackBackend`
//! - [`wire`] - `WireType` opt-in trait
//! - [`config`] - `RegistryConfig` (defaults + environment)

/// Communication library seam and in-process backend.
pub mod backend;
/// Registry configuration (defaults, environment overrides).
pub mod config;
/// Error type and `Result` alias.
pub mod error;
/// Type-to-datatype resolution and the process-wide registry.
pub mod resolver;
/// Datatype handles, type keys and the datatype cache.
pub mod types;
/// `WireType` trait and builtin mappings.
pub mod wire;

pub use backend::{CommBackend, LoopbackBackend, LoopbackCounters};
pub use config::RegistryConfig;
pub use error::{Error, Result};
pub use resolver::{global, init_global, resolve, teardown_global, GlobalGuard, Resolver};
pub use types::{
    BuiltinKind, CacheEntry, ClearOutcome, Datatype, DatatypeCache, LookupStats, TypeKey,
};
pub use wire::WireType;
