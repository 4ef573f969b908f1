// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Communication library seam.
//!
//! The cache only needs five operations from the message-passing library:
//!
//! ```text
//! is_finalized()              MPI_Finalized
//! builtin(kind)               MPI_INT32_T, MPI_DOUBLE, ...
//! type_contiguous(n, base)    MPI_Type_contiguous
//! type_commit(dt)             MPI_Type_commit
//! type_free(&mut dt)          MPI_Type_free
//! ```
//!
//! [`LoopbackBackend`] implements them in-process for single-process runs and
//! for tests that need to observe or fault the library.

pub mod loopback;

pub use loopback::{LoopbackBackend, LoopbackCounters};

use crate::error::Result;
use crate::types::{BuiltinKind, Datatype};

/// Datatype operations of a message-passing library.
pub trait CommBackend: Send + Sync {
    /// Whether the library has been globally shut down.
    ///
    /// Once this returns `true`, no handle may be created or freed.
    fn is_finalized(&self) -> bool;

    /// Predefined handle for an elementary type. Never fails, never allocates.
    fn builtin(&self, kind: BuiltinKind) -> Datatype;

    /// Construct (but do not commit) a datatype of `count` contiguous `base`
    /// elements.
    fn type_contiguous(&self, count: usize, base: Datatype) -> Result<Datatype>;

    /// Commit a constructed datatype so it can be used in communication.
    fn type_commit(&self, datatype: Datatype) -> Result<()>;

    /// Release a constructed or committed datatype. Resets the handle to
    /// [`Datatype::NULL`] on success.
    fn type_free(&self, datatype: &mut Datatype) -> Result<()>;
}
