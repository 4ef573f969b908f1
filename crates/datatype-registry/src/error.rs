// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by the resolver, the cache and the backends.

use crate::types::Datatype;
use thiserror::Error;

/// Errors returned by datatype registration and the process-wide registry.
///
/// Backend failures are passed through untouched: the cache neither retries nor
/// substitutes a fallback descriptor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The communication library rejected an operation with a native error code.
    #[error("{op} failed with error code {code}")]
    Backend { op: &'static str, code: i32 },

    /// The communication subsystem is already finalized.
    #[error("{op} called after the communication subsystem was finalized")]
    Finalized { op: &'static str },

    /// The handle was never issued by the backend, or was already freed.
    #[error("unknown datatype handle {0}")]
    UnknownHandle(Datatype),

    /// Commit requested twice for the same handle.
    #[error("datatype {0} is already committed")]
    AlreadyCommitted(Datatype),

    /// A derived handle was used as a base before being committed.
    #[error("datatype {0} is not committed")]
    NotCommitted(Datatype),

    /// `init_global` was called more than once.
    #[error("process-wide datatype registry is already initialized")]
    AlreadyInitialized,

    /// The process-wide registry was used before `init_global`.
    #[error("process-wide datatype registry is not initialized")]
    NotInitialized,

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenient alias for results using the crate [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
