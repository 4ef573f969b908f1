// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-to-datatype resolution and the process-wide registry.
//!
//! # Lifecycle
//!
//! ```text
//! init_global(backend, config)  -> GlobalGuard      (once, before first resolve)
//! resolve::<T>()                -> Datatype         (any thread, any time)
//! drop(GlobalGuard) / teardown_global()             (before the library finalizes)
//! ```
//!
//! Statics are never dropped, so releasing the process-wide cache is tied to
//! the [`GlobalGuard`] returned by [`init_global`]. Keep it alive for as long as
//! communication happens and drop it before shutting the library down. If the
//! library is already finalized when the guard drops, release is skipped.

use std::mem::size_of;
use std::sync::{Arc, OnceLock};

use crate::backend::CommBackend;
use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::types::{BuiltinKind, ClearOutcome, Datatype, DatatypeCache, TypeKey};
use crate::wire::WireType;

static GLOBAL: OnceLock<Resolver> = OnceLock::new();

/// Maps Rust types to communication datatypes.
#[derive(Debug)]
pub struct Resolver {
    cache: DatatypeCache,
}

impl Resolver {
    #[must_use]
    pub fn new(backend: Arc<dyn CommBackend>) -> Self {
        Self::with_config(backend, &RegistryConfig::default())
    }

    #[must_use]
    pub fn with_config(backend: Arc<dyn CommBackend>, config: &RegistryConfig) -> Self {
        Self {
            cache: DatatypeCache::with_config(backend, config),
        }
    }

    /// Datatype describing `T`.
    ///
    /// Elementary types return the predefined datatype without touching the
    /// cache. Other types get a contiguous byte datatype of `size_of::<T>()`,
    /// registered on the first call and reused afterwards.
    pub fn resolve<T: WireType>(&self) -> Result<Datatype> {
        match T::BUILTIN {
            Some(kind) => Ok(self.resolve_builtin(kind)),
            None => self.cache.get_or_create(TypeKey::of::<T>(), size_of::<T>()),
        }
    }

    #[must_use]
    pub fn resolve_builtin(&self, kind: BuiltinKind) -> Datatype {
        self.cache.backend().builtin(kind)
    }

    #[must_use]
    pub fn cache(&self) -> &DatatypeCache {
        &self.cache
    }
}

/// Keeps the process-wide registry alive; releases its datatypes on drop.
#[must_use = "dropping the guard releases every registered datatype"]
#[derive(Debug)]
pub struct GlobalGuard {
    _private: (),
}

impl Drop for GlobalGuard {
    fn drop(&mut self) {
        if let Some(resolver) = GLOBAL.get() {
            let outcome = resolver.cache().clear();
            log::debug!("[Registry] global teardown: {:?}", outcome);
        }
    }
}

/// Install the process-wide resolver.
///
/// Bind the returned guard to a named variable (`let _guard = ...`) and keep it
/// alive while communicating. `let _ = init_global(..)` drops the guard on the
/// spot: the cache is cleared immediately and types registered afterwards are
/// never released.
///
/// The logger level is left to the host application; see
/// [`RegistryConfig::apply_log_level`].
pub fn init_global(backend: Arc<dyn CommBackend>, config: RegistryConfig) -> Result<GlobalGuard> {
    if GLOBAL.get().is_some() {
        return Err(Error::AlreadyInitialized);
    }

    // The global cache lives in a static and is released through the guard.
    let resolver = Resolver::with_config(backend, &config.clone().with_release_on_drop(false));
    GLOBAL
        .set(resolver)
        .map_err(|_| Error::AlreadyInitialized)?;

    log::info!(
        "[Registry] process-wide datatype registry initialized (capacity {})",
        config.initial_capacity
    );
    Ok(GlobalGuard { _private: () })
}

/// The process-wide resolver.
pub fn global() -> Result<&'static Resolver> {
    GLOBAL.get().ok_or(Error::NotInitialized)
}

/// Resolve `T` through the process-wide resolver.
pub fn resolve<T: WireType>() -> Result<Datatype> {
    global()?.resolve::<T>()
}

/// Release every datatype held by the process-wide cache now.
///
/// The registry stays usable; types resolved afterwards are registered again.
pub fn teardown_global() -> Result<ClearOutcome> {
    Ok(global()?.cache().clear())
}
