// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concurrent cache of derived datatypes, keyed by Rust type.
//!
//! Registering a datatype with the communication library is expensive and must
//! happen at most once per type. The cache serves hits under a shared read lock
//! and serializes the miss path (construct, commit, insert) under the write
//! lock, re-checking the key once the write lock is held, so two threads racing
//! on the same unseen type still commit a single datatype.
//!
//! Entries are never evicted individually. [`DatatypeCache::clear`] frees all of
//! them at once, unless the communication subsystem is already finalized, in
//! which case the handles are left alone: freeing them at that point is not
//! allowed by the library.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use super::datatype::{BuiltinKind, Datatype};
use super::key::TypeKey;
use crate::backend::CommBackend;
use crate::config::RegistryConfig;
use crate::error::Result;

/// Cache hit/miss statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct LookupStats {
    pub hits: u64,
    pub misses: u64,
    /// Datatypes committed through `get_or_create`.
    pub registrations: u64,
    /// Failed registrations (construct or commit rejected).
    pub failures: u64,
    pub last_miss_ns: u64,
}

/// Result of [`DatatypeCache::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Every entry was handed to `type_free` and the cache is now empty.
    Released { released: usize, failed: usize },
    /// The subsystem was finalized; nothing was freed or removed.
    SkippedFinalized { retained: usize },
}

/// Snapshot of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub type_name: &'static str,
    pub size_bytes: usize,
    pub datatype: Datatype,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    datatype: Datatype,
    size_bytes: usize,
    type_name: &'static str,
}

/// Process-wide store of derived datatypes.
pub struct DatatypeCache {
    backend: Arc<dyn CommBackend>,
    inner: RwLock<HashMap<TypeKey, Slot>>,
    stats: RwLock<LookupStats>,
    release_on_drop: bool,
}

impl DatatypeCache {
    #[must_use]
    pub fn new(backend: Arc<dyn CommBackend>) -> Self {
        Self::with_config(backend, &RegistryConfig::default())
    }

    #[must_use]
    pub fn with_config(backend: Arc<dyn CommBackend>, config: &RegistryConfig) -> Self {
        Self {
            backend,
            inner: RwLock::new(HashMap::with_capacity(config.initial_capacity)),
            stats: RwLock::new(LookupStats::default()),
            release_on_drop: config.release_on_drop,
        }
    }

    /// Look up the datatype cached for `key`. Never creates one.
    #[must_use]
    pub fn get(&self, key: &TypeKey) -> Option<Datatype> {
        self.inner.read().get(key).map(|slot| slot.datatype)
    }

    /// Insert or replace the datatype cached for `key`.
    ///
    /// Returns the replaced datatype. Each key is expected to be set once;
    /// a replacement is logged but not rejected, and the replaced handle is
    /// no longer owned by the cache.
    pub fn set(&self, key: TypeKey, datatype: Datatype, size_bytes: usize) -> Option<Datatype> {
        let previous = self.inner.write().insert(
            key,
            Slot {
                datatype,
                size_bytes,
                type_name: key.type_name(),
            },
        );
        let previous = previous.map(|slot| slot.datatype);
        if let Some(old) = previous {
            log::warn!(
                "[DatatypeCache] overwrote datatype {} with {} for {}",
                old,
                datatype,
                key
            );
        }
        previous
    }

    /// Return the cached datatype for `key`, registering a `size_bytes` opaque
    /// byte datatype on first use.
    ///
    /// Backend failures are returned unchanged; nothing is cached on failure.
    pub fn get_or_create(&self, key: TypeKey, size_bytes: usize) -> Result<Datatype> {
        if let Some(hit) = self.get(&key) {
            self.record_hit(&key);
            return Ok(hit);
        }

        let mut map = self.inner.write();
        if let Some(slot) = map.get(&key) {
            self.record_hit(&key);
            return Ok(slot.datatype);
        }

        let start = Instant::now();
        let datatype = match self.register(size_bytes) {
            Ok(datatype) => datatype,
            Err(err) => {
                self.record_failure();
                log::warn!(
                    "[DatatypeCache] registering {} ({} bytes) failed: {}",
                    key,
                    size_bytes,
                    err
                );
                return Err(err);
            }
        };

        map.insert(
            key,
            Slot {
                datatype,
                size_bytes,
                type_name: key.type_name(),
            },
        );
        self.record_miss(start);
        log::info!(
            "[DatatypeCache] registered {} for {} ({} bytes)",
            datatype,
            key,
            size_bytes
        );
        Ok(datatype)
    }

    /// Free every cached datatype and empty the cache.
    ///
    /// If the communication subsystem is finalized, nothing is freed and the
    /// entries stay in place. Individual free failures are logged and counted
    /// but do not stop the sweep.
    pub fn clear(&self) -> ClearOutcome {
        let mut map = self.inner.write();

        if self.backend.is_finalized() {
            log::debug!(
                "[DatatypeCache] subsystem finalized, leaving {} datatype(s) unreleased",
                map.len()
            );
            return ClearOutcome::SkippedFinalized {
                retained: map.len(),
            };
        }

        let mut released = 0;
        let mut failed = 0;
        for (key, slot) in map.drain() {
            let mut datatype = slot.datatype;
            match self.backend.type_free(&mut datatype) {
                Ok(()) => released += 1,
                Err(err) => {
                    failed += 1;
                    log::warn!(
                        "[DatatypeCache] freeing {} for {} failed: {}",
                        slot.datatype,
                        key,
                        err
                    );
                }
            }
        }

        if released + failed > 0 {
            log::info!(
                "[DatatypeCache] released {} datatype(s), {} failure(s)",
                released,
                failed
            );
        }
        ClearOutcome::Released { released, failed }
    }

    #[must_use]
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.inner.read().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Snapshot of all entries, sorted by type name.
    #[must_use]
    pub fn entries(&self) -> Vec<CacheEntry> {
        let mut entries: Vec<CacheEntry> = self
            .inner
            .read()
            .values()
            .map(|slot| CacheEntry {
                type_name: slot.type_name,
                size_bytes: slot.size_bytes,
                datatype: slot.datatype,
            })
            .collect();
        entries.sort_by(|a, b| a.type_name.cmp(b.type_name));
        entries
    }

    #[must_use]
    pub fn stats(&self) -> LookupStats {
        *self.stats.read()
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn CommBackend> {
        &self.backend
    }

    /// Construct and commit a contiguous byte datatype. A constructed handle
    /// whose commit fails is freed before the commit error is returned.
    fn register(&self, size_bytes: usize) -> Result<Datatype> {
        let byte = self.backend.builtin(BuiltinKind::Byte);
        let mut datatype = self.backend.type_contiguous(size_bytes, byte)?;

        if let Err(err) = self.backend.type_commit(datatype) {
            let uncommitted = datatype;
            if let Err(free_err) = self.backend.type_free(&mut datatype) {
                log::warn!(
                    "[DatatypeCache] could not free uncommitted datatype {}: {}",
                    uncommitted,
                    free_err
                );
            }
            return Err(err);
        }

        Ok(datatype)
    }

    #[cfg_attr(not(feature = "trace-hits"), allow(unused_variables))]
    fn record_hit(&self, key: &TypeKey) {
        #[cfg(feature = "trace-hits")]
        log::trace!("[DatatypeCache] hit for {}", key);
        let mut stats = self.stats.write();
        stats.hits = stats.hits.saturating_add(1);
    }

    fn record_miss(&self, start: Instant) {
        let mut stats = self.stats.write();
        stats.misses = stats.misses.saturating_add(1);
        stats.registrations = stats.registrations.saturating_add(1);
        stats.last_miss_ns = start.elapsed().as_nanos() as u64;
    }

    fn record_failure(&self) {
        let mut stats = self.stats.write();
        stats.misses = stats.misses.saturating_add(1);
        stats.failures = stats.failures.saturating_add(1);
    }
}

impl std::fmt::Debug for DatatypeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatatypeCache")
            .field("entries", &self.len())
            .field("release_on_drop", &self.release_on_drop)
            .finish_non_exhaustive()
    }
}

impl Drop for DatatypeCache {
    fn drop(&mut self) {
        if self.release_on_drop {
            let _ = self.clear();
        }
    }
}
