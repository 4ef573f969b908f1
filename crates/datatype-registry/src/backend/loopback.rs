// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process communication backend.
//!
//! Hands out datatype handles from a counter and tracks which ones are alive,
//! so a single-process program can run without a real message-passing library
//! and tests can assert on exactly which handles were created, committed and
//! freed.
//!
//! # Handle layout
//!
//! ```text
//! 0                      NULL
//! 1 ..= 14               builtins (BuiltinKind::index() + 1)
//! 0x1000 ..              derived handles, never reused
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use super::CommBackend;
use crate::error::{Error, Result};
use crate::types::{BuiltinKind, Datatype};

/// First raw value used for derived handles.
const DERIVED_BASE: u64 = 0x1000;

/// Call counters for a [`LoopbackBackend`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopbackCounters {
    pub constructed: u64,
    pub committed: u64,
    /// Successful `type_free` calls.
    pub freed: u64,
    /// Every `type_free` call, including rejected ones.
    pub free_attempts: u64,
    /// `is_finalized` queries.
    pub finalized_queries: u64,
}

#[derive(Debug, Clone, Copy)]
struct HandleState {
    size_bytes: usize,
    committed: bool,
}

#[derive(Debug)]
struct LoopbackState {
    next_handle: u64,
    live: HashMap<Datatype, HandleState>,
    fail_next_construct: Option<i32>,
    fail_next_commit: Option<i32>,
    fail_next_free: Option<i32>,
}

/// In-process [`CommBackend`].
#[derive(Debug)]
pub struct LoopbackBackend {
    state: Mutex<LoopbackState>,
    finalized: AtomicBool,
    constructed: AtomicU64,
    committed: AtomicU64,
    freed: AtomicU64,
    free_attempts: AtomicU64,
    finalized_queries: AtomicU64,
}

impl Default for LoopbackBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LoopbackState {
                next_handle: DERIVED_BASE,
                live: HashMap::new(),
                fail_next_construct: None,
                fail_next_commit: None,
                fail_next_free: None,
            }),
            finalized: AtomicBool::new(false),
            constructed: AtomicU64::new(0),
            committed: AtomicU64::new(0),
            freed: AtomicU64::new(0),
            free_attempts: AtomicU64::new(0),
            finalized_queries: AtomicU64::new(0),
        }
    }

    /// Simulate global shutdown of the communication library.
    ///
    /// Live handles are left in place: after finalization they can no longer
    /// be freed, only leaked.
    pub fn finalize(&self) {
        if !self.finalized.swap(true, Ordering::SeqCst) {
            log::debug!(
                "[LoopbackBackend] finalized with {} live derived datatype(s)",
                self.live_count()
            );
        }
    }

    /// Make the next `type_contiguous` call fail with `code`.
    pub fn fail_next_construct(&self, code: i32) {
        self.state.lock().fail_next_construct = Some(code);
    }

    /// Make the next `type_commit` call fail with `code`.
    pub fn fail_next_commit(&self, code: i32) {
        self.state.lock().fail_next_commit = Some(code);
    }

    /// Make the next `type_free` call fail with `code`.
    pub fn fail_next_free(&self, code: i32) {
        self.state.lock().fail_next_free = Some(code);
    }

    #[must_use]
    pub fn counters(&self) -> LoopbackCounters {
        LoopbackCounters {
            constructed: self.constructed.load(Ordering::Acquire),
            committed: self.committed.load(Ordering::Acquire),
            freed: self.freed.load(Ordering::Acquire),
            free_attempts: self.free_attempts.load(Ordering::Acquire),
            finalized_queries: self.finalized_queries.load(Ordering::Acquire),
        }
    }

    /// Number of derived handles constructed and not yet freed.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.state.lock().live.len()
    }

    #[must_use]
    pub fn is_live(&self, datatype: Datatype) -> bool {
        self.state.lock().live.contains_key(&datatype)
    }

    #[must_use]
    pub fn is_committed(&self, datatype: Datatype) -> bool {
        self.state
            .lock()
            .live
            .get(&datatype)
            .is_some_and(|h| h.committed)
    }

    /// Extent in bytes of a builtin or live derived handle.
    #[must_use]
    pub fn size_of(&self, datatype: Datatype) -> Option<usize> {
        if let Some(kind) = Self::builtin_kind(datatype) {
            return Some(kind.size_bytes());
        }
        self.state.lock().live.get(&datatype).map(|h| h.size_bytes)
    }

    fn builtin_kind(datatype: Datatype) -> Option<BuiltinKind> {
        let raw = datatype.as_raw();
        if raw == 0 {
            return None;
        }
        let idx = usize::try_from(raw - 1).ok()?;
        BuiltinKind::ALL.get(idx).copied()
    }

    fn ensure_running(&self, op: &'static str) -> Result<()> {
        if self.finalized.load(Ordering::SeqCst) {
            Err(Error::Finalized { op })
        } else {
            Ok(())
        }
    }
}

impl CommBackend for LoopbackBackend {
    fn is_finalized(&self) -> bool {
        self.finalized_queries.fetch_add(1, Ordering::AcqRel);
        self.finalized.load(Ordering::SeqCst)
    }

    fn builtin(&self, kind: BuiltinKind) -> Datatype {
        Datatype::from_raw(kind.index() as u64 + 1)
    }

    fn type_contiguous(&self, count: usize, base: Datatype) -> Result<Datatype> {
        const OP: &str = "type_contiguous";
        self.ensure_running(OP)?;

        let mut state = self.state.lock();
        if let Some(code) = state.fail_next_construct.take() {
            return Err(Error::Backend { op: OP, code });
        }

        let base_size = match Self::builtin_kind(base) {
            Some(kind) => kind.size_bytes(),
            None => match state.live.get(&base) {
                Some(h) if h.committed => h.size_bytes,
                Some(_) => return Err(Error::NotCommitted(base)),
                None => return Err(Error::UnknownHandle(base)),
            },
        };

        let datatype = Datatype::from_raw(state.next_handle);
        state.next_handle += 1;
        state.live.insert(
            datatype,
            HandleState {
                size_bytes: count.saturating_mul(base_size),
                committed: false,
            },
        );
        self.constructed.fetch_add(1, Ordering::AcqRel);
        Ok(datatype)
    }

    fn type_commit(&self, datatype: Datatype) -> Result<()> {
        const OP: &str = "type_commit";
        self.ensure_running(OP)?;

        let mut state = self.state.lock();
        if let Some(code) = state.fail_next_commit.take() {
            return Err(Error::Backend { op: OP, code });
        }
        // Committing a predefined datatype is a no-op.
        if Self::builtin_kind(datatype).is_some() {
            return Ok(());
        }
        let handle = state
            .live
            .get_mut(&datatype)
            .ok_or(Error::UnknownHandle(datatype))?;
        if handle.committed {
            return Err(Error::AlreadyCommitted(datatype));
        }
        handle.committed = true;
        self.committed.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn type_free(&self, datatype: &mut Datatype) -> Result<()> {
        const OP: &str = "type_free";
        self.free_attempts.fetch_add(1, Ordering::AcqRel);
        self.ensure_running(OP)?;

        let mut state = self.state.lock();
        if let Some(code) = state.fail_next_free.take() {
            return Err(Error::Backend { op: OP, code });
        }
        if state.live.remove(datatype).is_none() {
            return Err(Error::UnknownHandle(*datatype));
        }
        *datatype = Datatype::NULL;
        self.freed.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
