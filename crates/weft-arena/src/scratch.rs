//! Pooled scratch arenas for temporary allocations.
//!
//! A [`ScratchPool`] owns a small fixed set of arenas. [`ScratchPool::begin`]
//! hands out the first arena nobody else holds, wrapped in a [`Scratch`]
//! guard that rewinds it and gives it back when dropped, whether the holder
//! returns normally, returns early or unwinds. The backing chunks are reused
//! across acquisitions to avoid repeated heap allocation.
//!
//! An arena a caller is currently holding (for example the one it will write
//! its result into) is never handed out again until released, so nested
//! computations always get a distinct arena.
//!
//! Pools are not shared between threads; [`with_thread_scratch`] uses one pool
//! per thread.

use std::cell::{RefCell, RefMut};
use std::ops::{Deref, DerefMut};

use weft_core::{raise, SourceLocation};

use crate::arena::{Arena, ScopeHandle};
use crate::config::ArenaConfig;
use crate::error::ArenaError;

thread_local! {
    static THREAD_POOL: ScratchPool = ScratchPool::new(ArenaConfig::default());
}

/// A fixed set of arenas handed out for temporary work.
pub struct ScratchPool {
    arenas: Box<[RefCell<Arena>]>,
}

impl ScratchPool {
    /// Create a pool of `config.scratch_pool_size` arenas.
    ///
    /// Raises a fatal diagnostic if `config` fails validation. The arenas
    /// reserve no memory until first used.
    #[track_caller]
    pub fn new(config: ArenaConfig) -> Self {
        match Self::try_new(config) {
            Ok(pool) => pool,
            Err(err) => raise(&err, SourceLocation::caller("ScratchPool::new")),
        }
    }

    /// Create a pool, returning `Err` if `config` fails validation.
    pub fn try_new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let arenas = (0..config.scratch_pool_size)
            .map(|_| Arena::try_new(config.clone()).map(RefCell::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            arenas: arenas.into_boxed_slice(),
        })
    }

    /// Acquire a free arena.
    ///
    /// Raises a fatal diagnostic when every arena in the pool is held.
    #[track_caller]
    pub fn begin(&self) -> Scratch<'_> {
        match self.try_begin() {
            Ok(scratch) => scratch,
            Err(err) => raise(&err, SourceLocation::caller("ScratchPool::begin")),
        }
    }

    /// Checked form of [`begin`](Self::begin).
    pub fn try_begin(&self) -> Result<Scratch<'_>, ArenaError> {
        for (slot, cell) in self.arenas.iter().enumerate() {
            let Ok(mut arena) = cell.try_borrow_mut() else {
                continue;
            };
            let handle = arena.scope_begin();
            tracing::trace!(slot, arena = %arena.id(), "scratch acquired");
            return Ok(Scratch {
                arena,
                handle: Some(handle),
                slot,
            });
        }
        Err(ArenaError::ScratchExhausted {
            pool_size: self.arenas.len(),
        })
    }

    /// Number of arenas in the pool.
    pub fn capacity(&self) -> usize {
        self.arenas.len()
    }

    /// Number of arenas currently held.
    pub fn in_use(&self) -> usize {
        self.arenas
            .iter()
            .filter(|cell| cell.try_borrow().is_err())
            .count()
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}

/// Exclusive use of one pooled arena; released on drop.
///
/// Derefs to [`Arena`]. Everything allocated through the guard is reclaimed
/// when it drops, and the borrow checker keeps those allocations from
/// outliving it.
#[must_use = "the scratch arena is released as soon as the guard is dropped"]
pub struct Scratch<'p> {
    arena: RefMut<'p, Arena>,
    handle: Option<ScopeHandle>,
    slot: usize,
}

impl Scratch<'_> {
    /// Index of the pooled arena this guard holds.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl Deref for Scratch<'_> {
    type Target = Arena;

    fn deref(&self) -> &Arena {
        &self.arena
    }
}

impl DerefMut for Scratch<'_> {
    fn deref_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }
}

impl Drop for Scratch<'_> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.arena.unwind_to(handle);
        }
        tracing::trace!(slot = self.slot, "scratch released");
    }
}

/// Run `f` with a scratch arena from this thread's pool.
///
/// Nested calls get distinct arenas until the pool
/// ([`ArenaConfig::DEFAULT_SCRATCH_POOL_SIZE`] arenas) runs out, which is
/// fatal.
#[track_caller]
pub fn with_thread_scratch<R>(f: impl FnOnce(&mut Scratch<'_>) -> R) -> R {
    let location = SourceLocation::caller("with_thread_scratch");
    THREAD_POOL.with(|pool| {
        let mut scratch = match pool.try_begin() {
            Ok(scratch) => scratch,
            Err(err) => raise(&err, location),
        };
        f(&mut scratch)
    })
}
