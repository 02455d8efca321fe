//! The bump arena and its LIFO scopes.
//!
//! [`Arena`] serves every request by bumping an offset in its current chunk.
//! Nothing is freed individually; memory comes back in bulk when a scope
//! closes or the arena is reset or dropped.
//!
//! Allocation takes `&self` and hands out references tied to that borrow.
//! Closing a scope or resetting takes `&mut self`, so the borrow checker
//! guarantees no allocation is still reachable when its memory is reclaimed.
//! Scope *order* is checked at run time for the handle API
//! ([`Arena::scope_begin`] / [`Arena::scope_end`]) and enforced statically for
//! the guard API ([`Arena::scope`]).

use std::fmt;
use std::mem::{self, MaybeUninit};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;
use weft_core::{raise, SourceLocation};

use crate::chunk::{ArenaPos, ChunkList};
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::raw;

/// Counter for unique [`ArenaId`] allocation.
static ARENA_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for an [`Arena`].
///
/// Used to reject scope handles returned to the wrong arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaId(u64);

impl ArenaId {
    fn next() -> Self {
        Self(ARENA_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A saved position returned by [`Arena::scope_begin`].
///
/// Deliberately neither `Copy` nor `Clone`: a scope can be closed once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an open scope must be closed with Arena::scope_end"]
pub struct ScopeHandle {
    arena: ArenaId,
    depth: usize,
    serial: u64,
    pos: ArenaPos,
}

impl ScopeHandle {
    /// Nesting depth of this scope (0 for the outermost).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Position the arena returns to when the scope closes.
    pub fn pos(&self) -> ArenaPos {
        self.pos
    }
}

/// An entry on the open-scope stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenScope {
    /// Never reused within one arena, so a handle whose scope was discarded
    /// cannot match a later scope at the same depth.
    serial: u64,
    pos: ArenaPos,
}

/// Growable bump allocator.
///
/// # Example
///
/// ```
/// use weft_arena::Arena;
///
/// let mut arena = Arena::default();
/// let before = arena.pos();
/// {
///     let mut scope = arena.scope();
///     let xs = scope.alloc_slice_copy(&[1u32, 2, 3]);
///     xs[0] = 10;
///     assert_eq!(xs, &[10, 2, 3]);
/// }
/// assert_eq!(arena.pos(), before);
/// ```
pub struct Arena {
    id: ArenaId,
    config: ArenaConfig,
    chunks: ChunkList,
    /// Open scopes, innermost last.
    scopes: SmallVec<[OpenScope; 8]>,
    next_serial: u64,
}

impl Arena {
    /// Create an arena.
    ///
    /// Raises a fatal diagnostic if `config` fails validation; see
    /// [`try_new`](Self::try_new) for the checked form. No memory is reserved
    /// until the first allocation.
    #[track_caller]
    pub fn new(config: ArenaConfig) -> Self {
        match Self::try_new(config) {
            Ok(arena) => arena,
            Err(err) => raise(&err, SourceLocation::caller("Arena::new")),
        }
    }

    /// Create an arena, returning `Err` if `config` fails validation.
    pub fn try_new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let chunks = ChunkList::new(
            config.chunk_size,
            config.default_align,
            config.max_reserved_bytes,
        );
        Ok(Self {
            id: ArenaId::next(),
            config,
            chunks,
            scopes: SmallVec::new(),
            next_serial: 0,
        })
    }

    /// Reserve `size` bytes aligned to `align`.
    ///
    /// The memory is uninitialised and stays valid until the enclosing scope
    /// closes or the arena is reset or dropped. Raises a fatal diagnostic on
    /// an invalid alignment or when the arena cannot grow.
    #[track_caller]
    pub fn push(&self, size: usize, align: usize) -> NonNull<u8> {
        match self.try_push(size, align) {
            Ok(ptr) => ptr,
            Err(err) => raise(&err, SourceLocation::caller("Arena::push")),
        }
    }

    /// Checked form of [`push`](Self::push).
    pub fn try_push(&self, size: usize, align: usize) -> Result<NonNull<u8>, ArenaError> {
        if !align.is_power_of_two() || align > ArenaConfig::MAX_ALIGN {
            return Err(ArenaError::InvalidAlignment { align });
        }
        self.chunks.alloc(size, align)
    }

    /// Reserve `size` bytes at the configured default alignment.
    #[track_caller]
    pub fn push_bytes(&self, size: usize) -> NonNull<u8> {
        self.push(size, self.config.default_align)
    }

    /// Reserve uninitialised space for one `T`.
    #[track_caller]
    #[allow(clippy::mut_from_ref)]
    pub fn push_type<T>(&self) -> &mut MaybeUninit<T> {
        match self.try_push_type() {
            Ok(slot) => slot,
            Err(err) => raise(&err, SourceLocation::caller("Arena::push_type")),
        }
    }

    /// Checked form of [`push_type`](Self::push_type).
    #[allow(clippy::mut_from_ref, unsafe_code)]
    pub fn try_push_type<T>(&self) -> Result<&mut MaybeUninit<T>, ArenaError> {
        let ptr = self.try_push(mem::size_of::<T>(), mem::align_of::<T>())?;
        // SAFETY: the chunk list just reserved size_of::<T>() bytes aligned
        // for T; no other reference covers them, and they stay allocated
        // until `&mut self` is taken (rewind, reset, drop), which this borrow
        // of `&self` prevents.
        Ok(unsafe { raw::uninit(ptr) })
    }

    /// Reserve uninitialised space for `count` contiguous `T`s.
    #[track_caller]
    #[allow(clippy::mut_from_ref)]
    pub fn push_array<T>(&self, count: usize) -> &mut [MaybeUninit<T>] {
        match self.try_push_array(count) {
            Ok(slots) => slots,
            Err(err) => raise(&err, SourceLocation::caller("Arena::push_array")),
        }
    }

    /// Checked form of [`push_array`](Self::push_array).
    #[allow(clippy::mut_from_ref, unsafe_code)]
    pub fn try_push_array<T>(&self, count: usize) -> Result<&mut [MaybeUninit<T>], ArenaError> {
        let size = mem::size_of::<T>()
            .checked_mul(count)
            .ok_or_else(|| ArenaError::CapacityExceeded {
                requested: usize::MAX,
                reserved: self.reserved_bytes(),
                limit: self.config.max_reserved_bytes,
            })?;
        let ptr = self.try_push(size, mem::align_of::<T>())?;
        // SAFETY: as in `try_push_type`, for `count` elements.
        Ok(unsafe { raw::uninit_slice(ptr, count) })
    }

    /// Move `value` into the arena.
    ///
    /// The value's destructor never runs.
    #[track_caller]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T>(&self, value: T) -> &mut T {
        self.push_type::<T>().write(value)
    }

    /// Copy `src` into the arena.
    #[track_caller]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> &mut [T] {
        raw::copy_init(self.push_array::<T>(src.len()), src)
    }

    /// Collect `iter` into a slice in the arena.
    ///
    /// The slice length is taken from the iterator's reported length; an
    /// iterator that yields fewer items panics.
    #[track_caller]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_fill_iter<T, I>(&self, iter: I) -> &mut [T]
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let iter = iter.into_iter();
        raw::fill_init(self.push_array::<T>(iter.len()), iter)
    }

    /// Copy `src` into the arena.
    #[track_caller]
    #[allow(clippy::mut_from_ref, unsafe_code)]
    pub fn alloc_str(&self, src: &str) -> &mut str {
        let bytes = self.alloc_slice_copy(src.as_bytes());
        // SAFETY: the bytes were copied verbatim from a `&str`.
        unsafe { raw::str_from_copied(bytes) }
    }

    /// Open a scope: everything allocated until the matching
    /// [`scope_end`](Self::scope_end) is released together.
    pub fn scope_begin(&mut self) -> ScopeHandle {
        let pos = self.chunks.pos();
        let serial = self.next_serial;
        self.next_serial += 1;
        let handle = ScopeHandle {
            arena: self.id,
            depth: self.scopes.len(),
            serial,
            pos,
        };
        self.scopes.push(OpenScope { serial, pos });
        handle
    }

    /// Close the scope opened by `handle`, restoring the arena position.
    ///
    /// Memory is not zeroed. Raises a fatal diagnostic if `handle` belongs to
    /// another arena, its scope was already discarded by [`reset`](Self::reset)
    /// or an enclosing guard, or a more recently opened scope is still open.
    #[track_caller]
    pub fn scope_end(&mut self, handle: ScopeHandle) {
        if let Err(err) = self.try_scope_end(handle) {
            raise(&err, SourceLocation::caller("Arena::scope_end"));
        }
    }

    /// Checked form of [`scope_end`](Self::scope_end).
    ///
    /// On error the arena is left unchanged.
    pub fn try_scope_end(&mut self, handle: ScopeHandle) -> Result<(), ArenaError> {
        if handle.arena != self.id {
            return Err(ArenaError::ForeignScope {
                issued_by: handle.arena,
                returned_to: self.id,
            });
        }
        if !self.is_open(&handle) {
            return Err(ArenaError::StaleScope {
                depth: handle.depth,
            });
        }
        if handle.depth + 1 != self.scopes.len() {
            return Err(ArenaError::ScopeOutOfOrder {
                depth: handle.depth,
                open: self.scopes.len(),
            });
        }
        self.scopes.pop();
        self.chunks.rewind(handle.pos);
        Ok(())
    }

    /// Close `handle` and every scope opened inside it.
    ///
    /// Used by the guards, which must release on every exit path.
    pub(crate) fn unwind_to(&mut self, handle: ScopeHandle) {
        debug_assert_eq!(handle.arena, self.id);
        if !self.is_open(&handle) {
            // Already discarded by `reset`.
            return;
        }
        let leaked = self.scopes.len().saturating_sub(handle.depth + 1);
        if leaked > 0 {
            tracing::warn!(
                arena = %self.id,
                depth = handle.depth,
                leaked,
                "closing guard scope with inner scopes still open"
            );
        }
        self.scopes.truncate(handle.depth);
        self.chunks.rewind(handle.pos);
    }

    fn is_open(&self, handle: &ScopeHandle) -> bool {
        self.scopes
            .get(handle.depth)
            .is_some_and(|open| open.serial == handle.serial)
    }

    /// Open a scope that closes when the returned guard drops.
    ///
    /// The guard derefs to the arena; nested scopes are opened on the guard,
    /// which keeps them in LIFO order.
    pub fn scope(&mut self) -> ArenaScope<'_> {
        let handle = self.scope_begin();
        ArenaScope {
            arena: self,
            handle: Some(handle),
        }
    }

    /// Rewind to the start, keeping every chunk for reuse.
    ///
    /// Any scope still open is discarded; its handle is rejected with
    /// [`ArenaError::StaleScope`].
    pub fn reset(&mut self) {
        self.scopes.clear();
        self.chunks.rewind(ArenaPos::START);
    }

    /// Current allocation position.
    pub fn pos(&self) -> ArenaPos {
        self.chunks.pos()
    }

    /// Bytes handed out since the last reset, including alignment padding.
    pub fn used_bytes(&self) -> usize {
        self.chunks.used_bytes()
    }

    /// Bytes reserved from the global allocator.
    pub fn reserved_bytes(&self) -> usize {
        self.chunks.reserved_bytes()
    }

    /// Number of chunks linked so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks.chunk_count()
    }

    /// Number of open scopes.
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// This arena's identifier.
    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("id", &self.id)
            .field("pos", &self.pos())
            .field("chunks", &self.chunk_count())
            .field("reserved_bytes", &self.reserved_bytes())
            .field("scope_depth", &self.scope_depth())
            .finish()
    }
}

/// Guard returned by [`Arena::scope`]; restores the arena on drop.
#[must_use = "the scope closes as soon as the guard is dropped"]
pub struct ArenaScope<'a> {
    arena: &'a mut Arena,
    handle: Option<ScopeHandle>,
}

impl Deref for ArenaScope<'_> {
    type Target = Arena;

    fn deref(&self) -> &Arena {
        &*self.arena
    }
}

impl DerefMut for ArenaScope<'_> {
    fn deref_mut(&mut self) -> &mut Arena {
        &mut *self.arena
    }
}

impl Drop for ArenaScope<'_> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.arena.unwind_to(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_arena() -> Arena {
        Arena::new(ArenaConfig::new().with_chunk_size(256))
    }

    #[test]
    fn push_respects_requested_alignment() {
        let arena = small_arena();
        for align in [1, 2, 4, 8, 16, 32, 64] {
            let ptr = arena.push(3, align);
            assert_eq!(ptr.as_ptr().addr() % align, 0, "align {align}");
        }
    }

    #[test]
    fn push_type_after_odd_pushes_is_aligned() {
        let arena = Arena::new(ArenaConfig::new().with_default_align(8));
        let a = arena.push(3, 1);
        let b = arena.push(3, 1);
        let c = arena.push_type::<u64>();
        assert_ne!(a, b);
        assert_eq!((c as *mut MaybeUninit<u64>).addr() % 8, 0);
    }

    #[test]
    fn push_bytes_uses_default_alignment() {
        let arena = Arena::new(ArenaConfig::new().with_default_align(16));
        arena.push(1, 1);
        let ptr = arena.push_bytes(4);
        assert_eq!(ptr.as_ptr().addr() % 16, 0);
    }

    #[test]
    fn alloc_values_are_readable() {
        let arena = small_arena();
        let x = arena.alloc(41u32);
        let y = arena.alloc([1u8; 5]);
        *x += 1;
        assert_eq!(*x, 42);
        assert_eq!(*y, [1; 5]);
    }

    #[test]
    fn push_array_has_requested_length() {
        let arena = small_arena();
        let slots = arena.push_array::<u32>(10);
        assert_eq!(slots.len(), 10);
        assert_eq!(slots.as_ptr().addr() % mem::align_of::<u32>(), 0);
    }

    #[test]
    fn alloc_str_round_trips() {
        let arena = small_arena();
        let s = arena.alloc_str("héllo");
        assert_eq!(s, "héllo");
    }

    #[test]
    fn alloc_slice_fill_iter_collects() {
        let arena = small_arena();
        let squares = arena.alloc_slice_fill_iter((1..5usize).map(|n| n * n));
        assert_eq!(squares, &[1, 4, 9, 16]);
        let empty: &mut [u64] = arena.alloc_slice_fill_iter(std::iter::empty::<u64>());
        assert!(empty.is_empty());
    }

    #[test]
    fn invalid_alignment_is_an_error() {
        let arena = small_arena();
        assert_eq!(
            arena.try_push(8, 3),
            Err(ArenaError::InvalidAlignment { align: 3 })
        );
        assert_eq!(
            arena.try_push(8, 0),
            Err(ArenaError::InvalidAlignment { align: 0 })
        );
    }

    #[test]
    #[should_panic(expected = "contract violation: invalid alignment 24")]
    fn invalid_alignment_is_fatal() {
        let arena = small_arena();
        arena.push(8, 24);
    }

    #[test]
    #[should_panic(expected = "resource exhausted: arena capacity exceeded")]
    fn exhaustion_is_fatal() {
        let arena = Arena::new(
            ArenaConfig::new()
                .with_chunk_size(128)
                .with_max_reserved_bytes(128),
        );
        arena.push(100, 1);
        arena.push(100, 1);
    }

    #[test]
    fn array_size_overflow_is_capacity_exceeded() {
        let arena = small_arena();
        let result = arena.try_push_array::<u64>(usize::MAX);
        assert!(matches!(result, Err(ArenaError::CapacityExceeded { .. })));
    }

    #[test]
    fn scope_end_restores_position() {
        let mut arena = small_arena();
        arena.push(10, 1);
        let before = arena.pos();
        let h = arena.scope_begin();
        arena.push(100, 8);
        arena.push(500, 8);
        arena.scope_end(h);
        assert_eq!(arena.pos(), before);
        assert_eq!(arena.scope_depth(), 0);
    }

    #[test]
    fn nested_scopes_close_lifo() {
        let mut arena = small_arena();
        let outer = arena.scope_begin();
        arena.push(8, 8);
        let mid = arena.pos();
        let inner = arena.scope_begin();
        arena.push(8, 8);
        arena.scope_end(inner);
        assert_eq!(arena.pos(), mid);
        arena.scope_end(outer);
        assert_eq!(arena.pos(), ArenaPos::START);
    }

    #[test]
    fn out_of_order_close_is_rejected_without_change() {
        let mut arena = small_arena();
        let outer = arena.scope_begin();
        let _inner = arena.scope_begin();
        arena.push(8, 8);
        let pos = arena.pos();
        let err = arena.try_scope_end(outer).unwrap_err();
        assert_eq!(err, ArenaError::ScopeOutOfOrder { depth: 0, open: 2 });
        assert_eq!(arena.pos(), pos);
        assert_eq!(arena.scope_depth(), 2);
    }

    #[test]
    #[should_panic(expected = "scope closed out of order")]
    fn out_of_order_close_is_fatal() {
        let mut arena = small_arena();
        let outer = arena.scope_begin();
        let _inner = arena.scope_begin();
        arena.scope_end(outer);
    }

    #[test]
    fn foreign_handle_is_rejected() {
        let mut a = small_arena();
        let mut b = small_arena();
        let h = a.scope_begin();
        let _hb = b.scope_begin();
        assert!(matches!(
            b.try_scope_end(h),
            Err(ArenaError::ForeignScope { .. })
        ));
    }

    #[test]
    fn handle_from_before_reset_is_stale() {
        let mut arena = small_arena();
        arena.push(100, 1);
        let stale = arena.scope_begin();
        arena.reset();
        let fresh = arena.scope_begin();
        let pos = arena.pos();
        assert_eq!(
            arena.try_scope_end(stale),
            Err(ArenaError::StaleScope { depth: 0 })
        );
        assert_eq!(arena.pos(), pos);
        assert_eq!(arena.pos(), ArenaPos::START);
        assert_eq!(arena.scope_depth(), 1);
        arena.scope_end(fresh);
        assert_eq!(arena.scope_depth(), 0);
    }

    #[test]
    #[should_panic(expected = "Arena::scope_end")]
    fn stale_handle_is_fatal() {
        let mut arena = small_arena();
        let stale = arena.scope_begin();
        arena.reset();
        let _fresh = arena.scope_begin();
        arena.scope_end(stale);
    }

    #[test]
    fn handle_discarded_by_guard_is_stale() {
        let mut arena = small_arena();
        let leaked = {
            let mut scope = arena.scope();
            let inner = scope.scope_begin();
            scope.push(32, 8);
            inner
        };
        let _outer = arena.scope_begin();
        let _reopened = arena.scope_begin();
        assert_eq!(
            arena.try_scope_end(leaked),
            Err(ArenaError::StaleScope { depth: 1 })
        );
        assert_eq!(arena.scope_depth(), 2);
    }

    #[test]
    fn guard_restores_on_drop() {
        let mut arena = small_arena();
        let before = arena.pos();
        {
            let mut scope = arena.scope();
            scope.push(64, 8);
            {
                let inner = scope.scope();
                inner.push(64, 8);
                assert_eq!(inner.scope_depth(), 2);
            }
            assert_eq!(scope.scope_depth(), 1);
        }
        assert_eq!(arena.pos(), before);
        assert_eq!(arena.scope_depth(), 0);
    }

    #[test]
    fn guard_closes_leaked_inner_handles() {
        let mut arena = small_arena();
        {
            let mut scope = arena.scope();
            let leaked = scope.scope_begin();
            scope.push(32, 8);
            std::mem::forget(leaked);
        }
        assert_eq!(arena.scope_depth(), 0);
        assert_eq!(arena.pos(), ArenaPos::START);
    }

    #[test]
    fn guard_restores_during_unwind() {
        let mut arena = small_arena();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let scope = arena.scope();
            scope.push(64, 8);
            panic!("early exit");
        }));
        assert!(result.is_err());
        assert_eq!(arena.pos(), ArenaPos::START);
        assert_eq!(arena.scope_depth(), 0);
    }

    #[test]
    fn reset_keeps_chunks() {
        let mut arena = small_arena();
        arena.push(200, 8);
        arena.push(200, 8);
        let chunks = arena.chunk_count();
        arena.reset();
        assert_eq!(arena.used_bytes(), 0);
        assert_eq!(arena.chunk_count(), chunks);
        arena.push(200, 8);
        arena.push(200, 8);
        assert_eq!(arena.chunk_count(), chunks);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = ArenaConfig::new().with_default_align(3);
        assert!(matches!(
            Arena::try_new(config),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(Arena::default().id(), Arena::default().id());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn pushes_are_aligned_and_disjoint(
                reqs in proptest::collection::vec((0usize..300, 0u32..7), 1..64),
            ) {
                let arena = Arena::new(ArenaConfig::new().with_chunk_size(512));
                let mut spans: Vec<(usize, usize)> = Vec::new();
                for &(size, shift) in &reqs {
                    let align = 1usize << shift;
                    let addr = arena.push(size, align).as_ptr().addr();
                    prop_assert_eq!(addr % align, 0);
                    for &(start, len) in &spans {
                        let disjoint = addr + size <= start || start + len <= addr;
                        prop_assert!(size == 0 || len == 0 || disjoint);
                    }
                    spans.push((addr, size));
                }
            }

            #[test]
            fn scope_end_is_idempotent_on_position(
                before in proptest::collection::vec(1usize..200, 0..8),
                inside in proptest::collection::vec(1usize..400, 0..16),
            ) {
                let mut arena = Arena::new(ArenaConfig::new().with_chunk_size(256));
                for &size in &before {
                    arena.push_bytes(size);
                }
                let pos = arena.pos();
                let h = arena.scope_begin();
                for &size in &inside {
                    arena.push_bytes(size);
                }
                arena.scope_end(h);
                prop_assert_eq!(arena.pos(), pos);
            }

            #[test]
            fn position_is_monotonic_between_restores(
                sizes in proptest::collection::vec(0usize..300, 1..32),
            ) {
                let arena = Arena::new(ArenaConfig::new().with_chunk_size(256));
                let mut last = arena.pos();
                for &size in &sizes {
                    arena.push_bytes(size);
                    let now = arena.pos();
                    prop_assert!(now >= last);
                    last = now;
                }
            }
        }
    }
}
