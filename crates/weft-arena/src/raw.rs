//! Low-level primitives for arena memory operations.
//!
//! Owns heap chunks obtained from the global allocator and the casts that
//! turn freshly bumped addresses into typed, uninitialised views. Apart from
//! the call sites in `arena.rs`, no other module uses `unsafe`.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::mem::MaybeUninit;
use std::ptr::NonNull;

/// A heap block obtained from the global allocator, freed on drop.
///
/// The block never moves, so addresses handed out from it stay valid until
/// the `RawChunk` is dropped.
pub(crate) struct RawChunk {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl RawChunk {
    /// Allocate `size` bytes aligned to `align`.
    ///
    /// Returns `None` for a zero size, an invalid layout, or allocator failure.
    pub(crate) fn allocate(size: usize, align: usize) -> Option<Self> {
        if size == 0 {
            return None;
        }
        let layout = Layout::from_size_align(size, align).ok()?;
        // SAFETY: layout has a non-zero size (checked above).
        let ptr = unsafe { alloc::alloc(layout) };
        NonNull::new(ptr).map(|ptr| Self { ptr, layout })
    }

    /// Address of the first byte.
    pub(crate) fn base_addr(&self) -> usize {
        self.ptr.as_ptr().addr()
    }

    /// Size of the block in bytes.
    pub(crate) fn len(&self) -> usize {
        self.layout.size()
    }

    /// Pointer `offset` bytes into the block.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is past the end of the block.
    pub(crate) fn at(&self, offset: usize) -> NonNull<u8> {
        assert!(offset <= self.layout.size(), "chunk offset out of bounds");
        // SAFETY: offset is within the allocation (or one past its end), and
        // the base pointer is non-null, so the result is non-null and in bounds.
        unsafe { self.ptr.add(offset) }
    }
}

impl Drop for RawChunk {
    fn drop(&mut self) {
        // SAFETY: ptr was returned by `alloc::alloc` with exactly this layout
        // and is deallocated only here.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

/// Round `addr` up to the next multiple of `align` (a power of two).
pub(crate) fn align_up(addr: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    let mask = align - 1;
    addr.checked_add(mask).map(|v| v & !mask)
}

/// View a fresh arena address as an uninitialised `T`.
///
/// # Safety
///
/// `ptr` must be aligned for `T`, valid for `size_of::<T>()` bytes, not
/// aliased by any other live reference, and stay allocated for `'a`.
pub(crate) unsafe fn uninit<'a, T>(ptr: NonNull<u8>) -> &'a mut MaybeUninit<T> {
    // SAFETY: forwarded to the caller; MaybeUninit<T> has no validity
    // requirement on its contents.
    unsafe { ptr.cast::<MaybeUninit<T>>().as_mut() }
}

/// View a fresh arena address as `len` uninitialised `T`s.
///
/// # Safety
///
/// As [`uninit`], for `len * size_of::<T>()` bytes.
pub(crate) unsafe fn uninit_slice<'a, T>(ptr: NonNull<u8>, len: usize) -> &'a mut [MaybeUninit<T>] {
    // SAFETY: forwarded to the caller.
    unsafe { std::slice::from_raw_parts_mut(ptr.cast::<MaybeUninit<T>>().as_ptr(), len) }
}

/// Copy `src` into uninitialised `dst` and return the initialised slice.
///
/// # Panics
///
/// Panics if the lengths differ.
pub(crate) fn copy_init<'a, T: Copy>(dst: &'a mut [MaybeUninit<T>], src: &[T]) -> &'a mut [T] {
    assert_eq!(dst.len(), src.len(), "copy_init length mismatch");
    fill_init(dst, src.iter().copied())
}

/// Move items from `src` into uninitialised `dst` until `dst` is full.
///
/// # Panics
///
/// Panics if `src` runs out first.
pub(crate) fn fill_init<'a, T>(
    dst: &'a mut [MaybeUninit<T>],
    src: impl Iterator<Item = T>,
) -> &'a mut [T] {
    let mut written = 0;
    for (slot, value) in dst.iter_mut().zip(src) {
        slot.write(value);
        written += 1;
    }
    assert_eq!(written, dst.len(), "fill_init source ran short");
    // SAFETY: every element was written above, and MaybeUninit<T> has the
    // same layout as T.
    unsafe { &mut *(dst as *mut [MaybeUninit<T>] as *mut [T]) }
}

/// Reinterpret bytes copied from a `&str` as a `&mut str`.
///
/// # Safety
///
/// `bytes` must be valid UTF-8.
pub(crate) unsafe fn str_from_copied(bytes: &mut [u8]) -> &mut str {
    // SAFETY: forwarded to the caller.
    unsafe { std::str::from_utf8_unchecked_mut(bytes) }
}
