//! Heap chunks and growable chunk lists.
//!
//! A [`Chunk`] is one contiguous heap block with a bump cursor. A
//! [`ChunkList`] links chunks together: when the current chunk is full the
//! allocation moves to a retained chunk that fits, or a new chunk is linked
//! in place of the retained chunks that were too small.
//! Chunks never move, so every address handed out stays valid until the chunk
//! list is dropped, whatever happens to the `Vec` that indexes them.

use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

use crate::error::ArenaError;
use crate::raw::{align_up, RawChunk};

/// A position in a chunk list: chunk index plus byte offset within it.
///
/// Positions order lexicographically, which matches allocation order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArenaPos {
    /// Index of the chunk.
    pub chunk: usize,
    /// Bump offset within that chunk.
    pub offset: usize,
}

impl ArenaPos {
    /// The position of an empty arena.
    pub const START: Self = Self {
        chunk: 0,
        offset: 0,
    };
}

/// A single heap block with bump allocation.
pub(crate) struct Chunk {
    raw: RawChunk,
    /// Next free byte offset.
    cursor: Cell<usize>,
}

impl Chunk {
    fn new(raw: RawChunk) -> Self {
        Self {
            raw,
            cursor: Cell::new(0),
        }
    }

    /// Bump-allocate `size` bytes at an address aligned to `align`.
    ///
    /// Returns `None` if the aligned request does not fit in the rest of
    /// this chunk.
    fn alloc(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let base = self.raw.base_addr();
        let start = align_up(base.checked_add(self.cursor.get())?, align)? - base;
        let end = start.checked_add(size)?;
        if end > self.raw.len() {
            return None;
        }
        self.cursor.set(end);
        Some(self.raw.at(start))
    }

    fn used(&self) -> usize {
        self.cursor.get()
    }

    fn capacity(&self) -> usize {
        self.raw.len()
    }
}

/// A growable list of [`Chunk`]s with overflow-based bump allocation.
///
/// The first chunk is allocated lazily on the first request. Allocations that
/// do not fit in the current chunk are placed entirely in the next one; there
/// is no cross-chunk splitting. Chunks past the current one are retained
/// (empty) after a rewind and reused before any new chunk is linked; when
/// none of them fits a request they are released, so the reservation tracks
/// the peak live footprint rather than the number of rewinds.
pub(crate) struct ChunkList {
    chunks: RefCell<Vec<Chunk>>,
    /// Index of the chunk currently being filled.
    current: Cell<usize>,
    /// Bytes reserved across all chunks.
    reserved: Cell<usize>,
    chunk_size: usize,
    chunk_align: usize,
    max_reserved: usize,
}

impl ChunkList {
    /// Create an empty chunk list.
    ///
    /// `chunk_align` is the minimum base alignment of every chunk.
    pub(crate) fn new(chunk_size: usize, chunk_align: usize, max_reserved: usize) -> Self {
        Self {
            chunks: RefCell::new(Vec::new()),
            current: Cell::new(0),
            reserved: Cell::new(0),
            chunk_size,
            chunk_align,
            max_reserved,
        }
    }

    /// Bump-allocate `size` bytes aligned to `align`, linking a new chunk if
    /// needed.
    pub(crate) fn alloc(&self, size: usize, align: usize) -> Result<NonNull<u8>, ArenaError> {
        let mut chunks = self.chunks.borrow_mut();
        let current = self.current.get();

        // Try the current chunk first.
        if let Some(ptr) = chunks.get(current).and_then(|c| c.alloc(size, align)) {
            return Ok(ptr);
        }

        // Current chunk full. Everything past it is empty, so any retained
        // chunk that fits can be swapped into the next slot.
        let next = if chunks.is_empty() { 0 } else { current + 1 };
        let fit = chunks[next..]
            .iter()
            .enumerate()
            .find_map(|(i, chunk)| chunk.alloc(size, align).map(|ptr| (next + i, ptr)));
        if let Some((index, ptr)) = fit {
            chunks.swap(next, index);
            self.current.set(next);
            return Ok(ptr);
        }

        let chunk_align = self.chunk_align.max(align);
        let chunk_bytes = self.chunk_size.max(size);
        let reserved = self.reserved.get();
        let exceeded = || ArenaError::CapacityExceeded {
            requested: size,
            reserved,
            limit: self.max_reserved,
        };
        // The retained chunks are all too small and are released below.
        let released: usize = chunks[next..].iter().map(Chunk::capacity).sum();
        let kept = reserved - released;
        if kept.checked_add(chunk_bytes).is_none_or(|total| total > self.max_reserved) {
            return Err(exceeded());
        }
        let raw = RawChunk::allocate(chunk_bytes, chunk_align).ok_or_else(exceeded)?;

        if released > 0 {
            tracing::debug!(
                released,
                chunks = chunks.len() - next,
                "arena released retained chunks too small for the request"
            );
            chunks.truncate(next);
        }
        tracing::debug!(
            chunk_bytes,
            chunk_align,
            chunk_count = chunks.len() + 1,
            "arena linked a new chunk"
        );

        chunks.push(Chunk::new(raw));
        self.reserved.set(kept + chunk_bytes);
        self.current.set(next);
        // A fresh chunk of at least `size` bytes aligned to `align` always fits.
        chunks[next].alloc(size, align).ok_or_else(exceeded)
    }

    /// Current allocation position.
    pub(crate) fn pos(&self) -> ArenaPos {
        let chunks = self.chunks.borrow();
        let chunk = self.current.get();
        ArenaPos {
            chunk,
            offset: chunks.get(chunk).map_or(0, Chunk::used),
        }
    }

    /// Rewind to `pos`, emptying every chunk after it.
    ///
    /// Callers must hold exclusive access to the owning arena so that no
    /// allocation made after `pos` is still borrowed.
    pub(crate) fn rewind(&self, pos: ArenaPos) {
        let chunks = self.chunks.borrow();
        debug_assert!(pos <= self.pos(), "rewind target is ahead of the cursor");
        for chunk in chunks.iter().skip(pos.chunk + 1) {
            chunk.cursor.set(0);
        }
        if let Some(chunk) = chunks.get(pos.chunk) {
            chunk.cursor.set(pos.offset);
        }
        self.current.set(pos.chunk);
    }

    /// Number of chunks currently linked.
    pub(crate) fn chunk_count(&self) -> usize {
        self.chunks.borrow().len()
    }

    /// Bytes reserved across all chunks.
    pub(crate) fn reserved_bytes(&self) -> usize {
        self.reserved.get()
    }

    /// Bytes handed out (including alignment padding) across all chunks.
    pub(crate) fn used_bytes(&self) -> usize {
        self.chunks.borrow().iter().map(Chunk::used).sum()
    }

    /// Capacity of the chunk currently being filled.
    #[cfg(test)]
    pub(crate) fn current_capacity(&self) -> usize {
        self.chunks
            .borrow()
            .get(self.current.get())
            .map_or(0, Chunk::capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(chunk_size: usize, max: usize) -> ChunkList {
        ChunkList::new(chunk_size, 16, max)
    }

    #[test]
    fn first_alloc_links_first_chunk() {
        let chunks = list(128, 1024);
        assert_eq!(chunks.chunk_count(), 0);
        chunks.alloc(10, 8).unwrap();
        assert_eq!(chunks.chunk_count(), 1);
        assert_eq!(chunks.pos(), ArenaPos { chunk: 0, offset: 10 });
    }

    #[test]
    fn sequential_allocs_bump() {
        let chunks = list(128, 1024);
        let a = chunks.alloc(16, 8).unwrap();
        let b = chunks.alloc(16, 8).unwrap();
        assert_eq!(b.as_ptr().addr() - a.as_ptr().addr(), 16);
        assert_eq!(chunks.used_bytes(), 32);
    }

    #[test]
    fn grows_on_overflow() {
        let chunks = list(128, 1024);
        chunks.alloc(100, 8).unwrap();
        chunks.alloc(100, 8).unwrap();
        assert_eq!(chunks.chunk_count(), 2);
        assert_eq!(chunks.pos().chunk, 1);
    }

    #[test]
    fn oversized_request_gets_dedicated_chunk() {
        let chunks = list(128, 4096);
        chunks.alloc(1000, 8).unwrap();
        assert_eq!(chunks.current_capacity(), 1000);
        assert_eq!(chunks.reserved_bytes(), 1000);
    }

    #[test]
    fn capacity_exceeded_at_limit() {
        let chunks = list(128, 256);
        chunks.alloc(128, 8).unwrap();
        chunks.alloc(128, 8).unwrap();
        let result = chunks.alloc(1, 8);
        assert!(matches!(result, Err(ArenaError::CapacityExceeded { .. })));
    }

    #[test]
    fn rewind_reuses_retained_chunks() {
        let chunks = list(128, 1024);
        let start = chunks.pos();
        chunks.alloc(100, 8).unwrap();
        chunks.alloc(100, 8).unwrap();
        chunks.rewind(start);
        assert_eq!(chunks.pos(), ArenaPos::START);
        assert_eq!(chunks.used_bytes(), 0);

        chunks.alloc(100, 8).unwrap();
        chunks.alloc(100, 8).unwrap();
        assert_eq!(chunks.chunk_count(), 2, "second chunk was reused");
    }

    #[test]
    fn retained_chunk_too_small_is_replaced() {
        let chunks = list(128, 4096);
        chunks.alloc(100, 8).unwrap();
        chunks.alloc(100, 8).unwrap(); // chunk 1, 128 bytes
        chunks.rewind(ArenaPos::START);
        chunks.alloc(100, 8).unwrap();
        chunks.alloc(500, 8).unwrap(); // does not fit chunk 1
        assert_eq!(chunks.chunk_count(), 2);
        assert_eq!(chunks.reserved_bytes(), 128 + 500);
        assert_eq!(chunks.pos(), ArenaPos { chunk: 1, offset: 500 });
    }

    #[test]
    fn later_retained_chunk_that_fits_is_reused() {
        let chunks = list(128, 4096);
        chunks.alloc(100, 8).unwrap();
        chunks.alloc(100, 8).unwrap(); // chunk 1, 128 bytes
        chunks.alloc(500, 8).unwrap(); // chunk 2, 500 bytes
        chunks.rewind(ArenaPos::START);
        chunks.alloc(100, 8).unwrap();
        chunks.alloc(400, 8).unwrap(); // skips chunk 1, takes chunk 2
        assert_eq!(chunks.chunk_count(), 3);
        assert_eq!(chunks.reserved_bytes(), 128 + 128 + 500);
        assert_eq!(chunks.pos(), ArenaPos { chunk: 1, offset: 400 });
        assert_eq!(chunks.current_capacity(), 500);
    }

    #[test]
    fn growing_requests_across_rewinds_stay_within_limit() {
        let chunks = list(128, 8192);
        for round in 0..200 {
            let start = chunks.pos();
            chunks.alloc(200 + round, 1).unwrap();
            chunks.rewind(start);
        }
        assert!(chunks.chunk_count() <= 2);
        assert!(chunks.reserved_bytes() <= 200 + 399);
        assert_eq!(chunks.used_bytes(), 0);
    }

    #[test]
    fn failed_growth_keeps_retained_chunks() {
        let chunks = list(128, 384);
        chunks.alloc(100, 8).unwrap();
        chunks.alloc(100, 8).unwrap();
        chunks.rewind(ArenaPos::START);
        chunks.alloc(100, 8).unwrap();
        let result = chunks.alloc(300, 8);
        assert!(matches!(result, Err(ArenaError::CapacityExceeded { .. })));
        assert_eq!(chunks.chunk_count(), 2);
        assert_eq!(chunks.reserved_bytes(), 256);
    }

    #[test]
    fn over_aligned_request_gets_aligned_chunk() {
        let chunks = list(128, 4096);
        let ptr = chunks.alloc(8, 256).unwrap();
        assert_eq!(ptr.as_ptr().addr() % 256, 0);
    }

    #[test]
    fn positions_order_by_allocation() {
        let chunks = list(128, 1024);
        let p0 = chunks.pos();
        chunks.alloc(100, 8).unwrap();
        let p1 = chunks.pos();
        chunks.alloc(100, 8).unwrap();
        let p2 = chunks.pos();
        assert!(p0 < p1 && p1 < p2);
    }
}
