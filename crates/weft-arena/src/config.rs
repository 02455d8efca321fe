//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for the arena allocator.
///
/// Controls chunk sizing, the reservation limit, the default alignment and
/// the number of scratch arenas per pool. Validated at construction; all
/// values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Alignment used by [`Arena::push_bytes`](crate::Arena::push_bytes).
    ///
    /// Default: 8. Must be a power of two no larger than
    /// [`MAX_ALIGN`](Self::MAX_ALIGN).
    pub default_align: usize,

    /// Size of the first chunk and of each growth chunk, in bytes.
    ///
    /// Default: 64 KiB. Requests larger than this get a dedicated chunk
    /// sized to fit. Must be at least [`MIN_CHUNK_SIZE`](Self::MIN_CHUNK_SIZE).
    pub chunk_size: usize,

    /// Upper bound on the bytes the arena may reserve across all chunks.
    ///
    /// Default: 1 GiB. Growth past this limit is resource exhaustion.
    pub max_reserved_bytes: usize,

    /// Number of arenas in a [`ScratchPool`](crate::ScratchPool).
    ///
    /// Default: 4. Bounds how many scratch regions one thread can hold at once.
    pub scratch_pool_size: usize,
}

impl ArenaConfig {
    /// Default alignment for untyped pushes.
    pub const DEFAULT_ALIGN: usize = 8;

    /// Default chunk size: 64 KiB.
    pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

    /// Default reservation limit: 1 GiB.
    pub const DEFAULT_MAX_RESERVED_BYTES: usize = 1 << 30;

    /// Default scratch pool size.
    pub const DEFAULT_SCRATCH_POOL_SIZE: usize = 4;

    /// Largest supported alignment (one page).
    pub const MAX_ALIGN: usize = 4096;

    /// Smallest supported chunk size.
    pub const MIN_CHUNK_SIZE: usize = 64;

    /// Create a config with default values for every parameter.
    pub fn new() -> Self {
        Self {
            default_align: Self::DEFAULT_ALIGN,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            max_reserved_bytes: Self::DEFAULT_MAX_RESERVED_BYTES,
            scratch_pool_size: Self::DEFAULT_SCRATCH_POOL_SIZE,
        }
    }

    /// Replace the default alignment.
    pub fn with_default_align(mut self, align: usize) -> Self {
        self.default_align = align;
        self
    }

    /// Replace the chunk size.
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes;
        self
    }

    /// Replace the reservation limit.
    pub fn with_max_reserved_bytes(mut self, bytes: usize) -> Self {
        self.max_reserved_bytes = bytes;
        self
    }

    /// Replace the scratch pool size.
    pub fn with_scratch_pool_size(mut self, arenas: usize) -> Self {
        self.scratch_pool_size = arenas;
        self
    }

    /// Check every parameter against its documented constraints.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if !self.default_align.is_power_of_two() || self.default_align > Self::MAX_ALIGN {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "default_align must be a power of two <= {} (got {})",
                    Self::MAX_ALIGN,
                    self.default_align,
                ),
            });
        }
        if self.chunk_size < Self::MIN_CHUNK_SIZE {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "chunk_size must be >= {} (got {})",
                    Self::MIN_CHUNK_SIZE,
                    self.chunk_size,
                ),
            });
        }
        if self.max_reserved_bytes < self.chunk_size {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "max_reserved_bytes ({}) must hold at least one chunk ({})",
                    self.max_reserved_bytes, self.chunk_size,
                ),
            });
        }
        if self.scratch_pool_size == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "scratch_pool_size must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
