//! Chunked bump arena with LIFO scopes and pooled scratch arenas.
//!
//! Allocation is O(1) bump-pointer work; deallocation happens in bulk when a
//! scope closes or the arena is reset or dropped. This crate is the only one
//! in the arena half of the workspace that contains `unsafe` code, and all of
//! it lives in `raw.rs` plus the typed views in `arena.rs`.
//!
//! # Architecture
//!
//! ```text
//! ScratchPool (one per thread, or passed explicitly)
//! └── Arena × scratch_pool_size (RefCell-guarded, handed out as Scratch)
//!
//! Arena
//! ├── ChunkList → Chunk[] (heap blocks, never moved, retained on rewind)
//! └── scope stack (saved ArenaPos per open scope)
//! ```
//!
//! # Failure policy
//!
//! Running out of memory and misusing the API are both fatal: the default
//! operations raise through [`weft_core::raise`]. Each has a `try_` sibling
//! returning [`ArenaError`] for tests and callers that want to observe the
//! failure.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod chunk;
pub mod config;
pub mod error;
mod raw;
pub mod scratch;

// Public re-exports for the primary API surface.
pub use arena::{Arena, ArenaId, ArenaScope, ScopeHandle};
pub use chunk::ArenaPos;
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use scratch::{with_thread_scratch, Scratch, ScratchPool};
