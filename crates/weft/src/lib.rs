//! weft: bump arenas with scratch scopes, and intrusive doubly-linked lists.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! weft sub-crates. For most users, adding `weft` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use weft::prelude::*;
//!
//! struct Task {
//!     name: &'static str,
//!     queue: Link,
//! }
//!
//! link_adapter!(Queue = Task { queue });
//!
//! let arena = Arena::default();
//! let mut queue = List::<Queue>::new();
//! for name in ["fetch", "parse", "emit"] {
//!     queue.push_back(arena.alloc(Task { name, queue: Link::new() }));
//! }
//!
//! let mut cursor = Cursor::new();
//! let mut names = Str8List::new();
//! while let Some(task) = queue.for_each(&mut cursor) {
//!     names.push_str(&arena, task.name);
//! }
//! assert_eq!(names.join_str(&arena, " -> "), "fetch -> parse -> emit");
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`diag`] | `weft-core` | Fatal diagnostics, source locations, error kinds |
//! | [`arena`] | `weft-arena` | Bump arena, scopes, scratch pool |
//! | [`list`] | `weft-list` | Links, adapters, typed and raw lists, cursors |
//! | [`strings`] | `weft-strings` | Arena-backed string lists |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Diagnostics and the fatal-error policy (`weft-core`).
///
/// Every fatal operation in weft reports through [`diag::raise`].
pub use weft_core as diag;

/// Bump arena, LIFO scopes and scratch arenas (`weft-arena`).
pub use weft_arena as arena;

/// Intrusive doubly-linked lists (`weft-list`).
///
/// Declare adapters with [`link_adapter!`](list::link_adapter) and build
/// [`list::List`]s over them.
pub use weft_list as list;

/// String lists for 8, 16 and 32-bit code units (`weft-strings`).
pub use weft_strings as strings;

/// Common imports for typical weft usage.
///
/// ```rust
/// use weft::prelude::*;
/// ```
pub mod prelude {
    // Arena
    pub use weft_arena::{with_thread_scratch, Arena, ArenaConfig, Scratch, ScratchPool};

    // Lists
    pub use weft_list::{link_adapter, Adapter, Cursor, Link, List};

    // Strings
    pub use weft_strings::{Str16List, Str32List, Str8List};

    // Errors
    pub use weft_arena::ArenaError;
    pub use weft_core::{FatalError, FatalKind};
    pub use weft_list::ListError;
}
