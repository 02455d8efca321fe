//! Intrusive doubly-linked lists.
//!
//! A record joins a list by embedding a [`Link`]. The list stores pointers
//! between links only, and recovers the owning record by subtracting the
//! link's byte offset, selected per list by an [`Adapter`]. A record with
//! several `Link` fields can sit in several lists at once.
//!
//! # Layers
//!
//! ```text
//! List<'a, A>   typed, safe: entries borrowed for 'a, fatal or try_ errors
//!   └── RawList untyped chain of NonNull<Link>, unsafe push/remove
//!         └── Link  next / prev / owner cells embedded in each record
//! ```
//!
//! Every link records which list owns it, so double-linking, removing from
//! the wrong list and walking a stale [`Cursor`] are all caught in O(1).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod adapter;
pub mod cursor;
pub mod error;
pub mod link;
pub mod list;
pub mod raw;

pub use adapter::{checked_entry, entry, link_of, Adapter};
pub use cursor::Cursor;
pub use error::ListError;
pub use link::{Link, ListId};
pub use list::{Iter, List};
pub use raw::RawList;
