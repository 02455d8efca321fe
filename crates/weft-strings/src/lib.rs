//! String lists built on the arena and the intrusive list.
//!
//! A [`StrList`] is a [`weft_list::List`] of [`StrNode`]s, each node carrying
//! a borrowed slice of code units. Nodes (and copied strings, when asked
//! for) live in a [`weft_arena::Arena`], so building a list never touches the
//! global allocator beyond the arena's own chunk growth.
//!
//! Three widths are provided: [`Str8List`], [`Str16List`] and [`Str32List`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod list;
pub mod node;
pub mod unit;

pub use list::{Str16List, Str32List, Str8List, StrList};
pub use node::{StrAdapter, StrNode};
pub use unit::CodeUnit;
