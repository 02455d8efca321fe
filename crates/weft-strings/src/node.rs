//! The string-list element and its link adapter.

#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::mem::offset_of;

use weft_list::{Adapter, Link};

use crate::unit::CodeUnit;

/// One string in a [`StrList`](crate::StrList).
///
/// The node borrows its string; neither is owned by the list.
pub struct StrNode<'a, C: CodeUnit> {
    /// The string this node carries.
    pub string: &'a [C],
    link: Link,
}

impl<'a, C: CodeUnit> StrNode<'a, C> {
    /// An unlinked node carrying `string`.
    pub fn new(string: &'a [C]) -> Self {
        Self {
            string,
            link: Link::new(),
        }
    }

    /// Whether the node is currently in a list.
    pub fn is_linked(&self) -> bool {
        self.link.is_linked()
    }
}

impl<C: CodeUnit> fmt::Debug for StrNode<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrNode")
            .field("string", &self.string)
            .field("link", &self.link)
            .finish()
    }
}

/// Selects [`StrNode`]'s link member.
pub struct StrAdapter<'a, C>(PhantomData<(&'a (), C)>);

// SAFETY: OFFSET is offset_of! on `link`, and `link` returns that field.
unsafe impl<'a, C: CodeUnit> Adapter for StrAdapter<'a, C> {
    type Entry = StrNode<'a, C>;
    const OFFSET: usize = offset_of!(StrNode<'a, C>, link);

    fn link<'e>(entry: &'e StrNode<'a, C>) -> &'e Link {
        &entry.link
    }
}
