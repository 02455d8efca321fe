//! [`StrList`]: an intrusive list of arena-allocated string nodes.

use std::borrow::Cow;
use std::fmt;

use weft_arena::Arena;
use weft_list::List;

use crate::node::{StrAdapter, StrNode};
use crate::unit::CodeUnit;

/// An ordered list of strings whose nodes live in an arena.
///
/// Tracks the node count and the total number of code units across all
/// strings, so [`join`](Self::join) can size its output in one step.
///
/// ```
/// use weft_arena::Arena;
/// use weft_strings::Str8List;
///
/// let arena = Arena::default();
/// let mut list = Str8List::new();
/// list.push_str(&arena, "usr");
/// list.push_str(&arena, "local");
/// list.push_str(&arena, "bin");
/// assert_eq!(list.total_size(), 11);
/// assert_eq!(list.join_str(&arena, "/"), "usr/local/bin");
/// ```
pub struct StrList<'a, C: CodeUnit> {
    list: List<'a, StrAdapter<'a, C>>,
    total_size: usize,
}

/// List of UTF-8 (or raw byte) strings.
pub type Str8List<'a> = StrList<'a, u8>;
/// List of UTF-16 strings.
pub type Str16List<'a> = StrList<'a, u16>;
/// List of UTF-32 strings.
pub type Str32List<'a> = StrList<'a, u32>;

impl<'a, C: CodeUnit> StrList<'a, C> {
    /// An empty list.
    pub fn new() -> Self {
        Self {
            list: List::new(),
            total_size: 0,
        }
    }

    /// Number of strings.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the list holds no strings.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Sum of the lengths of all strings, in code units.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Append `string` without copying it; only the node goes in `arena`.
    #[track_caller]
    pub fn push(&mut self, arena: &'a Arena, string: &'a [C]) -> &'a StrNode<'a, C> {
        let node = &*arena.alloc(StrNode::new(string));
        self.push_node(node);
        node
    }

    /// Prepend `string` without copying it.
    #[track_caller]
    pub fn push_front(&mut self, arena: &'a Arena, string: &'a [C]) -> &'a StrNode<'a, C> {
        let node = &*arena.alloc(StrNode::new(string));
        self.list.push_front(node);
        self.total_size += node.string.len();
        node
    }

    /// Copy `string` into `arena` and append the copy.
    #[track_caller]
    pub fn push_copy(&mut self, arena: &'a Arena, string: &[C]) -> &'a StrNode<'a, C> {
        let copy = &*arena.alloc_slice_copy(string);
        self.push(arena, copy)
    }

    /// Append a caller-provided node.
    ///
    /// Raises a fatal diagnostic if the node is already in a list.
    #[track_caller]
    pub fn push_node(&mut self, node: &'a StrNode<'a, C>) {
        self.list.push_back(node);
        self.total_size += node.string.len();
    }

    /// Remove and return the first string.
    pub fn pop_front(&mut self) -> Option<&'a [C]> {
        let node = self.list.pop_front()?;
        self.total_size -= node.string.len();
        Some(node.string)
    }

    /// First string, if any.
    pub fn first(&self) -> Option<&'a [C]> {
        self.list.first().map(|node| node.string)
    }

    /// Last string, if any.
    pub fn last(&self) -> Option<&'a [C]> {
        self.list.last().map(|node| node.string)
    }

    /// Move every node of `other` to the end of `self`, leaving `other` empty.
    pub fn append(&mut self, other: &mut StrList<'a, C>) {
        while let Some(node) = other.list.pop_front() {
            other.total_size -= node.string.len();
            self.push_node(node);
        }
    }

    /// Unlink every node.
    pub fn clear(&mut self) {
        self.list.clear();
        self.total_size = 0;
    }

    /// Strings front to back.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a [C]> + ExactSizeIterator + '_ {
        self.list.iter().map(|node| node.string)
    }

    /// Concatenate every string into one arena slice, with `separator`
    /// between neighbours.
    #[track_caller]
    #[allow(clippy::mut_from_ref)]
    pub fn join<'b>(&self, arena: &'b Arena, separator: &[C]) -> &'b mut [C] {
        let gaps = self.len().saturating_sub(1);
        let len = self.total_size + separator.len() * gaps;
        let units = self.iter().enumerate().flat_map(move |(i, string)| {
            let lead: &[C] = if i == 0 { &[] } else { separator };
            lead.iter().chain(string).copied()
        });
        arena.alloc_slice_fill_iter(ExactLen {
            inner: units,
            remaining: len,
        })
    }

    /// Split `source` at every unit in `delimiters`, appending each non-empty
    /// piece. Pieces borrow `source`; only nodes are allocated.
    #[track_caller]
    pub fn split(arena: &'a Arena, source: &'a [C], delimiters: &[C]) -> Self {
        let mut list = Self::new();
        for piece in source.split(|unit| delimiters.contains(unit)) {
            if !piece.is_empty() {
                list.push(arena, piece);
            }
        }
        list
    }
}

impl<'a> StrList<'a, u8> {
    /// Append `string` without copying it.
    #[track_caller]
    pub fn push_str(&mut self, arena: &'a Arena, string: &'a str) -> &'a StrNode<'a, u8> {
        self.push(arena, string.as_bytes())
    }

    /// Format `args` into `arena` and append the result.
    #[track_caller]
    pub fn push_fmt(&mut self, arena: &'a Arena, args: fmt::Arguments<'_>) -> &'a StrNode<'a, u8> {
        match args.as_str() {
            Some(literal) => self.push_copy(arena, literal.as_bytes()),
            None => self.push_copy(arena, args.to_string().as_bytes()),
        }
    }

    /// Strings front to back as text; invalid UTF-8 is replaced.
    pub fn iter_str(&self) -> impl DoubleEndedIterator<Item = Cow<'a, str>> + '_ {
        self.iter().map(String::from_utf8_lossy)
    }

    /// [`join`](Self::join) as text; invalid UTF-8 is replaced.
    #[track_caller]
    pub fn join_str<'b>(&self, arena: &'b Arena, separator: &str) -> &'b str {
        let bytes: &'b [u8] = self.join(arena, separator.as_bytes());
        match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => arena.alloc_str(&String::from_utf8_lossy(bytes)),
        }
    }

    /// [`split`](Self::split) over text.
    #[track_caller]
    pub fn split_str(arena: &'a Arena, source: &'a str, delimiters: &str) -> Self {
        Self::split(arena, source.as_bytes(), delimiters.as_bytes())
    }
}

impl<'a, C: CodeUnit> Default for StrList<'a, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, C: CodeUnit> fmt::Debug for StrList<'a, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrList")
            .field("len", &self.len())
            .field("total_size", &self.total_size)
            .field("strings", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Wraps an iterator whose exact length is known up front.
struct ExactLen<I> {
    inner: I,
    remaining: usize,
}

impl<I: Iterator> Iterator for ExactLen<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        let item = self.inner.next()?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<I: Iterator> ExactSizeIterator for ExactLen<I> {}
