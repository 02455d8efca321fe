//! External traversal state for [`List::for_each`](crate::List::for_each).
//!
//! A [`Cursor`] lives outside the list, so any number of traversals can run
//! over the same list at once. It remembers which list it walks; passing it to
//! another list, or continuing after its current entry was unlinked, is a
//! contract violation reported as [`ListError`].

#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::adapter::{link_of, Adapter};
use crate::error::ListError;
use crate::link::{Link, ListId};
use crate::raw::RawList;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Backward,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Not started; the first step yields the list's first (or last) entry.
    Fresh,
    /// Positioned before `link`; the next step yields it.
    Start(NonNull<Link>),
    /// Last yielded `link`.
    At(NonNull<Link>),
    Done,
}

/// Position of an in-progress traversal.
///
/// ```
/// use weft_list::{link_adapter, Cursor, Link, List};
///
/// struct Item {
///     n: i32,
///     link: Link,
/// }
/// link_adapter!(Items = Item { link });
///
/// let items: Vec<Item> = (1..=3).map(|n| Item { n, link: Link::new() }).collect();
/// let mut list = List::<Items>::new();
/// items.iter().for_each(|item| list.push_back(item));
///
/// let mut cursor = Cursor::new();
/// let mut sum = 0;
/// while let Some(item) = list.for_each(&mut cursor) {
///     sum += item.n;
/// }
/// assert_eq!(sum, 6);
/// assert!(list.for_each(&mut cursor).is_none());
/// ```
pub struct Cursor<'a, A: Adapter>
where
    A::Entry: 'a,
{
    state: State,
    list: Option<ListId>,
    _marker: PhantomData<(&'a A::Entry, fn() -> A)>,
}

impl<'a, A: Adapter> Cursor<'a, A>
where
    A::Entry: 'a,
{
    /// A cursor that starts at the first entry (or the last, walking in
    /// reverse).
    pub fn new() -> Self {
        Self {
            state: State::Fresh,
            list: None,
            _marker: PhantomData,
        }
    }

    /// A cursor whose first step yields `entry`, which must be linked into
    /// the list the cursor is then used with.
    pub fn at(entry: &'a A::Entry) -> Self {
        Self {
            state: State::Start(link_of::<A>(entry)),
            list: None,
            _marker: PhantomData,
        }
    }

    /// Return to the fresh state. The cursor may then walk any list.
    pub fn reset(&mut self) {
        self.state = State::Fresh;
        self.list = None;
    }

    /// Whether the traversal has run off the end.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// The list this cursor is walking, once it has taken a step.
    pub fn list(&self) -> Option<ListId> {
        self.list
    }

    pub(crate) fn advance(
        &mut self,
        raw: &RawList,
        direction: Direction,
    ) -> Result<Option<NonNull<Link>>, ListError> {
        match self.list {
            Some(cursor) if cursor != raw.id() => {
                return Err(ListError::CursorMismatch {
                    cursor,
                    list: raw.id(),
                })
            }
            _ => self.list = Some(raw.id()),
        }

        let step = |node: &Link| match direction {
            Direction::Forward => node.next(),
            Direction::Backward => node.prev(),
        };
        let next = match self.state {
            State::Fresh => match direction {
                Direction::Forward => raw.first(),
                Direction::Backward => raw.last(),
            },
            State::Start(link) => {
                raw.check_member(Self::node(link))?;
                Some(link)
            }
            State::At(link) => {
                let node = Self::node(link);
                if node.owner() != Some(raw.id()) {
                    return Err(ListError::CursorInvalidated { list: raw.id() });
                }
                step(node)
            }
            State::Done => None,
        };

        self.state = match next {
            Some(link) => State::At(link),
            None => State::Done,
        };
        Ok(next)
    }

    fn node(link: NonNull<Link>) -> &'a Link {
        // SAFETY: the cursor only stores links of `&'a A::Entry` records
        // (from `at` or from a `List<'a, A>`), and the cursor cannot outlive
        // 'a, so the link is live.
        unsafe { link.as_ref() }
    }
}

impl<'a, A: Adapter> Default for Cursor<'a, A>
where
    A::Entry: 'a,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, A: Adapter> fmt::Debug for Cursor<'a, A>
where
    A::Entry: 'a,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("state", &self.state)
            .field("list", &self.list)
            .finish()
    }
}
