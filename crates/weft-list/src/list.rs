//! The typed intrusive list.
//!
//! [`List<'a, A>`] threads records of type `A::Entry` through the link member
//! selected by adapter `A`. Every linked record is borrowed for `'a`, so it
//! can neither move nor be dropped while linked; that is what makes entry
//! recovery sound without any unsafe code at the call site.
//!
//! Structural misuse (double linking, removing from the wrong list, walking a
//! cursor after its node was unlinked) is checked through each link's owner
//! id in every build, in O(1). The default operations raise a fatal
//! diagnostic; the `try_` variants return [`ListError`].

#![allow(unsafe_code)]

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

use weft_core::{raise, SourceLocation};

use crate::adapter::{self, link_of, Adapter};
use crate::cursor::{Cursor, Direction};
use crate::error::ListError;
use crate::link::{Link, ListId};
use crate::raw::RawList;

/// Intrusive doubly-linked list of `A::Entry` records.
///
/// # Example
///
/// ```
/// use weft_list::{link_adapter, Link, List};
///
/// struct Job {
///     id: u32,
///     queue: Link,
/// }
///
/// link_adapter!(Queue = Job { queue });
///
/// let jobs: Vec<Job> = (0..3).map(|id| Job { id, queue: Link::new() }).collect();
/// let mut list = List::<Queue>::new();
/// for job in &jobs {
///     list.push_back(job);
/// }
/// list.remove(&jobs[1]);
/// let ids: Vec<u32> = list.iter().map(|job| job.id).collect();
/// assert_eq!(ids, [0, 2]);
/// assert_eq!(list.pop_front().map(|job| job.id), Some(0));
/// ```
pub struct List<'a, A: Adapter>
where
    A::Entry: 'a,
{
    raw: RawList,
    _marker: PhantomData<(&'a A::Entry, fn() -> A)>,
}

impl<'a, A: Adapter> List<'a, A>
where
    A::Entry: 'a,
{
    /// An empty list.
    pub fn new() -> Self {
        Self {
            raw: RawList::new(),
            _marker: PhantomData,
        }
    }

    /// This list's identifier.
    pub fn id(&self) -> ListId {
        self.raw.id()
    }

    /// Number of linked entries.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the list holds no entries.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Whether `entry` is linked into this list.
    pub fn contains(&self, entry: &A::Entry) -> bool {
        self.raw.contains(A::link(entry))
    }

    /// Link `entry` at the front.
    ///
    /// Raises a fatal diagnostic if its link is already in a list.
    #[track_caller]
    pub fn push_front(&mut self, entry: &'a A::Entry) {
        if let Err(err) = self.try_push_front(entry) {
            raise(&err, SourceLocation::caller("List::push_front"));
        }
    }

    /// Checked form of [`push_front`](Self::push_front).
    pub fn try_push_front(&mut self, entry: &'a A::Entry) -> Result<(), ListError> {
        // SAFETY: `entry` is borrowed for 'a, which outlives the list, so its
        // link stays live and in place while linked.
        unsafe { self.raw.try_push_front(link_of::<A>(entry)) }
    }

    /// Link `entry` at the back.
    ///
    /// Raises a fatal diagnostic if its link is already in a list.
    #[track_caller]
    pub fn push_back(&mut self, entry: &'a A::Entry) {
        if let Err(err) = self.try_push_back(entry) {
            raise(&err, SourceLocation::caller("List::push_back"));
        }
    }

    /// Checked form of [`push_back`](Self::push_back).
    pub fn try_push_back(&mut self, entry: &'a A::Entry) -> Result<(), ListError> {
        // SAFETY: as in `try_push_front`.
        unsafe { self.raw.try_push_back(link_of::<A>(entry)) }
    }

    /// Unlink and return the first entry; `None` on an empty list.
    pub fn pop_front(&mut self) -> Option<&'a A::Entry> {
        self.raw.pop_front().map(|link| self.entry(link))
    }

    /// Unlink and return the last entry; `None` on an empty list.
    pub fn pop_back(&mut self) -> Option<&'a A::Entry> {
        self.raw.pop_back().map(|link| self.entry(link))
    }

    /// Unlink `entry` in O(1).
    ///
    /// Raises a fatal diagnostic if `entry` is not linked into this list.
    #[track_caller]
    pub fn remove(&mut self, entry: &A::Entry) {
        if let Err(err) = self.try_remove(entry) {
            raise(&err, SourceLocation::caller("List::remove"));
        }
    }

    /// Checked form of [`remove`](Self::remove).
    pub fn try_remove(&mut self, entry: &A::Entry) -> Result<(), ListError> {
        // SAFETY: `entry` is a live reference.
        unsafe { self.raw.try_remove(link_of::<A>(entry)) }
    }

    /// First entry, if any.
    pub fn first(&self) -> Option<&'a A::Entry> {
        self.raw.first().map(|link| self.entry(link))
    }

    /// Last entry, if any.
    pub fn last(&self) -> Option<&'a A::Entry> {
        self.raw.last().map(|link| self.entry(link))
    }

    /// The entry after `entry`, or `None` if `entry` is last.
    ///
    /// Raises a fatal diagnostic if `entry` is not linked into this list.
    #[track_caller]
    pub fn next(&self, entry: &A::Entry) -> Option<&'a A::Entry> {
        match self.try_next(entry) {
            Ok(next) => next,
            Err(err) => raise(&err, SourceLocation::caller("List::next")),
        }
    }

    /// Checked form of [`next`](Self::next).
    pub fn try_next(&self, entry: &A::Entry) -> Result<Option<&'a A::Entry>, ListError> {
        // SAFETY: `entry` is a live reference.
        let next = unsafe { self.raw.try_next(link_of::<A>(entry)) }?;
        Ok(next.map(|link| self.entry(link)))
    }

    /// The entry before `entry`, or `None` if `entry` is first.
    ///
    /// Raises a fatal diagnostic if `entry` is not linked into this list.
    #[track_caller]
    pub fn prev(&self, entry: &A::Entry) -> Option<&'a A::Entry> {
        match self.try_prev(entry) {
            Ok(prev) => prev,
            Err(err) => raise(&err, SourceLocation::caller("List::prev")),
        }
    }

    /// Checked form of [`prev`](Self::prev).
    pub fn try_prev(&self, entry: &A::Entry) -> Result<Option<&'a A::Entry>, ListError> {
        // SAFETY: `entry` is a live reference.
        let prev = unsafe { self.raw.try_prev(link_of::<A>(entry)) }?;
        Ok(prev.map(|link| self.entry(link)))
    }

    /// Advance `cursor` one entry forward and return that entry.
    ///
    /// A fresh cursor starts at the first entry. Once the end is reached the
    /// cursor returns `None` on every further call until reset. Several
    /// cursors may walk the same list at once. Raises a fatal diagnostic if
    /// the cursor was walking another list or its current entry has been
    /// unlinked.
    #[track_caller]
    pub fn for_each(&self, cursor: &mut Cursor<'a, A>) -> Option<&'a A::Entry> {
        match self.try_for_each(cursor) {
            Ok(entry) => entry,
            Err(err) => raise(&err, SourceLocation::caller("List::for_each")),
        }
    }

    /// Checked form of [`for_each`](Self::for_each).
    pub fn try_for_each(
        &self,
        cursor: &mut Cursor<'a, A>,
    ) -> Result<Option<&'a A::Entry>, ListError> {
        let link = cursor.advance(&self.raw, Direction::Forward)?;
        Ok(link.map(|link| self.entry(link)))
    }

    /// Advance `cursor` one entry backward and return that entry.
    ///
    /// A fresh cursor starts at the last entry; otherwise as
    /// [`for_each`](Self::for_each).
    #[track_caller]
    pub fn for_each_reverse(&self, cursor: &mut Cursor<'a, A>) -> Option<&'a A::Entry> {
        match self.try_for_each_reverse(cursor) {
            Ok(entry) => entry,
            Err(err) => raise(&err, SourceLocation::caller("List::for_each_reverse")),
        }
    }

    /// Checked form of [`for_each_reverse`](Self::for_each_reverse).
    pub fn try_for_each_reverse(
        &self,
        cursor: &mut Cursor<'a, A>,
    ) -> Result<Option<&'a A::Entry>, ListError> {
        let link = cursor.advance(&self.raw, Direction::Backward)?;
        Ok(link.map(|link| self.entry(link)))
    }

    /// Borrowing iterator from first to last.
    pub fn iter(&self) -> Iter<'_, 'a, A> {
        Iter {
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
            _marker: PhantomData,
        }
    }

    /// Unlink every entry for which `pred` returns true; returns how many.
    pub fn remove_by(&mut self, mut pred: impl FnMut(&A::Entry) -> bool) -> usize {
        let mut removed = 0;
        let mut cursor = self.raw.first();
        while let Some(link) = cursor {
            let entry = self.entry(link);
            // SAFETY: `link` is a member of this list.
            cursor = unsafe { self.raw.try_next(link) }.ok().flatten();
            if pred(entry) {
                // SAFETY: `link` is a member of this list.
                let unlinked = unsafe { self.raw.try_remove(link) };
                debug_assert!(unlinked.is_ok());
                removed += 1;
            }
        }
        removed
    }

    /// Unlink every entry.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Recover the entry owning `link`.
    fn entry(&self, link: NonNull<Link>) -> &'a A::Entry {
        // SAFETY: every link in (or just popped from) this list came from
        // `link_of::<A>` on an `&'a A::Entry`, so it sits at A::OFFSET inside
        // a record that stays alive and unmoved for 'a.
        unsafe { adapter::entry::<A>(link).as_ref() }
    }
}

impl<'a, A: Adapter> Default for List<'a, A>
where
    A::Entry: 'a,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, A: Adapter> Drop for List<'a, A>
where
    A::Entry: 'a,
{
    fn drop(&mut self) {
        // Unlinking writes through every entry, so 'a must still be live.
        self.raw.clear();
    }
}

impl<'a, A: Adapter> fmt::Debug for List<'a, A>
where
    A::Entry: 'a + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'l, 'a, A: Adapter> IntoIterator for &'l List<'a, A>
where
    A::Entry: 'a,
{
    type Item = &'a A::Entry;
    type IntoIter = Iter<'l, 'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`List`], returned by [`List::iter`].
///
/// Holds a shared borrow of the list, so the list cannot change underneath it.
pub struct Iter<'l, 'a, A: Adapter>
where
    A::Entry: 'a,
{
    front: Option<NonNull<Link>>,
    back: Option<NonNull<Link>>,
    remaining: usize,
    _marker: PhantomData<&'l List<'a, A>>,
}

impl<'a, A: Adapter> Iter<'_, 'a, A>
where
    A::Entry: 'a,
{
    fn entry(link: NonNull<Link>) -> &'a A::Entry {
        // SAFETY: the iterator only visits members of a list borrowed for
        // the iterator's lifetime; see `List::entry`.
        unsafe { adapter::entry::<A>(link).as_ref() }
    }

    fn node(link: NonNull<Link>) -> &'a Link {
        // SAFETY: as above.
        unsafe { link.as_ref() }
    }
}

impl<'a, A: Adapter> Iterator for Iter<'_, 'a, A>
where
    A::Entry: 'a,
{
    type Item = &'a A::Entry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let link = self.front?;
        self.remaining -= 1;
        self.front = Self::node(link).next();
        Some(Self::entry(link))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, A: Adapter> DoubleEndedIterator for Iter<'_, 'a, A>
where
    A::Entry: 'a,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let link = self.back?;
        self.remaining -= 1;
        self.back = Self::node(link).prev();
        Some(Self::entry(link))
    }
}

impl<'a, A: Adapter> ExactSizeIterator for Iter<'_, 'a, A> where A::Entry: 'a {}

impl<'a, A: Adapter> FusedIterator for Iter<'_, 'a, A> where A::Entry: 'a {}
