//! The untyped list: a null-terminated chain of [`Link`] pointers.
//!
//! [`RawList`] knows nothing about the records its links live in. It is the
//! layer typed wrappers build on; most code should use
//! [`List`](crate::List), which adds the entry type and keeps every linked
//! record borrowed for as long as it is linked.
//!
//! The chain is null-terminated, not a ring: `first.prev` and `last.next` are
//! `None`, and an empty list has no `first`/`last`. Every link records its
//! owner's [`ListId`], so membership checks are O(1).

#![allow(unsafe_code)]

use std::fmt;
use std::ptr::NonNull;

use crate::error::ListError;
use crate::link::{Link, ListId};

/// Borrow a link through a pointer held by a list.
///
/// # Safety
///
/// `ptr` must point to a live `Link`.
unsafe fn link_ref<'x>(ptr: NonNull<Link>) -> &'x Link {
    // SAFETY: forwarded to the caller.
    unsafe { ptr.as_ref() }
}

/// Head of an untyped intrusive list.
///
/// Dropping a `RawList` unlinks every node so the links can be reused.
pub struct RawList {
    first: Option<NonNull<Link>>,
    last: Option<NonNull<Link>>,
    len: usize,
    id: ListId,
}

impl RawList {
    /// An empty list with a fresh id.
    pub fn new() -> Self {
        Self {
            first: None,
            last: None,
            len: 0,
            id: ListId::next(),
        }
    }

    /// This list's identifier.
    pub fn id(&self) -> ListId {
        self.id
    }

    /// Number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// First link, if any.
    pub fn first(&self) -> Option<NonNull<Link>> {
        self.first
    }

    /// Last link, if any.
    pub fn last(&self) -> Option<NonNull<Link>> {
        self.last
    }

    /// Link `link` at the front.
    ///
    /// # Safety
    ///
    /// `link` must point to a live `Link` that stays at that address until it
    /// is unlinked from this list (by `remove`, a pop, `clear` or drop).
    pub unsafe fn try_push_front(&mut self, link: NonNull<Link>) -> Result<(), ListError> {
        // SAFETY: `link` is live per the caller contract.
        let node = unsafe { link_ref(link) };
        if let Some(owner) = node.owner() {
            return Err(ListError::AlreadyLinked { owner });
        }
        node.attach(self.id, None, self.first);
        match self.first {
            // SAFETY: nodes in the list are live until unlinked.
            Some(first) => unsafe { link_ref(first) }.set_prev(Some(link)),
            None => self.last = Some(link),
        }
        self.first = Some(link);
        self.len += 1;
        Ok(())
    }

    /// Link `link` at the back.
    ///
    /// # Safety
    ///
    /// As [`try_push_front`](Self::try_push_front).
    pub unsafe fn try_push_back(&mut self, link: NonNull<Link>) -> Result<(), ListError> {
        // SAFETY: `link` is live per the caller contract.
        let node = unsafe { link_ref(link) };
        if let Some(owner) = node.owner() {
            return Err(ListError::AlreadyLinked { owner });
        }
        node.attach(self.id, self.last, None);
        match self.last {
            // SAFETY: nodes in the list are live until unlinked.
            Some(last) => unsafe { link_ref(last) }.set_next(Some(link)),
            None => self.first = Some(link),
        }
        self.last = Some(link);
        self.len += 1;
        Ok(())
    }

    /// Unlink and return the first link, or `None` if the list is empty.
    pub fn pop_front(&mut self) -> Option<NonNull<Link>> {
        let first = self.first?;
        // SAFETY: `first` is in this list, hence live.
        unsafe { self.unlink(first) };
        Some(first)
    }

    /// Unlink and return the last link, or `None` if the list is empty.
    pub fn pop_back(&mut self) -> Option<NonNull<Link>> {
        let last = self.last?;
        // SAFETY: `last` is in this list, hence live.
        unsafe { self.unlink(last) };
        Some(last)
    }

    /// Unlink `link`, which must belong to this list.
    ///
    /// # Safety
    ///
    /// `link` must point to a live `Link`.
    pub unsafe fn try_remove(&mut self, link: NonNull<Link>) -> Result<(), ListError> {
        // SAFETY: `link` is live per the caller contract.
        self.check_member(unsafe { link_ref(link) })?;
        // SAFETY: membership checked above.
        unsafe { self.unlink(link) };
        Ok(())
    }

    /// The link after `link`, or `None` if `link` is last.
    ///
    /// # Safety
    ///
    /// `link` must point to a live `Link`.
    pub unsafe fn try_next(&self, link: NonNull<Link>) -> Result<Option<NonNull<Link>>, ListError> {
        // SAFETY: `link` is live per the caller contract.
        let node = unsafe { link_ref(link) };
        self.check_member(node)?;
        Ok(node.next())
    }

    /// The link before `link`, or `None` if `link` is first.
    ///
    /// # Safety
    ///
    /// `link` must point to a live `Link`.
    pub unsafe fn try_prev(&self, link: NonNull<Link>) -> Result<Option<NonNull<Link>>, ListError> {
        // SAFETY: `link` is live per the caller contract.
        let node = unsafe { link_ref(link) };
        self.check_member(node)?;
        Ok(node.prev())
    }

    /// Unlink every node, leaving the list empty.
    pub fn clear(&mut self) {
        let mut cursor = self.first;
        while let Some(link) = cursor {
            // SAFETY: every node reached from `first` is in this list.
            let node = unsafe { link_ref(link) };
            cursor = node.next();
            node.detach();
        }
        self.first = None;
        self.last = None;
        self.len = 0;
    }

    /// Whether `link` is threaded into this list.
    pub fn contains(&self, link: &Link) -> bool {
        link.owner() == Some(self.id)
    }

    pub(crate) fn check_member(&self, node: &Link) -> Result<(), ListError> {
        match node.owner() {
            None => Err(ListError::NotLinked),
            Some(owner) if owner != self.id => Err(ListError::WrongList {
                expected: self.id,
                found: owner,
            }),
            Some(_) => Ok(()),
        }
    }

    /// Splice `link` out of the chain.
    ///
    /// # Safety
    ///
    /// `link` must be a member of this list.
    unsafe fn unlink(&mut self, link: NonNull<Link>) {
        // SAFETY: members are live.
        let node = unsafe { link_ref(link) };
        debug_assert_eq!(node.owner(), Some(self.id));
        let prev = node.prev();
        let next = node.next();
        match prev {
            // SAFETY: neighbours of a member are members.
            Some(p) => unsafe { link_ref(p) }.set_next(next),
            None => self.first = next,
        }
        match next {
            // SAFETY: as above.
            Some(n) => unsafe { link_ref(n) }.set_prev(prev),
            None => self.last = prev,
        }
        node.detach();
        self.len -= 1;
    }
}

impl Default for RawList {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RawList {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for RawList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawList")
            .field("id", &self.id)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links<const N: usize>() -> [Link; N] {
        std::array::from_fn(|_| Link::new())
    }

    fn forward(list: &RawList) -> Vec<NonNull<Link>> {
        let mut out = Vec::new();
        let mut cursor = list.first();
        while let Some(link) = cursor {
            out.push(link);
            // SAFETY: links in the list are live for the test.
            cursor = unsafe { list.try_next(link) }.unwrap();
        }
        out
    }

    fn backward(list: &RawList) -> Vec<NonNull<Link>> {
        let mut out = Vec::new();
        let mut cursor = list.last();
        while let Some(link) = cursor {
            out.push(link);
            // SAFETY: links in the list are live for the test.
            cursor = unsafe { list.try_prev(link) }.unwrap();
        }
        out
    }

    #[test]
    fn push_back_and_front_order() {
        let nodes = links::<3>();
        let ptrs: Vec<_> = nodes.iter().map(NonNull::from).collect();
        let mut list = RawList::new();
        // SAFETY: `nodes` outlives `list`.
        unsafe {
            list.try_push_back(ptrs[1]).unwrap();
            list.try_push_back(ptrs[2]).unwrap();
            list.try_push_front(ptrs[0]).unwrap();
        }
        assert_eq!(forward(&list), ptrs);
        let mut rev = backward(&list);
        rev.reverse();
        assert_eq!(rev, ptrs);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn double_push_is_rejected() {
        let nodes = links::<1>();
        let mut a = RawList::new();
        let mut b = RawList::new();
        let ptr = NonNull::from(&nodes[0]);
        // SAFETY: `nodes` outlives both lists.
        unsafe {
            a.try_push_back(ptr).unwrap();
            assert_eq!(
                b.try_push_front(ptr),
                Err(ListError::AlreadyLinked { owner: a.id() })
            );
        }
        assert!(b.is_empty());
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn remove_from_wrong_list_is_rejected() {
        let nodes = links::<1>();
        let mut a = RawList::new();
        let mut b = RawList::new();
        let ptr = NonNull::from(&nodes[0]);
        // SAFETY: `nodes` outlives both lists.
        unsafe {
            a.try_push_back(ptr).unwrap();
            assert_eq!(
                b.try_remove(ptr),
                Err(ListError::WrongList {
                    expected: b.id(),
                    found: a.id()
                })
            );
        }
        assert!(a.contains(&nodes[0]));
    }

    #[test]
    fn remove_unlinked_is_rejected() {
        let nodes = links::<1>();
        let mut list = RawList::new();
        // SAFETY: `nodes` outlives `list`.
        let result = unsafe { list.try_remove(NonNull::from(&nodes[0])) };
        assert_eq!(result, Err(ListError::NotLinked));
    }

    #[test]
    fn pops_on_empty_list_are_none() {
        let mut list = RawList::new();
        assert!(list.pop_front().is_none());
        assert!(list.pop_back().is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn remove_middle_relinks_neighbours() {
        let nodes = links::<3>();
        let ptrs: Vec<_> = nodes.iter().map(NonNull::from).collect();
        let mut list = RawList::new();
        // SAFETY: `nodes` outlives `list`.
        unsafe {
            for &p in &ptrs {
                list.try_push_back(p).unwrap();
            }
            list.try_remove(ptrs[1]).unwrap();
        }
        assert_eq!(forward(&list), vec![ptrs[0], ptrs[2]]);
        assert_eq!(backward(&list), vec![ptrs[2], ptrs[0]]);
        assert!(!nodes[1].is_linked());
    }

    #[test]
    fn pop_front_and_back_unlink() {
        let nodes = links::<2>();
        let ptrs: Vec<_> = nodes.iter().map(NonNull::from).collect();
        let mut list = RawList::new();
        // SAFETY: `nodes` outlives `list`.
        unsafe {
            list.try_push_back(ptrs[0]).unwrap();
            list.try_push_back(ptrs[1]).unwrap();
        }
        assert_eq!(list.pop_back(), Some(ptrs[1]));
        assert_eq!(list.pop_front(), Some(ptrs[0]));
        assert!(list.is_empty());
        assert!(nodes.iter().all(|n| !n.is_linked()));
    }

    #[test]
    fn drop_unlinks_everything() {
        let nodes = links::<3>();
        {
            let mut list = RawList::new();
            for node in &nodes {
                // SAFETY: `nodes` outlives `list`.
                unsafe { list.try_push_back(NonNull::from(node)).unwrap() };
            }
        }
        assert!(nodes.iter().all(|n| !n.is_linked()));
    }
}
