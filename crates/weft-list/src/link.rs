//! The embedded link node and list identifiers.

use std::cell::Cell;
use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`ListId`] allocation.
static LIST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a list.
///
/// Every link records the id of the list it is threaded into, which makes
/// double-linking, wrong-list removal and stale cursors detectable in O(1).
/// Ids are never reused within a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListId(u64);

impl ListId {
    pub(crate) fn next() -> Self {
        Self(LIST_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `next`/`prev` pair a record embeds to join an intrusive list.
///
/// A record joins one list per `Link` field it has. The pointers refer to
/// other links, never to record data; the owning record is recovered through
/// an [`Adapter`](crate::Adapter). All state sits in `Cell`s so lists can
/// thread links reached through shared references.
///
/// A link is either unlinked or linked into exactly one list.
pub struct Link {
    next: Cell<Option<NonNull<Link>>>,
    prev: Cell<Option<NonNull<Link>>>,
    owner: Cell<Option<ListId>>,
}

impl Link {
    /// An unlinked link.
    pub const fn new() -> Self {
        Self {
            next: Cell::new(None),
            prev: Cell::new(None),
            owner: Cell::new(None),
        }
    }

    /// Whether this link is currently part of a list.
    pub fn is_linked(&self) -> bool {
        self.owner.get().is_some()
    }

    /// The list this link is threaded into, if any.
    pub fn owner(&self) -> Option<ListId> {
        self.owner.get()
    }

    pub(crate) fn next(&self) -> Option<NonNull<Link>> {
        self.next.get()
    }

    pub(crate) fn prev(&self) -> Option<NonNull<Link>> {
        self.prev.get()
    }

    pub(crate) fn set_next(&self, next: Option<NonNull<Link>>) {
        self.next.set(next);
    }

    pub(crate) fn set_prev(&self, prev: Option<NonNull<Link>>) {
        self.prev.set(prev);
    }

    pub(crate) fn attach(
        &self,
        owner: ListId,
        prev: Option<NonNull<Link>>,
        next: Option<NonNull<Link>>,
    ) {
        self.owner.set(Some(owner));
        self.prev.set(prev);
        self.next.set(next);
    }

    pub(crate) fn detach(&self) {
        self.owner.set(None);
        self.prev.set(None);
        self.next.set(None);
    }
}

impl Default for Link {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owner.get() {
            Some(owner) => write!(f, "Link(linked into list {owner})"),
            None => write!(f, "Link(unlinked)"),
        }
    }
}
