//! Member selectors: which `Link` field of which record a list threads.
//!
//! An [`Adapter`] names a record type and the byte offset of one of its
//! [`Link`] fields. Lists are parameterised by adapter, so one list
//! implementation serves every record type, and a record with several link
//! fields can sit in several lists at once, one adapter per field.
//!
//! Use [`link_adapter!`](crate::link_adapter) rather than implementing the
//! trait by hand: it derives the offset with `core::mem::offset_of!`, so a
//! misspelled member or a member that is not a `Link` fails to compile.

#![allow(unsafe_code)]

use std::ptr::{self, NonNull};

use crate::link::Link;

/// Selects the [`Link`] member of `Entry` that a list threads through.
///
/// # Safety
///
/// `OFFSET` must be the byte offset of a field of type [`Link`] within
/// `Entry`, and [`link`](Adapter::link) must return a reference to exactly
/// that field. Entry recovery subtracts `OFFSET` from link addresses without
/// any run-time check.
pub unsafe trait Adapter {
    /// The record type that embeds the link.
    type Entry;

    /// Byte offset of the link field within `Entry`.
    const OFFSET: usize;

    /// Borrow the link field of `entry`.
    fn link(entry: &Self::Entry) -> &Link;
}

/// Declare an [`Adapter`] for one `Link` member of a record type.
///
/// ```
/// use weft_list::{link_adapter, Link};
///
/// pub struct Task {
///     id: u32,
///     run_queue: Link,
///     all_tasks: Link,
/// }
///
/// link_adapter!(RunQueue = Task { run_queue });
/// link_adapter!(pub AllTasks = Task { all_tasks });
/// ```
///
/// Record types with a lifetime parameter take it on the adapter too:
///
/// ```
/// use weft_list::{link_adapter, Link};
///
/// struct Word<'a> {
///     text: &'a str,
///     link: Link,
/// }
///
/// link_adapter!(Words<'a> = Word<'a> { link });
/// ```
#[macro_export]
macro_rules! link_adapter {
    ($(#[$meta:meta])* $vis:vis $name:ident = $entry:ty { $field:ident }) => {
        $(#[$meta])*
        $vis struct $name;

        // SAFETY: OFFSET comes from offset_of! on `$field`, and `link` returns
        // that same field; its signature only compiles if the field is a Link.
        #[allow(unsafe_code)]
        unsafe impl $crate::Adapter for $name {
            type Entry = $entry;
            const OFFSET: usize = ::core::mem::offset_of!($entry, $field);

            fn link(entry: &$entry) -> &$crate::Link {
                &entry.$field
            }
        }
    };
    ($(#[$meta:meta])* $vis:vis $name:ident<$lt:lifetime> = $entry:ty { $field:ident }) => {
        $(#[$meta])*
        $vis struct $name<$lt>(::core::marker::PhantomData<&$lt ()>);

        // SAFETY: as above.
        #[allow(unsafe_code)]
        unsafe impl<$lt> $crate::Adapter for $name<$lt> {
            type Entry = $entry;
            const OFFSET: usize = ::core::mem::offset_of!($entry, $field);

            fn link<'__e>(entry: &'__e $entry) -> &'__e $crate::Link {
                &entry.$field
            }
        }
    };
}

/// Address of the `A`-selected link inside `entry`.
///
/// The pointer is derived from the whole record, so entry recovery from it
/// stays within the record's provenance.
pub fn link_of<A: Adapter>(entry: &A::Entry) -> NonNull<Link> {
    let base = NonNull::from(entry);
    // SAFETY: the Adapter contract puts a Link at OFFSET inside Entry, so the
    // offset pointer stays in bounds of the same allocation.
    let link = unsafe { base.byte_add(A::OFFSET) }.cast::<Link>();
    debug_assert!(ptr::eq(link.as_ptr(), A::link(entry)));
    link
}

/// Recover the record that embeds `link` as its `A`-selected member.
///
/// # Safety
///
/// `link` must point to the `A`-selected `Link` field of a live `A::Entry`,
/// obtained from [`link_of`] (or otherwise carrying the provenance of the
/// whole record).
pub unsafe fn entry<A: Adapter>(link: NonNull<Link>) -> NonNull<A::Entry> {
    // SAFETY: forwarded to the caller; the link sits OFFSET bytes into the
    // record, so stepping back OFFSET bytes lands on the record's start.
    unsafe { link.byte_sub(A::OFFSET) }.cast::<A::Entry>()
}

/// [`entry`] that passes `None` through instead of miscomputing from null.
///
/// # Safety
///
/// As [`entry`], for the `Some` case.
pub unsafe fn checked_entry<A: Adapter>(link: Option<NonNull<Link>>) -> Option<NonNull<A::Entry>> {
    // SAFETY: forwarded to the caller.
    link.map(|link| unsafe { entry::<A>(link) })
}
