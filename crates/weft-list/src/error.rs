//! List-specific error types.

use std::error::Error;
use std::fmt;

use weft_core::{FatalError, FatalKind};

use crate::link::ListId;

/// Contract violations detected by list operations.
///
/// All variants are [`FatalKind::ContractViolation`]: they mean the caller
/// broke the link-state machine, not that the data was unusual.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListError {
    /// Tried to push a link that is already threaded into a list.
    AlreadyLinked {
        /// The list that currently owns the link.
        owner: ListId,
    },
    /// Tried to remove or navigate from a link that is in no list.
    NotLinked,
    /// The link belongs to a different list than the one operated on.
    WrongList {
        /// The list the operation was called on.
        expected: ListId,
        /// The list that actually owns the link.
        found: ListId,
    },
    /// A cursor that has been walking one list was passed to another.
    CursorMismatch {
        /// The list the cursor was walking.
        cursor: ListId,
        /// The list it was passed to.
        list: ListId,
    },
    /// The cursor's current node was unlinked from the list mid-traversal.
    CursorInvalidated {
        /// The list being traversed.
        list: ListId,
    },
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyLinked { owner } => {
                write!(f, "link is already in list {owner}")
            }
            Self::NotLinked => write!(f, "link is not in any list"),
            Self::WrongList { expected, found } => {
                write!(f, "link belongs to list {found}, not list {expected}")
            }
            Self::CursorMismatch { cursor, list } => {
                write!(f, "cursor for list {cursor} used on list {list}")
            }
            Self::CursorInvalidated { list } => {
                write!(f, "cursor node was unlinked from list {list} during traversal")
            }
        }
    }
}

impl Error for ListError {}

impl FatalError for ListError {
    fn kind(&self) -> FatalKind {
        FatalKind::ContractViolation
    }
}
