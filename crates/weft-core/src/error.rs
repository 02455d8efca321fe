//! Fatal error classification.
//!
//! There are exactly two kinds of failure in the arena and list crates, and
//! neither has a recovery path in production code. [`FatalError`] lets each
//! crate's error enum say which kind it is, so [`raise`] can tag the
//! diagnostic accordingly.

use std::error::Error;
use std::fmt;

use crate::diag::{abort_ext, SourceLocation};

/// The two failure classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FatalKind {
    /// Memory could not be obtained (arena growth refused, scratch pool empty).
    ResourceExhausted,
    /// The caller broke an API contract (double link, out-of-order scope close, ...).
    ContractViolation,
}

impl fmt::Display for FatalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceExhausted => write!(f, "resource exhausted"),
            Self::ContractViolation => write!(f, "contract violation"),
        }
    }
}

/// An error that is fatal when raised through the default (non-`try_`) API.
pub trait FatalError: Error {
    /// Which failure class this error belongs to.
    fn kind(&self) -> FatalKind;
}

/// Abort with `err`, tagging the diagnostic with its [`FatalKind`].
#[cold]
#[inline(never)]
pub fn raise<E: FatalError + ?Sized>(err: &E, location: SourceLocation) -> ! {
    abort_ext(location, format_args!("{}: {err}", err.kind()))
}
