//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use weft_core::{FatalError, FatalKind};

use crate::arena::ArenaId;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The arena cannot grow to satisfy the request.
    CapacityExceeded {
        /// Number of bytes requested (including alignment slack).
        requested: usize,
        /// Bytes already reserved across all chunks.
        reserved: usize,
        /// Configured reservation limit.
        limit: usize,
    },
    /// Alignment is zero, not a power of two, or above the supported maximum.
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },
    /// A scope was closed while a more recently opened scope is still open.
    ScopeOutOfOrder {
        /// Depth of the handle being closed.
        depth: usize,
        /// Number of scopes currently open.
        open: usize,
    },
    /// The handle's scope was already discarded by `reset` or by an enclosing
    /// guard.
    StaleScope {
        /// Depth of the handle being closed.
        depth: usize,
    },
    /// A scope handle from another arena was passed to `scope_end`.
    ForeignScope {
        /// Arena that issued the handle.
        issued_by: ArenaId,
        /// Arena the handle was returned to.
        returned_to: ArenaId,
    },
    /// Every arena in a scratch pool is already held.
    ScratchExhausted {
        /// Number of arenas in the pool.
        pool_size: usize,
    },
    /// Configuration failed validation.
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                reserved,
                limit,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} bytes, \
                     {reserved} of {limit} bytes reserved"
                )
            }
            Self::InvalidAlignment { align } => {
                write!(f, "invalid alignment {align}")
            }
            Self::ScopeOutOfOrder { depth, open } => {
                write!(
                    f,
                    "scope closed out of order: depth {depth}, {open} scopes open"
                )
            }
            Self::StaleScope { depth } => {
                write!(f, "scope at depth {depth} was already discarded")
            }
            Self::ForeignScope {
                issued_by,
                returned_to,
            } => {
                write!(
                    f,
                    "scope issued by arena {issued_by} closed on arena {returned_to}"
                )
            }
            Self::ScratchExhausted { pool_size } => {
                write!(f, "all {pool_size} scratch arenas are in use")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid arena config: {reason}")
            }
        }
    }
}

impl Error for ArenaError {}

impl FatalError for ArenaError {
    fn kind(&self) -> FatalKind {
        match self {
            Self::CapacityExceeded { .. } | Self::ScratchExhausted { .. } => {
                FatalKind::ResourceExhausted
            }
            Self::InvalidAlignment { .. }
            | Self::ScopeOutOfOrder { .. }
            | Self::StaleScope { .. }
            | Self::ForeignScope { .. }
            | Self::InvalidConfig { .. } => FatalKind::ContractViolation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustion_and_misuse_are_distinct_kinds() {
        let exhausted = ArenaError::ScratchExhausted { pool_size: 2 };
        let misuse = ArenaError::InvalidAlignment { align: 3 };
        assert_eq!(exhausted.kind(), FatalKind::ResourceExhausted);
        assert_eq!(misuse.kind(), FatalKind::ContractViolation);
    }

    #[test]
    fn capacity_message_names_sizes() {
        let err = ArenaError::CapacityExceeded {
            requested: 100,
            reserved: 64,
            limit: 128,
        };
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("64 of 128"));
    }
}
