//! Core diagnostics for the weft workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! fatal-diagnostic surface shared by `weft-arena` and `weft-list`:
//!
//! - [`diag::log_ext`] and [`diag::abort_ext`], the logging and abort entry
//!   points every fatal path routes through.
//! - [`SourceLocation`], naming the procedure, file and line of a diagnostic.
//! - [`FatalKind`] and the [`FatalError`] trait, which keep resource
//!   exhaustion and contract violations distinguishable in diagnostics.
//!
//! Every failure in the arena and list crates is a programmer-error signal.
//! The default operations raise through [`raise`]; the `try_` variants hand the
//! same error back to the caller instead.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod diag;
pub mod error;

pub use diag::{abort_ext, log_ext, Severity, SourceLocation};
pub use error::{raise, FatalError, FatalKind};
