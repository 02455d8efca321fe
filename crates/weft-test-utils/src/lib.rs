//! Test utilities and fixtures for weft development.
//!
//! Provides a record type embedding two independent link members
//! ([`fixtures::Item`]), helpers for snapshotting list contents, and
//! [`init_tracing`] for tests that want to see diagnostics.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

pub use fixtures::{ids, ids_rev, items, ByOrder, ByPriority, Item};

static TRACING: Once = Once::new();

/// Install a test-writer `tracing` subscriber once per process.
///
/// The filter comes from `RUST_LOG` and defaults to `debug`. Safe to call
/// from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
