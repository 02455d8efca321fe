//! Benchmark profiles for weft.
//!
//! - [`arena_profile`]: the arena configuration shared by the arena benches.
//! - [`word_corpus`]: deterministic input for string-list benches.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use weft_arena::ArenaConfig;

/// Arena configuration used by the benches: 64 KiB chunks, 8-byte default
/// alignment, a 256 MiB reservation limit.
pub fn arena_profile() -> ArenaConfig {
    ArenaConfig::new()
        .with_chunk_size(64 * 1024)
        .with_default_align(8)
        .with_max_reserved_bytes(256 << 20)
}

/// `count` comma-separated words of 3 to 10 lowercase letters.
///
/// Deterministic: a fixed linear congruential sequence picks word lengths and
/// letters, so every run sees the same corpus.
pub fn word_corpus(count: usize) -> String {
    let mut state: u32 = 0x2545_F491;
    let mut next = move || {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        state >> 16
    };
    let mut out = String::new();
    for i in 0..count {
        if i > 0 {
            out.push(',');
        }
        let len = 3 + next() % 8;
        for _ in 0..len {
            out.push(char::from(b'a' + (next() % 26) as u8));
        }
    }
    out
}
