//! Code-unit widths a string list can hold.

use std::fmt::Debug;
use std::hash::Hash;

/// One code unit of an encoded string: `u8` (UTF-8), `u16` (UTF-16) or
/// `u32` (UTF-32).
pub trait CodeUnit: Copy + Eq + Hash + Debug + Default + 'static {
    /// Width of one unit in bytes.
    const WIDTH: usize;
}

impl CodeUnit for u8 {
    const WIDTH: usize = 1;
}

impl CodeUnit for u16 {
    const WIDTH: usize = 2;
}

impl CodeUnit for u32 {
    const WIDTH: usize = 4;
}
