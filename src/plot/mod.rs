//! Terminal plotting helpers.
//!
//! ASCII rendering is deterministic so it can be golden-tested and pasted into
//! debug bundles; the interactive chart lives in `tui`.

pub mod ascii;

pub use ascii::*;
