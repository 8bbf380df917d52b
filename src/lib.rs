//! `emclip` library crate.
//!
//! The binary (`emclip`) is a thin wrapper around this library so that:
//!
//! - the clipping core is testable without spawning processes
//! - spectra can be clipped from other Rust code with an injected `Rng`
//! - front-ends (CLI flags, region files, the TUI picker) share one pipeline

pub mod app;
pub mod cli;
pub mod clip;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
