//! Input/output helpers.
//!
//! - spectrum ingest + validation (`ingest`)
//! - spectrum exports (TSV) (`export`)
//! - region files (`regions`)
//! - diagnostics JSON read/write (`diagnostics`)

pub mod diagnostics;
pub mod export;
pub mod ingest;
pub mod regions;

pub use diagnostics::*;
pub use export::*;
pub use ingest::*;
pub use regions::*;
