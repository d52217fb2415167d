//! Input/output helpers.
//!
//! - utilities/margins CSV ingest + validation (`ingest`)
//! - choice-table CSV, utilities CSV, and solution JSON exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
