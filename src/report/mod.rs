//! Reporting: buyer aggregation and formatted terminal output.

pub mod format;

pub use format::*;
