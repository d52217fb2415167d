//! Dataset helpers.
//!
//! - `sample`: synthetic utility matrix generation (seeded)
//! - the bundled reference survey used in docs and tests

pub mod sample;

pub use sample::*;
