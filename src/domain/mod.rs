//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - validated inputs (`UtilityMatrix`, `Margins`)
//! - search candidates (`Assortment`) and simulated outcomes (`Alternative`)
//! - run configuration (`OptimizeConfig`, `Method`)
//! - export schemas (`SolutionFile`)

pub mod types;

pub use types::*;
