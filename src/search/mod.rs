//! Assortment search.
//!
//! Responsibilities:
//!
//! - penalty-augmented objective over unconstrained binary vectors
//! - seeded genetic algorithm (the default search driver)
//! - exhaustive enumeration for small M (exact answer, also the test oracle)

pub mod exhaustive;
pub mod ga;
pub mod objective;

pub use ga::GaOptions;
pub use objective::{objective, penalty_weight};

use crate::domain::Assortment;

/// Best assortment found by a search, with both the penalized objective and
/// the user-facing unpenalized profit.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub assortment: Assortment,
    /// Penalized objective of `assortment` (equals `profit` when the size
    /// constraint is met).
    pub objective: f64,
    /// Unpenalized total profit of `assortment`.
    pub profit: f64,
    /// Number of objective evaluations performed.
    pub evaluations: usize,
}
