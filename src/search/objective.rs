//! Penalty-augmented search objective.
//!
//! The search runs over unconstrained length-M binary vectors; the size
//! constraint is enforced by a penalty rather than by restricting the search
//! space. The penalty coefficient is `10 * max(margins)`, which dominates
//! any profit gain available from violating the cardinality constraint at
//! the problem sizes in scope (N on the order of the coefficient multiple),
//! so any size violation is always worse than any feasible assortment with
//! positive profit.

use crate::domain::{Assortment, Margins, UtilityMatrix};
use crate::error::AppError;
use crate::sim::profit;

/// Penalty applied per unit of deviation from the target assortment size.
pub fn penalty_weight(margins: &Margins) -> f64 {
    10.0 * margins.max()
}

/// Penalized objective: `profit - penalty_weight * |size - target_size|`.
///
/// Equals the raw profit exactly when the assortment has `target_size`
/// offered products. `target_size > M` is invalid input: the penalty term
/// would be non-informative for an infeasible target.
pub fn objective(
    utilities: &UtilityMatrix,
    assortment: &Assortment,
    margins: &Margins,
    target_size: usize,
) -> Result<f64, AppError> {
    ensure_target_size(utilities, target_size)?;

    let p = profit(utilities, assortment, margins)?;
    let gap = assortment.size().abs_diff(target_size) as f64;
    Ok(p - penalty_weight(margins) * gap)
}

pub(crate) fn ensure_target_size(
    utilities: &UtilityMatrix,
    target_size: usize,
) -> Result<(), AppError> {
    if target_size > utilities.n_products() {
        return Err(AppError::invalid_input(format!(
            "Target size {target_size} exceeds the number of candidate products ({}).",
            utilities.n_products()
        )));
    }
    Ok(())
}
