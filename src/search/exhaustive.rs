//! Exhaustive assortment enumeration.
//!
//! For small M the whole 2^M space is cheap to score, which gives an exact
//! answer and an oracle the stochastic search can be validated against.
//! Masks are evaluated in parallel; the reduction picks the maximum
//! objective and breaks ties by the lowest bitmask, which is associative,
//! so the result does not depend on rayon's split order.

use rayon::prelude::*;

use crate::domain::{Assortment, Margins, UtilityMatrix};
use crate::error::AppError;
use crate::search::SearchOutcome;
use crate::search::objective::{ensure_target_size, objective};
use crate::sim::profit;

/// Hard cap on M for enumeration (2^24 evaluations).
const MAX_PRODUCTS: usize = 24;

/// Score every assortment and return the exact optimum.
pub fn optimize(
    utilities: &UtilityMatrix,
    margins: &Margins,
    target_size: usize,
) -> Result<SearchOutcome, AppError> {
    margins.ensure_matches(utilities.n_products())?;
    ensure_target_size(utilities, target_size)?;

    let m = utilities.n_products();
    if m > MAX_PRODUCTS {
        return Err(AppError::invalid_input(format!(
            "Exhaustive search supports at most {MAX_PRODUCTS} products (got {m}); use the GA.",
        )));
    }

    let n_masks = 1u32 << m;
    let (best_objective, best_mask) = (0..n_masks)
        .into_par_iter()
        .map(|mask| -> Result<(f64, u32), AppError> {
            let a = Assortment::from_mask(mask, m);
            Ok((objective(utilities, &a, margins, target_size)?, mask))
        })
        .try_reduce(
            || (f64::NEG_INFINITY, u32::MAX),
            |a, b| Ok(better(a, b)),
        )?;

    let assortment = Assortment::from_mask(best_mask, m);
    let best_profit = profit(utilities, &assortment, margins)?;

    Ok(SearchOutcome {
        assortment,
        objective: best_objective,
        profit: best_profit,
        evaluations: n_masks as usize,
    })
}

/// Higher objective wins; exact ties go to the lower mask.
fn better(a: (f64, u32), b: (f64, u32)) -> (f64, u32) {
    if b.0 > a.0 || (b.0 == a.0 && b.1 < a.1) {
        b
    } else {
        a
    }
}
