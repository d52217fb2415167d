//! Discrete choice simulation and profit evaluation.
//!
//! Given a utility matrix and an assortment, each customer picks the
//! available alternative with the highest utility:
//!
//! - the status quo is always available
//! - candidates outside the assortment are excluded from the max entirely
//!   (not zeroed), so an excluded product can never be selected
//! - exact ties break to the lowest index in canonical order
//!
//! Both functions here are pure: same inputs, same outputs, no side effects.

use crate::domain::{Alternative, Assortment, Margins, UtilityMatrix};
use crate::error::AppError;

/// Simulate every customer's choice under the given assortment.
///
/// Returns one [`Alternative`] per customer, in row order. Tie-breaking is
/// deterministic: the strictly-greater comparison keeps the earliest
/// alternative (status quo first, then candidates in canonical order).
pub fn simulate_choices(
    utilities: &UtilityMatrix,
    assortment: &Assortment,
) -> Result<Vec<Alternative>, AppError> {
    ensure_shape(utilities, assortment)?;

    let mut choices = Vec::with_capacity(utilities.n_customers());
    for i in 0..utilities.n_customers() {
        let mut best = Alternative::StatusQuo;
        let mut best_utility = utilities.status_quo(i);

        for j in 0..utilities.n_products() {
            if !assortment.is_offered(j) {
                continue;
            }
            let u = utilities.candidate(i, j);
            if u > best_utility {
                best = Alternative::Candidate(j);
                best_utility = u;
            }
        }

        choices.push(best);
    }

    Ok(choices)
}

/// Total firm profit under the given assortment.
///
/// Sums the margin of each customer's chosen candidate; status quo choices
/// contribute zero.
pub fn profit(
    utilities: &UtilityMatrix,
    assortment: &Assortment,
    margins: &Margins,
) -> Result<f64, AppError> {
    margins.ensure_matches(utilities.n_products())?;

    let choices = simulate_choices(utilities, assortment)?;
    Ok(choices.iter().map(|c| c.margin(margins)).sum())
}

fn ensure_shape(utilities: &UtilityMatrix, assortment: &Assortment) -> Result<(), AppError> {
    if assortment.len() != utilities.n_products() {
        return Err(AppError::invalid_input(format!(
            "Assortment has {} slots but the utility matrix has {} candidate products.",
            assortment.len(),
            utilities.n_products()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference_dataset;
    use crate::domain::Assortment;

    #[test]
    fn reference_profit_matches_known_assortments() {
        let (u, m) = reference_dataset().unwrap();

        // Products 1, 5 offered (1-indexed): 3 buyers of p1 + 3 buyers of p5.
        let a = Assortment::from_indices(&[0, 4], 6).unwrap();
        assert_eq!(profit(&u, &a, &m).unwrap(), 51.0);

        // Adding p6 shifts three customers onto it.
        let a = Assortment::from_indices(&[0, 4, 5], 6).unwrap();
        assert_eq!(profit(&u, &a, &m).unwrap(), 55.0);

        let a = Assortment::from_indices(&[0, 1, 4], 6).unwrap();
        assert_eq!(profit(&u, &a, &m).unwrap(), 77.0);
    }

    #[test]
    fn empty_assortment_keeps_everyone_on_status_quo() {
        let (u, m) = reference_dataset().unwrap();
        let a = Assortment::empty(6);

        let choices = simulate_choices(&u, &a).unwrap();
        assert!(choices.iter().all(|c| *c == Alternative::StatusQuo));
        assert_eq!(profit(&u, &a, &m).unwrap(), 0.0);
    }

    #[test]
    fn excluded_product_is_never_chosen_even_with_max_utility() {
        // p2 has the globally highest utility but is not offered.
        let rows = vec![vec![1.0, 2.0, 99.0], vec![1.0, 3.0, 99.0]];
        let u = UtilityMatrix::new(rows, None, vec!["p1".to_string(), "p2".to_string()]).unwrap();

        let a = Assortment::from_indices(&[0], 2).unwrap();
        let choices = simulate_choices(&u, &a).unwrap();
        assert_eq!(choices, vec![Alternative::Candidate(0), Alternative::Candidate(0)]);
    }

    #[test]
    fn ties_break_to_the_lowest_index() {
        // Status quo ties the first candidate: status quo wins.
        // Second row: two candidates tie above status quo: lowest index wins.
        let rows = vec![vec![5.0, 5.0, 4.0], vec![1.0, 7.0, 7.0]];
        let u = UtilityMatrix::new(rows, None, vec!["p1".to_string(), "p2".to_string()]).unwrap();

        let a = Assortment::full(2);
        let choices = simulate_choices(&u, &a).unwrap();
        assert_eq!(choices, vec![Alternative::StatusQuo, Alternative::Candidate(0)]);
    }

    #[test]
    fn simulation_is_deterministic() {
        let (u, _) = reference_dataset().unwrap();
        let a = Assortment::from_mask(0b101101, 6);
        assert_eq!(
            simulate_choices(&u, &a).unwrap(),
            simulate_choices(&u, &a).unwrap()
        );
    }

    #[test]
    fn every_choice_is_available() {
        let (u, _) = reference_dataset().unwrap();
        for mask in 0u32..64 {
            let a = Assortment::from_mask(mask, 6);
            for c in simulate_choices(&u, &a).unwrap() {
                if let Alternative::Candidate(j) = c {
                    assert!(a.is_offered(j), "mask {mask:#b} assigned unoffered product {j}");
                }
            }
        }
    }

    #[test]
    fn shape_mismatch_is_invalid_input() {
        let (u, m) = reference_dataset().unwrap();
        let a = Assortment::empty(5);
        assert_eq!(simulate_choices(&u, &a).unwrap_err().exit_code(), 3);
        assert_eq!(profit(&u, &a, &m).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn margin_length_mismatch_is_invalid_input() {
        let (u, _) = reference_dataset().unwrap();
        let short = Margins::new(vec![8.0, 7.0]).unwrap();
        let a = Assortment::full(6);
        assert_eq!(profit(&u, &a, &short).unwrap_err().exit_code(), 3);
    }
}
