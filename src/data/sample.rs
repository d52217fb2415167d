//! Synthetic utility data generation and the bundled reference survey.
//!
//! The generator draws one "appeal" level per product and adds per-customer
//! taste noise on top, so a given seed always produces the same survey.
//! It exists so the tool can be demoed and benchmarked without a real
//! conjoint export at hand.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Margins, UtilityMatrix};
use crate::error::AppError;

/// Options for synthetic survey generation.
#[derive(Debug, Clone)]
pub struct SampleOptions {
    pub customers: usize,
    pub products: usize,
    pub seed: u64,
    /// Standard deviation of per-customer taste noise.
    pub noise_sd: f64,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            customers: 25,
            products: 6,
            seed: 42,
            noise_sd: 1.5,
        }
    }
}

/// Generate a synthetic utility matrix plus a margin vector.
///
/// Utilities are `appeal_j + noise`, with the status quo pinned near the
/// middle of the appeal range so that assortment composition actually
/// matters (an overwhelming status quo makes every assortment worthless,
/// an irrelevant one makes every product sell).
pub fn generate_sample(opts: &SampleOptions) -> Result<(UtilityMatrix, Margins), AppError> {
    if opts.customers == 0 {
        return Err(AppError::usage("Sample customer count must be > 0."));
    }
    if opts.products == 0 {
        return Err(AppError::usage("Sample product count must be > 0."));
    }
    if !(opts.noise_sd.is_finite() && opts.noise_sd >= 0.0) {
        return Err(AppError::usage("Sample noise standard deviation must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let noise = Normal::new(0.0, opts.noise_sd.max(1e-9))
        .map_err(|e| AppError::compute(format!("Noise distribution error: {e}")))?;

    // Product appeal levels on a 0-10 "rating" scale.
    let appeal: Vec<f64> = (0..opts.products)
        .map(|_| rng.gen_range(3.0..8.0))
        .collect();
    let status_quo_level = 5.0;

    let mut rows = Vec::with_capacity(opts.customers);
    for _ in 0..opts.customers {
        let mut row = Vec::with_capacity(opts.products + 1);
        row.push(status_quo_level + noise.sample(&mut rng));
        for &a in &appeal {
            row.push(a + noise.sample(&mut rng));
        }
        rows.push(row);
    }

    let product_names: Vec<String> = (1..=opts.products).map(|j| format!("p{j}")).collect();
    let utilities = UtilityMatrix::new(rows, None, product_names)?;

    // Margins in a plausible per-unit range, rounded to one decimal so the
    // CSV stays readable.
    let margins: Vec<f64> = (0..opts.products)
        .map(|_| (rng.gen_range(4.0f64..10.0) * 10.0).round() / 10.0)
        .collect();
    let margins = Margins::new(margins)?;

    Ok((utilities, margins))
}

/// The bundled 10-customer, 6-product reference survey.
///
/// Margins are `[8, 7, 8, 6, 9, 7]`. Known results: offering {p1, p5}
/// yields profit 51, {p1, p5, p6} yields 55, and the best 3-product line is
/// {p1, p2, p5} with profit 77.
pub fn reference_dataset() -> Result<(UtilityMatrix, Margins), AppError> {
    let rows = vec![
        vec![5.0, 8.0, 2.0, 3.0, 1.0, 4.0, 2.0],
        vec![5.0, 9.0, 3.0, 1.0, 2.0, 4.0, 3.0],
        vec![4.0, 6.0, 2.0, 9.0, 1.0, 3.0, 7.0],
        vec![5.0, 2.0, 9.0, 3.0, 1.0, 7.0, 4.0],
        vec![6.0, 3.0, 2.0, 4.0, 1.0, 9.0, 5.0],
        vec![3.0, 1.0, 2.0, 9.0, 0.0, 6.0, 8.0],
        vec![5.0, 1.0, 9.0, 2.0, 3.0, 4.0, 7.0],
        vec![4.0, 2.0, 7.0, 9.0, 1.0, 3.0, 2.0],
        vec![5.0, 3.0, 8.0, 9.0, 2.0, 4.0, 1.0],
        vec![6.0, 2.0, 9.0, 4.0, 3.0, 5.0, 1.0],
    ];
    let product_names = (1..=6).map(|j| format!("p{j}")).collect();
    let utilities = UtilityMatrix::new(rows, None, product_names)?;
    let margins = Margins::new(vec![8.0, 7.0, 8.0, 6.0, 9.0, 7.0])?;
    Ok((utilities, margins))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_sample_is_deterministic_per_seed() {
        let opts = SampleOptions::default();
        let (u1, m1) = generate_sample(&opts).unwrap();
        let (u2, m2) = generate_sample(&opts).unwrap();

        assert_eq!(u1.n_customers(), u2.n_customers());
        for i in 0..u1.n_customers() {
            assert_eq!(u1.status_quo(i), u2.status_quo(i));
            for j in 0..u1.n_products() {
                assert_eq!(u1.candidate(i, j), u2.candidate(i, j));
            }
        }
        for j in 0..m1.len() {
            assert_eq!(m1.get(j), m2.get(j));
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate_sample(&SampleOptions { seed: 1, ..Default::default() }).unwrap();
        let b = generate_sample(&SampleOptions { seed: 2, ..Default::default() }).unwrap();
        let differs = (0..a.0.n_products()).any(|j| a.0.candidate(0, j) != b.0.candidate(0, j));
        assert!(differs);
    }

    #[test]
    fn generate_sample_shapes_and_finiteness() {
        let opts = SampleOptions {
            customers: 7,
            products: 4,
            seed: 9,
            noise_sd: 0.5,
        };
        let (u, m) = generate_sample(&opts).unwrap();
        assert_eq!(u.n_customers(), 7);
        assert_eq!(u.n_products(), 4);
        assert_eq!(m.len(), 4);
        let (lo, hi) = u.utility_range();
        assert!(lo.is_finite() && hi.is_finite());
    }

    #[test]
    fn margins_land_in_range_with_one_decimal() {
        let (_, m) = generate_sample(&SampleOptions::default()).unwrap();
        for j in 0..m.len() {
            let v = m.get(j);
            assert!((4.0..=10.0).contains(&v), "margin {v} out of range");
            assert_eq!((v * 10.0).round() / 10.0, v, "margin {v} not one-decimal");
        }
    }

    #[test]
    fn zero_customers_rejected() {
        let err = generate_sample(&SampleOptions { customers: 0, ..Default::default() }).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn reference_dataset_shape() {
        let (u, m) = reference_dataset().unwrap();
        assert_eq!(u.n_customers(), 10);
        assert_eq!(u.n_products(), 6);
        assert_eq!(m.len(), 6);
        assert_eq!(m.max(), 9.0);
        assert_eq!(u.product_name(0), "p1");
        assert_eq!(u.product_name(5), "p6");
    }
}
