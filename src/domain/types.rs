//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during choice simulation and search
//! - exported to JSON/CSV
//! - reloaded later for comparisons

use std::path::PathBuf;

use clap::ValueEnum;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Per-customer utilities for the status quo and every candidate product.
///
/// Shape is `N x (M + 1)`: row `i` is customer `i`, column 0 is the always
/// available status quo, columns `1..=M` are the candidate products. The
/// matrix is validated once at construction and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct UtilityMatrix {
    values: DMatrix<f64>,
    customer_ids: Vec<String>,
    product_names: Vec<String>,
}

impl UtilityMatrix {
    /// Build a validated utility matrix.
    ///
    /// `rows` holds one entry per customer: `[status_quo, u_1, ..., u_M]`.
    /// `customer_ids` defaults to `C1..CN` when `None`.
    ///
    /// Fails on: zero customers, zero candidate products, ragged rows, and
    /// non-finite utilities. Non-finite values are rejected here so the
    /// max-selection logic downstream never sees a NaN.
    pub fn new(
        rows: Vec<Vec<f64>>,
        customer_ids: Option<Vec<String>>,
        product_names: Vec<String>,
    ) -> Result<Self, AppError> {
        if rows.is_empty() {
            return Err(AppError::invalid_input(
                "Utility matrix has zero customers; profit is undefined.",
            ));
        }
        if product_names.is_empty() {
            return Err(AppError::invalid_input(
                "Utility matrix has no candidate product columns.",
            ));
        }

        let n = rows.len();
        let width = product_names.len() + 1;

        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(AppError::invalid_input(format!(
                    "Customer row {} has {} values, expected {} (status quo + {} candidates).",
                    i + 1,
                    row.len(),
                    width,
                    product_names.len()
                )));
            }
            if let Some(v) = row.iter().find(|v| !v.is_finite()) {
                return Err(AppError::invalid_input(format!(
                    "Non-finite utility {v} in customer row {}.",
                    i + 1
                )));
            }
        }

        let customer_ids = match customer_ids {
            Some(ids) => {
                if ids.len() != n {
                    return Err(AppError::invalid_input(format!(
                        "Got {} customer ids for {} utility rows.",
                        ids.len(),
                        n
                    )));
                }
                ids
            }
            None => (1..=n).map(|i| format!("C{i}")).collect(),
        };

        let values = DMatrix::from_row_iterator(n, width, rows.into_iter().flatten());

        Ok(Self {
            values,
            customer_ids,
            product_names,
        })
    }

    /// Number of customers (N).
    pub fn n_customers(&self) -> usize {
        self.values.nrows()
    }

    /// Number of candidate products (M). Excludes the status quo column.
    pub fn n_products(&self) -> usize {
        self.product_names.len()
    }

    /// Status quo utility for customer `i`.
    pub fn status_quo(&self, i: usize) -> f64 {
        self.values[(i, 0)]
    }

    /// Utility of candidate product `j` (0-based, `j < M`) for customer `i`.
    pub fn candidate(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j + 1)]
    }

    pub fn customer_id(&self, i: usize) -> &str {
        &self.customer_ids[i]
    }

    pub fn product_name(&self, j: usize) -> &str {
        &self.product_names[j]
    }

    pub fn product_names(&self) -> &[String] {
        &self.product_names
    }

    /// Smallest and largest utility in the matrix (for run summaries).
    pub fn utility_range(&self) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for v in self.values.iter() {
            lo = lo.min(*v);
            hi = hi.max(*v);
        }
        (lo, hi)
    }
}

/// Per-unit profit contribution of each candidate product, in canonical
/// product order. The status quo earns nothing, so it has no margin here.
#[derive(Debug, Clone)]
pub struct Margins {
    values: Vec<f64>,
}

impl Margins {
    /// Validate and wrap a margin vector. Rejects empty and non-finite input.
    pub fn new(values: Vec<f64>) -> Result<Self, AppError> {
        if values.is_empty() {
            return Err(AppError::invalid_input("Margin vector is empty."));
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(AppError::invalid_input(format!("Non-finite margin {v}.")));
        }
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Margin of candidate product `j` (0-based).
    pub fn get(&self, j: usize) -> f64 {
        self.values[j]
    }

    /// Largest single margin. Used to scale the size-constraint penalty.
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Check that this vector matches a utility matrix with `m` candidates.
    pub fn ensure_matches(&self, m: usize) -> Result<(), AppError> {
        if self.values.len() != m {
            return Err(AppError::invalid_input(format!(
                "Margin vector has {} entries but the utility matrix has {} candidate products.",
                self.values.len(),
                m
            )));
        }
        Ok(())
    }
}

/// A candidate product line: which of the M candidates are offered
/// simultaneously. The status quo is always implicitly available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assortment {
    offered: Vec<bool>,
}

impl Assortment {
    pub fn new(offered: Vec<bool>) -> Self {
        Self { offered }
    }

    /// No candidate offered; every customer keeps the status quo.
    pub fn empty(m: usize) -> Self {
        Self {
            offered: vec![false; m],
        }
    }

    /// All M candidates offered.
    pub fn full(m: usize) -> Self {
        Self {
            offered: vec![true; m],
        }
    }

    /// Decode a bitmask (bit `j` set means candidate `j` is offered).
    pub fn from_mask(mask: u32, m: usize) -> Self {
        Self {
            offered: (0..m).map(|j| mask & (1 << j) != 0).collect(),
        }
    }

    /// Build from 0-based candidate indices.
    pub fn from_indices(indices: &[usize], m: usize) -> Result<Self, AppError> {
        let mut offered = vec![false; m];
        for &j in indices {
            if j >= m {
                return Err(AppError::invalid_input(format!(
                    "Candidate index {j} out of range (0-based, have {m} products)."
                )));
            }
            offered[j] = true;
        }
        Ok(Self { offered })
    }

    /// Build from product labels as they appear in the utilities header.
    /// Matching is case-insensitive; unknown labels are invalid input.
    pub fn from_labels(labels: &[&str], product_names: &[String]) -> Result<Self, AppError> {
        let mut offered = vec![false; product_names.len()];
        for label in labels {
            let wanted = label.trim();
            let idx = product_names
                .iter()
                .position(|name| name.eq_ignore_ascii_case(wanted))
                .ok_or_else(|| {
                    AppError::invalid_input(format!(
                        "Unknown product '{wanted}'. Known products: {}.",
                        product_names.join(", ")
                    ))
                })?;
            offered[idx] = true;
        }
        Ok(Self { offered })
    }

    /// Number of candidate slots (M).
    pub fn len(&self) -> usize {
        self.offered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offered.is_empty()
    }

    /// Number of offered products.
    pub fn size(&self) -> usize {
        self.offered.iter().filter(|&&b| b).count()
    }

    pub fn is_offered(&self, j: usize) -> bool {
        self.offered[j]
    }

    pub fn offered_indices(&self) -> Vec<usize> {
        self.offered
            .iter()
            .enumerate()
            .filter_map(|(j, &b)| if b { Some(j) } else { None })
            .collect()
    }

    /// Offered product labels in canonical order.
    pub fn labels(&self, product_names: &[String]) -> Vec<String> {
        self.offered_indices()
            .into_iter()
            .map(|j| product_names[j].clone())
            .collect()
    }

    pub fn bits(&self) -> &[bool] {
        &self.offered
    }

    pub fn bits_mut(&mut self) -> &mut [bool] {
        &mut self.offered
    }
}

/// One customer's simulated choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alternative {
    /// The always-available baseline; earns no margin.
    StatusQuo,
    /// Candidate product with the given 0-based index.
    Candidate(usize),
}

impl Alternative {
    /// Margin contribution of this choice.
    pub fn margin(&self, margins: &Margins) -> f64 {
        match self {
            Alternative::StatusQuo => 0.0,
            Alternative::Candidate(j) => margins.get(*j),
        }
    }

    pub fn label(&self, product_names: &[String]) -> String {
        match self {
            Alternative::StatusQuo => "status quo".to_string(),
            Alternative::Candidate(j) => product_names[*j].clone(),
        }
    }
}

/// A fully resolved per-customer choice row (for reports and exports).
#[derive(Debug, Clone)]
pub struct CustomerChoice {
    pub customer: String,
    pub alternative: Alternative,
    /// Label of the chosen alternative ("status quo" or a product name).
    pub choice_label: String,
    /// Utility the customer derives from the chosen alternative.
    pub utility: f64,
    /// Margin the firm earns from this customer.
    pub margin: f64,
}

/// Which search strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Penalty-augmented genetic algorithm (seeded, deterministic).
    Ga,
    /// Enumerate all 2^M assortments (exact; small M only).
    Exhaustive,
}

impl Method {
    pub fn display_name(self) -> &'static str {
        match self {
            Method::Ga => "genetic algorithm",
            Method::Exhaustive => "exhaustive enumeration",
        }
    }
}

/// Where the margin vector comes from.
#[derive(Debug, Clone)]
pub enum MarginSource {
    /// Comma-separated list in canonical product order (e.g. `8,7,8,6,9,7`).
    Inline(String),
    /// CSV file with `product,margin` columns matched by product name.
    File(PathBuf),
}

/// A full `assort optimize` run configuration (derived from CLI flags).
#[derive(Debug, Clone)]
pub struct OptimizeConfig {
    pub utilities_path: PathBuf,
    pub margins: MarginSource,
    pub target_size: usize,
    pub method: Method,

    pub population: usize,
    pub generations: usize,
    pub seed: u64,

    pub export_choices: Option<PathBuf>,
    pub export_solution: Option<PathBuf>,
}

/// An `assort evaluate` run configuration.
#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    pub utilities_path: PathBuf,
    pub margins: MarginSource,
    /// Comma-separated product labels to offer.
    pub offer: String,
    pub export_choices: Option<PathBuf>,
}

/// Buyer count for one alternative, used in exports and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerCount {
    pub product: String,
    pub buyers: usize,
}

/// A saved solution file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionFile {
    pub tool: String,
    pub method: Method,
    pub target_size: usize,
    pub n_customers: usize,
    pub n_products: usize,
    /// Offered product labels in canonical order.
    pub offered: Vec<String>,
    /// Unpenalized total profit of the assortment.
    pub profit: f64,
    /// Penalized objective value (equals profit when the size matches).
    pub objective: f64,
    pub evaluations: usize,
    pub buyers: Vec<BuyerCount>,
}
