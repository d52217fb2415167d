//! Shared pipeline logic behind the `optimize` and `evaluate` subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> margin resolution -> search/simulation -> buyer aggregation
//!
//! The CLI layer can then focus on presentation (printing and exports).

use crate::domain::{
    Alternative, Assortment, BuyerCount, CustomerChoice, EvaluateConfig, Margins, Method,
    OptimizeConfig, SolutionFile, UtilityMatrix,
};
use crate::error::AppError;
use crate::io::ingest::{IngestedData, load_utilities, resolve_margins};
use crate::search::{GaOptions, SearchOutcome, exhaustive, ga};
use crate::sim::simulate_choices;

/// All computed outputs of a single `assort optimize` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub margins: Margins,
    pub outcome: SearchOutcome,
    pub choices: Vec<CustomerChoice>,
    pub solution: SolutionFile,
}

/// All computed outputs of a single `assort evaluate` run.
#[derive(Debug, Clone)]
pub struct EvalOutput {
    pub ingest: IngestedData,
    pub margins: Margins,
    pub offered: Vec<String>,
    pub profit: f64,
    pub choices: Vec<CustomerChoice>,
    pub buyers: Vec<BuyerCount>,
}

/// Execute the full optimization pipeline and return the computed outputs.
pub fn run_optimize(config: &OptimizeConfig) -> Result<RunOutput, AppError> {
    let ingest = load_utilities(&config.utilities_path)?;
    let margins = resolve_margins(&config.margins, &ingest.utilities)?;

    let outcome = match config.method {
        Method::Ga => {
            let options = GaOptions {
                population: config.population,
                generations: config.generations,
                seed: config.seed,
                ..GaOptions::default()
            };
            ga::optimize(&ingest.utilities, &margins, config.target_size, &options)?
        }
        Method::Exhaustive => {
            exhaustive::optimize(&ingest.utilities, &margins, config.target_size)?
        }
    };

    let choices = build_choices(&ingest.utilities, &outcome.assortment, &margins)?;
    let buyers = crate::report::count_buyers(
        &choices,
        &outcome.assortment,
        ingest.utilities.product_names(),
    );

    let solution = SolutionFile {
        tool: "assort".to_string(),
        method: config.method,
        target_size: config.target_size,
        n_customers: ingest.utilities.n_customers(),
        n_products: ingest.utilities.n_products(),
        offered: outcome.assortment.labels(ingest.utilities.product_names()),
        profit: outcome.profit,
        objective: outcome.objective,
        evaluations: outcome.evaluations,
        buyers,
    };

    Ok(RunOutput {
        ingest,
        margins,
        outcome,
        choices,
        solution,
    })
}

/// Execute the fixed-assortment evaluation pipeline.
pub fn run_evaluate(config: &EvaluateConfig) -> Result<EvalOutput, AppError> {
    let ingest = load_utilities(&config.utilities_path)?;
    let margins = resolve_margins(&config.margins, &ingest.utilities)?;

    let labels: Vec<&str> = config
        .offer
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let assortment = Assortment::from_labels(&labels, ingest.utilities.product_names())?;

    let choices = build_choices(&ingest.utilities, &assortment, &margins)?;
    let profit = crate::sim::profit(&ingest.utilities, &assortment, &margins)?;
    let buyers =
        crate::report::count_buyers(&choices, &assortment, ingest.utilities.product_names());
    let offered = assortment.labels(ingest.utilities.product_names());

    Ok(EvalOutput {
        ingest,
        margins,
        offered,
        profit,
        choices,
        buyers,
    })
}

/// Expand raw alternatives into the per-customer choice table.
fn build_choices(
    utilities: &UtilityMatrix,
    assortment: &Assortment,
    margins: &Margins,
) -> Result<Vec<CustomerChoice>, AppError> {
    let alternatives = simulate_choices(utilities, assortment)?;

    let choices = alternatives
        .into_iter()
        .enumerate()
        .map(|(i, alternative)| {
            let utility = match alternative {
                Alternative::StatusQuo => utilities.status_quo(i),
                Alternative::Candidate(j) => utilities.candidate(i, j),
            };
            CustomerChoice {
                customer: utilities.customer_id(i).to_string(),
                alternative,
                choice_label: alternative.label(utilities.product_names()),
                utility,
                margin: alternative.margin(margins),
            }
        })
        .collect();

    Ok(choices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference_dataset;
    use crate::domain::MarginSource;
    use crate::io::export::{write_margins_csv, write_utilities_csv};
    use std::fs;
    use std::path::PathBuf;

    fn write_reference_files(tag: &str) -> (PathBuf, PathBuf) {
        let (utilities, margins) = reference_dataset().unwrap();
        let dir = std::env::temp_dir();
        let utilities_path = dir.join(format!("assort-pipe-{tag}-u-{}.csv", std::process::id()));
        let margins_path = dir.join(format!("assort-pipe-{tag}-m-{}.csv", std::process::id()));
        write_utilities_csv(&utilities_path, &utilities).unwrap();
        write_margins_csv(&margins_path, &margins, utilities.product_names()).unwrap();
        (utilities_path, margins_path)
    }

    #[test]
    fn optimize_pipeline_finds_reference_optimum() {
        let (utilities_path, margins_path) = write_reference_files("opt");

        let config = OptimizeConfig {
            utilities_path: utilities_path.clone(),
            margins: MarginSource::File(margins_path.clone()),
            target_size: 3,
            method: Method::Exhaustive,
            population: 48,
            generations: 250,
            seed: 42,
            export_choices: None,
            export_solution: None,
        };
        let run = run_optimize(&config).unwrap();

        assert_eq!(run.solution.offered, vec!["p1", "p2", "p5"]);
        assert!((run.solution.profit - 77.0).abs() < 1e-9);
        assert!((run.solution.objective - 77.0).abs() < 1e-9);
        assert_eq!(run.choices.len(), 10);
        let bought: usize = run.solution.buyers.iter().map(|b| b.buyers).sum();
        assert!(bought <= 10);

        fs::remove_file(&utilities_path).ok();
        fs::remove_file(&margins_path).ok();
    }

    #[test]
    fn evaluate_pipeline_matches_known_profit() {
        let (utilities_path, margins_path) = write_reference_files("eval");

        let config = EvaluateConfig {
            utilities_path: utilities_path.clone(),
            margins: MarginSource::File(margins_path.clone()),
            offer: "p2, p6".to_string(),
            export_choices: None,
        };
        let run = run_evaluate(&config).unwrap();

        assert_eq!(run.offered, vec!["p2", "p6"]);
        let expected = crate::sim::profit(
            &run.ingest.utilities,
            &Assortment::from_labels(&["p2", "p6"], run.ingest.utilities.product_names()).unwrap(),
            &run.margins,
        )
        .unwrap();
        assert!((run.profit - expected).abs() < 1e-9);

        fs::remove_file(&utilities_path).ok();
        fs::remove_file(&margins_path).ok();
    }

    #[test]
    fn evaluate_rejects_unknown_product_label() {
        let (utilities_path, margins_path) = write_reference_files("bad");

        let config = EvaluateConfig {
            utilities_path: utilities_path.clone(),
            margins: MarginSource::File(margins_path.clone()),
            offer: "p2,nope".to_string(),
            export_choices: None,
        };
        let err = run_evaluate(&config).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        fs::remove_file(&utilities_path).ok();
        fs::remove_file(&margins_path).ok();
    }
}
