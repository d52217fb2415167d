//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads utilities and margins from CSV
//! - runs the choice simulation and assortment search
//! - prints reports
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, EvaluateArgs, OptimizeArgs, SampleArgs};
use crate::data::{SampleOptions, generate_sample, reference_dataset};
use crate::domain::{EvaluateConfig, MarginSource, OptimizeConfig};
use crate::error::AppError;
use crate::io::export::{write_choices_csv, write_solution_json, write_utilities_csv};

pub mod pipeline;

/// Entry point for the `assort` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Optimize(args) => handle_optimize(args),
        Command::Evaluate(args) => handle_evaluate(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_optimize(args: OptimizeArgs) -> Result<(), AppError> {
    let config = optimize_config_from_args(&args)?;
    let run = pipeline::run_optimize(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.ingest.stats, &run.solution)
    );
    println!("{}", crate::report::format_choice_table(&run.choices));

    if let Some(path) = &config.export_choices {
        write_choices_csv(path, &run.choices)?;
    }
    if let Some(path) = &config.export_solution {
        write_solution_json(path, &run.solution)?;
    }

    Ok(())
}

fn handle_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = evaluate_config_from_args(&args)?;
    let run = pipeline::run_evaluate(&config)?;

    println!(
        "{}",
        crate::report::format_evaluation_summary(
            &run.ingest.stats,
            &run.offered,
            run.profit,
            &run.buyers,
        )
    );
    println!("{}", crate::report::format_choice_table(&run.choices));

    if let Some(path) = &config.export_choices {
        write_choices_csv(path, &run.choices)?;
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let (utilities, margins) = if args.reference {
        reference_dataset()?
    } else {
        let options = SampleOptions {
            customers: args.customers,
            products: args.products,
            seed: args.seed,
            noise_sd: args.noise_sd,
        };
        generate_sample(&options)?
    };

    write_utilities_csv(&args.out, &utilities)?;
    println!(
        "Wrote {} customers x {} products to {}",
        utilities.n_customers(),
        utilities.n_products(),
        args.out.display()
    );

    if let Some(path) = &args.margins_out {
        crate::io::export::write_margins_csv(path, &margins, utilities.product_names())?;
        println!("Wrote margins to {}", path.display());
    }

    Ok(())
}

fn optimize_config_from_args(args: &OptimizeArgs) -> Result<OptimizeConfig, AppError> {
    Ok(OptimizeConfig {
        utilities_path: args.utilities.clone(),
        margins: margin_source(&args.margins, &args.margins_file)?,
        target_size: args.target_size,
        method: args.method,
        population: args.population,
        generations: args.generations,
        seed: args.seed,
        export_choices: args.export_choices.clone(),
        export_solution: args.export_solution.clone(),
    })
}

fn evaluate_config_from_args(args: &EvaluateArgs) -> Result<EvaluateConfig, AppError> {
    Ok(EvaluateConfig {
        utilities_path: args.utilities.clone(),
        margins: margin_source(&args.margins, &args.margins_file)?,
        offer: args.offer.clone(),
        export_choices: args.export_choices.clone(),
    })
}

fn margin_source(
    inline: &Option<String>,
    file: &Option<std::path::PathBuf>,
) -> Result<MarginSource, AppError> {
    match (inline, file) {
        (Some(list), None) => Ok(MarginSource::Inline(list.clone())),
        (None, Some(path)) => Ok(MarginSource::File(path.clone())),
        _ => Err(AppError::usage(
            "Provide margins with exactly one of --margins or --margins-file.",
        )),
    }
}
