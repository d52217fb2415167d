//! Command-line parsing for the assortment optimizer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the simulation/search code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Method;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "assort", version, about = "Product-Line Assortment Optimizer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search for the most profitable assortment of a given size.
    Optimize(OptimizeArgs),
    /// Simulate choices and profit for a fixed assortment.
    Evaluate(EvaluateArgs),
    /// Generate a synthetic utilities CSV (and matching margins CSV).
    Sample(SampleArgs),
}

/// Options for the assortment search.
#[derive(Debug, Parser, Clone)]
pub struct OptimizeArgs {
    /// Utilities CSV (columns: optional `id`, `status_quo`, one per product).
    #[arg(short = 'u', long, value_name = "CSV")]
    pub utilities: PathBuf,

    /// Per-unit margins as a comma-separated list in product column order.
    #[arg(short = 'm', long, value_name = "LIST", conflicts_with = "margins_file")]
    pub margins: Option<String>,

    /// Per-unit margins as a `product,margin` CSV.
    #[arg(long, value_name = "CSV")]
    pub margins_file: Option<PathBuf>,

    /// Desired assortment size.
    #[arg(short = 'k', long)]
    pub target_size: usize,

    /// Search method.
    #[arg(long, value_enum, default_value_t = Method::Ga)]
    pub method: Method,

    /// GA population size.
    #[arg(long, default_value_t = 48)]
    pub population: usize,

    /// GA generation count.
    #[arg(long, default_value_t = 250)]
    pub generations: usize,

    /// Random seed for the GA.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Export the per-customer choice table to CSV.
    #[arg(long = "export-choices", value_name = "CSV")]
    pub export_choices: Option<PathBuf>,

    /// Export the winning assortment (labels, profit, buyers) to JSON.
    #[arg(long = "export-solution", value_name = "JSON")]
    pub export_solution: Option<PathBuf>,
}

/// Options for evaluating a fixed assortment.
#[derive(Debug, Parser, Clone)]
pub struct EvaluateArgs {
    /// Utilities CSV (columns: optional `id`, `status_quo`, one per product).
    #[arg(short = 'u', long, value_name = "CSV")]
    pub utilities: PathBuf,

    /// Per-unit margins as a comma-separated list in product column order.
    #[arg(short = 'm', long, value_name = "LIST", conflicts_with = "margins_file")]
    pub margins: Option<String>,

    /// Per-unit margins as a `product,margin` CSV.
    #[arg(long, value_name = "CSV")]
    pub margins_file: Option<PathBuf>,

    /// Products to offer, as a comma-separated list of column names.
    #[arg(short = 'o', long, value_name = "LIST")]
    pub offer: String,

    /// Export the per-customer choice table to CSV.
    #[arg(long = "export-choices", value_name = "CSV")]
    pub export_choices: Option<PathBuf>,
}

/// Options for synthetic data generation.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Number of customers to simulate.
    #[arg(short = 'n', long, default_value_t = 25)]
    pub customers: usize,

    /// Number of candidate products.
    #[arg(short = 'p', long, default_value_t = 6)]
    pub products: usize,

    /// Random seed for generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Standard deviation of the taste-shock noise.
    #[arg(long, default_value_t = 1.5)]
    pub noise_sd: f64,

    /// Emit the small fixed benchmark dataset instead of a random one.
    #[arg(long)]
    pub reference: bool,

    /// Output path for the utilities CSV.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,

    /// Optional output path for a matching `product,margin` CSV.
    #[arg(long = "margins-out", value_name = "CSV")]
    pub margins_out: Option<PathBuf>,
}
