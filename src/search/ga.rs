//! Seeded genetic algorithm over length-M binary assortment vectors.
//!
//! Operator choices:
//!
//! - tournament selection (size 3)
//! - uniform crossover
//! - per-bit mutation with rate `1 / M`
//! - elitism (the top individuals survive unchanged)
//!
//! The initial population is drawn uniformly over all bit vectors, so the
//! search explores assortment sizes other than the target; the penalized
//! objective, not the search space, enforces the cardinality constraint.
//! Everything is driven by a single `StdRng` seeded from the options, so a
//! fixed seed and settings always reproduce the same result.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::domain::{Assortment, Margins, UtilityMatrix};
use crate::error::AppError;
use crate::search::SearchOutcome;
use crate::search::objective::{ensure_target_size, objective};
use crate::sim::profit;

/// Genetic algorithm tuning knobs.
#[derive(Debug, Clone)]
pub struct GaOptions {
    pub population: usize,
    pub generations: usize,
    pub seed: u64,
    /// Tournament size for parent selection.
    pub tournament: usize,
    /// Number of top individuals copied unchanged into the next generation.
    pub elites: usize,
}

impl Default for GaOptions {
    fn default() -> Self {
        Self {
            population: 48,
            generations: 250,
            seed: 42,
            tournament: 3,
            elites: 2,
        }
    }
}

/// Run the genetic algorithm and return the best assortment found.
pub fn optimize(
    utilities: &UtilityMatrix,
    margins: &Margins,
    target_size: usize,
    opts: &GaOptions,
) -> Result<SearchOutcome, AppError> {
    margins.ensure_matches(utilities.n_products())?;
    ensure_target_size(utilities, target_size)?;
    if opts.population < 2 {
        return Err(AppError::usage("GA population must be at least 2."));
    }
    if opts.generations == 0 {
        return Err(AppError::usage("GA generation count must be at least 1."));
    }
    if opts.tournament == 0 || opts.elites >= opts.population {
        return Err(AppError::usage("Invalid GA tournament/elite settings."));
    }

    let m = utilities.n_products();
    let mutation_rate = 1.0 / m as f64;
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut evaluations = 0usize;

    // Uniform random initial population.
    let mut population: Vec<Assortment> = (0..opts.population)
        .map(|_| Assortment::new((0..m).map(|_| rng.gen_bool(0.5)).collect()))
        .collect();
    let mut fitness = evaluate_all(utilities, margins, target_size, &population, &mut evaluations)?;

    let (mut best, mut best_fitness) = pick_best(&population, &fitness);

    for _ in 0..opts.generations {
        // Rank current generation; ties break by index for determinism.
        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| {
            fitness[b]
                .partial_cmp(&fitness[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut next: Vec<Assortment> = order
            .iter()
            .take(opts.elites)
            .map(|&i| population[i].clone())
            .collect();

        while next.len() < opts.population {
            let pa = tournament_select(&fitness, opts.tournament, &mut rng);
            let pb = tournament_select(&fitness, opts.tournament, &mut rng);
            let mut child = crossover(&population[pa], &population[pb], &mut rng);
            mutate(&mut child, mutation_rate, &mut rng);
            next.push(child);
        }

        population = next;
        fitness = evaluate_all(utilities, margins, target_size, &population, &mut evaluations)?;

        let (gen_best, gen_best_fitness) = pick_best(&population, &fitness);
        if gen_best_fitness > best_fitness {
            best = gen_best;
            best_fitness = gen_best_fitness;
        }
    }

    let best_profit = profit(utilities, &best, margins)?;
    Ok(SearchOutcome {
        assortment: best,
        objective: best_fitness,
        profit: best_profit,
        evaluations,
    })
}

fn evaluate_all(
    utilities: &UtilityMatrix,
    margins: &Margins,
    target_size: usize,
    population: &[Assortment],
    evaluations: &mut usize,
) -> Result<Vec<f64>, AppError> {
    let mut fitness = Vec::with_capacity(population.len());
    for a in population {
        fitness.push(objective(utilities, a, margins, target_size)?);
        *evaluations += 1;
    }
    Ok(fitness)
}

fn pick_best(population: &[Assortment], fitness: &[f64]) -> (Assortment, f64) {
    let mut best_idx = 0;
    for i in 1..fitness.len() {
        if fitness[i] > fitness[best_idx] {
            best_idx = i;
        }
    }
    (population[best_idx].clone(), fitness[best_idx])
}

fn tournament_select(fitness: &[f64], size: usize, rng: &mut StdRng) -> usize {
    let mut winner = rng.gen_range(0..fitness.len());
    for _ in 1..size {
        let challenger = rng.gen_range(0..fitness.len());
        if fitness[challenger] > fitness[winner] {
            winner = challenger;
        }
    }
    winner
}

fn crossover(a: &Assortment, b: &Assortment, rng: &mut StdRng) -> Assortment {
    let bits = a
        .bits()
        .iter()
        .zip(b.bits())
        .map(|(&ba, &bb)| if rng.gen_bool(0.5) { ba } else { bb })
        .collect();
    Assortment::new(bits)
}

fn mutate(a: &mut Assortment, rate: f64, rng: &mut StdRng) {
    for bit in a.bits_mut() {
        if rng.gen_bool(rate.clamp(0.0, 1.0)) {
            *bit = !*bit;
        }
    }
}
