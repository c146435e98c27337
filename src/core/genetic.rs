use std::{
    num::NonZero,
    thread,
    time::{Duration, Instant},
};

use bon::Builder;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        fitness::{Evaluator, Fitness, FitnessCache},
        genome::{Candidate, Layout},
        problem::Problem,
    },
    error::ConfigError,
    prelude::*,
};

/// Genetic algorithm tunables.
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    #[builder(default = 100)]
    pub population_size: usize,

    /// Maximum number of generations.
    #[builder(default = 400)]
    pub generations: usize,

    /// Probability that a pair of parents gets recombined.
    #[builder(default = 0.5)]
    pub crossover_probability: f64,

    /// Probability that a single symbol gets resampled.
    #[builder(default = 0.05)]
    pub mutation_probability: f64,

    #[builder(default = 3)]
    pub tournament_size: usize,

    /// Best individuals copied unchanged into the next generation.
    #[builder(default = 1)]
    pub elite_count: usize,

    /// Stop after this many generations without an improvement.
    pub patience: Option<usize>,

    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,

    /// Number of evaluation threads.
    #[builder(default = default_workers())]
    pub workers: usize,

    /// Wall-clock limit, checked between generations.
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

fn default_workers() -> usize {
    thread::available_parallelism().map_or(1, NonZero::get)
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 {
            return Err(ConfigError::Search {
                field: "population_size",
                reason: "at least two individuals are needed",
            });
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(ConfigError::Search {
                field: "tournament_size",
                reason: "must be within 1..=population_size",
            });
        }
        if self.elite_count == 0 || self.elite_count >= self.population_size {
            return Err(ConfigError::Search {
                field: "elite_count",
                reason: "must be within 1..population_size",
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::Search { field: "workers", reason: "must be positive" });
        }
        if self.patience == Some(0) {
            return Err(ConfigError::Search { field: "patience", reason: "must be positive" });
        }
        ConfigError::ensure_within(
            "search.crossover_probability",
            self.crossover_probability,
            0.0,
            1.0,
        )?;
        ConfigError::ensure_within(
            "search.mutation_probability",
            self.mutation_probability,
            0.0,
            1.0,
        )?;
        Ok(())
    }
}

/// Why the search stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum Termination {
    #[display("generation limit reached")]
    Completed,

    #[display("no improvement within the patience")]
    Stagnated,

    #[display("timed out")]
    TimedOut,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Individual {
    pub candidate: Candidate,
    pub fitness: Fitness,
}

/// Search result.
#[derive(Clone, Debug)]
pub struct Outcome {
    /// Best individual ever observed.
    pub best: Individual,

    pub n_generations: usize,
    pub n_evaluations: usize,
    pub n_cache_hits: usize,
    pub termination: Termination,
}

/// Generational genetic algorithm with tournament selection, two-point crossover and elitism.
pub struct Search<'a> {
    layout: &'a Layout,
    evaluator: Evaluator<'a>,
    config: &'a SearchConfig,
    pool: ThreadPool,
}

impl<'a> Search<'a> {
    pub fn try_new(problem: &'a Problem, config: &'a SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|index| format!("evaluator-{index}"))
            .build()?;
        Ok(Self { layout: &problem.layout, evaluator: Evaluator::new(problem), config, pool })
    }

    #[instrument(
        skip_all,
        name = "Searching…",
        fields(
            population_size = self.config.population_size,
            genome_len = self.layout.len(),
            workers = self.config.workers,
        ),
    )]
    pub fn run(&self, start_solution: Option<&Candidate>) -> Outcome {
        let config = self.config;
        let started_at = Instant::now();
        let mut rng = config.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        let mut cache = FitnessCache::default();

        let mut population: Vec<Candidate> = start_solution.cloned().into_iter().collect();
        while population.len() < config.population_size {
            population.push(self.layout.random(&mut rng));
        }
        let mut fitnesses = cache.evaluate_all(&self.evaluator, &self.pool, &population);
        let mut best = Individual { candidate: population[0].clone(), fitness: fitnesses[0] };
        Self::improve(&mut best, &population, &fitnesses);
        info!(loss = %best.fitness.loss, "initial population evaluated");

        let mut n_generations = 0;
        let mut n_stale_generations = 0;
        let termination = loop {
            if n_generations >= config.generations {
                break Termination::Completed;
            }
            if config.patience.is_some_and(|patience| n_stale_generations >= patience) {
                break Termination::Stagnated;
            }
            if config.timeout.is_some_and(|timeout| started_at.elapsed() >= timeout) {
                break Termination::TimedOut;
            }

            population = self.breed(&mut rng, &population, &fitnesses);
            fitnesses = cache.evaluate_all(&self.evaluator, &self.pool, &population);
            n_generations += 1;

            if Self::improve(&mut best, &population, &fitnesses) {
                trace!(n_generations, loss = %best.fitness.loss, "improved");
                n_stale_generations = 0;
            } else {
                n_stale_generations += 1;
            }
            debug!(n_generations, best_loss = %best.fitness.loss, cache_size = cache.len());
        };

        match termination {
            Termination::TimedOut => {
                let elapsed = started_at.elapsed();
                warn!(n_generations, ?elapsed, "timed out, returning the best so far");
            }
            Termination::Completed | Termination::Stagnated => {
                info!(n_generations, %termination, loss = %best.fitness.loss, "finished");
            }
        }
        Outcome {
            best,
            n_generations,
            n_evaluations: cache.len(),
            n_cache_hits: cache.n_hits(),
            termination,
        }
    }

    /// Replace the best individual if the population has a strictly fitter one.
    fn improve(best: &mut Individual, population: &[Candidate], fitnesses: &[Fitness]) -> bool {
        let fittest = population.iter().zip(fitnesses).min_by_key(|(_, fitness)| **fitness);
        match fittest {
            Some((candidate, fitness)) if *fitness < best.fitness => {
                *best = Individual { candidate: candidate.clone(), fitness: *fitness };
                true
            }
            _ => false,
        }
    }

    /// Produce the next generation: elites first, then the offspring of tournament winners.
    fn breed(
        &self,
        rng: &mut fastrand::Rng,
        population: &[Candidate],
        fitnesses: &[Fitness],
    ) -> Vec<Candidate> {
        let mut ranking: Vec<usize> = (0..population.len()).collect();
        ranking.sort_by_key(|index| fitnesses[*index]);

        let mut next: Vec<Candidate> = ranking
            .iter()
            .take(self.config.elite_count)
            .map(|index| population[*index].clone())
            .collect();
        while next.len() < self.config.population_size {
            let mut lhs = population[self.tournament(rng, fitnesses)].clone();
            let mut rhs = population[self.tournament(rng, fitnesses)].clone();
            if rng.f64() < self.config.crossover_probability {
                Self::crossover(rng, &mut lhs, &mut rhs);
            }
            for mut child in [lhs, rhs] {
                if next.len() < self.config.population_size {
                    self.mutate(rng, &mut child);
                    next.push(child);
                }
            }
        }
        next
    }

    /// Index of the fittest among randomly drawn contestants.
    fn tournament(&self, rng: &mut fastrand::Rng, fitnesses: &[Fitness]) -> usize {
        (0..self.config.tournament_size)
            .map(|_| rng.usize(0..fitnesses.len()))
            .min_by_key(|index| fitnesses[*index])
            .unwrap_or_default()
    }

    /// Swap the segment between two random cut points.
    fn crossover(rng: &mut fastrand::Rng, lhs: &mut Candidate, rhs: &mut Candidate) {
        let len = lhs.len().min(rhs.len());
        if len < 2 {
            return;
        }
        let (mut start, mut end) = (rng.usize(0..=len), rng.usize(0..=len));
        if start > end {
            (start, end) = (end, start);
        }
        lhs.symbols_mut()[start..end].swap_with_slice(&mut rhs.symbols_mut()[start..end]);
    }

    /// Resample each symbol with the mutation probability, always to a different one.
    fn mutate(&self, rng: &mut fastrand::Rng, candidate: &mut Candidate) {
        for (index, symbol) in candidate.symbols_mut().iter_mut().enumerate() {
            let alphabet_size = self.layout.alphabet_size(index);
            if alphabet_size < 2 || rng.f64() >= self.config.mutation_probability {
                continue;
            }
            let current = *symbol % alphabet_size;
            let replacement = rng.u32(0..alphabet_size - 1);
            *symbol = if replacement >= current { replacement + 1 } else { replacement };
        }
    }
}
