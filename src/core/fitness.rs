use std::{cmp::Ordering, collections::HashMap};

use itertools::Itertools;
use rayon::{ThreadPool, prelude::*};
use serde::Serialize;

use crate::{
    core::{
        genome::Candidate,
        problem::Problem,
        simulator::{Simulation, Simulator},
        summary::Summary,
    },
    quantity::{cost::Cost, energy::WattHours, price::WattHourPrice},
};

/// Candidate score, lower is better.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct Fitness {
    /// Net cost of the simulated plan.
    pub cost: Cost,

    /// Total constraint violation.
    pub violation: WattHours,

    /// Cost plus the penalised violation, the value being minimized.
    pub loss: Cost,
}

impl Fitness {
    pub fn new(summary: &Summary, penalty_factor: WattHourPrice) -> Self {
        let cost = summary.net_cost();
        Self { cost, violation: summary.violation, loss: cost + summary.violation * penalty_factor }
    }

    pub fn is_feasible(&self) -> bool {
        self.violation <= WattHours::ZERO
    }
}

impl PartialEq<Self> for Fitness {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Fitness {}

impl PartialOrd<Self> for Fitness {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fitness {
    fn cmp(&self, other: &Self) -> Ordering {
        self.loss.cmp(&other.loss)
    }
}

/// Pure mapping from a candidate to its fitness.
#[derive(Copy, Clone)]
pub struct Evaluator<'a> {
    simulator: Simulator<'a>,
    penalty_factor: WattHourPrice,
}

impl<'a> Evaluator<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        Self { simulator: Simulator::new(problem), penalty_factor: problem.penalty_factor }
    }

    pub fn simulate(&self, candidate: &Candidate) -> Simulation {
        self.simulator.simulate(candidate)
    }

    pub fn evaluate(&self, candidate: &Candidate) -> Fitness {
        Fitness::new(&self.simulate(candidate).summary, self.penalty_factor)
    }
}

/// Fitness memoized by candidate content.
///
/// Crossover and elitism keep producing identical candidates, those are never simulated twice.
#[derive(Default)]
pub struct FitnessCache {
    entries: HashMap<Candidate, Fitness>,
    n_hits: usize,
}

impl FitnessCache {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups answered without a simulation.
    pub const fn n_hits(&self) -> usize {
        self.n_hits
    }

    pub fn get(&self, candidate: &Candidate) -> Option<Fitness> {
        self.entries.get(candidate).copied()
    }

    /// Evaluate the whole generation, simulating only the candidates not seen before.
    ///
    /// Simulations run on the pool, and the call returns after all of them have finished.
    /// The result is aligned with `candidates`.
    pub fn evaluate_all(
        &mut self,
        evaluator: &Evaluator<'_>,
        pool: &ThreadPool,
        candidates: &[Candidate],
    ) -> Vec<Fitness> {
        let misses: Vec<&Candidate> = candidates
            .iter()
            .filter(|candidate| !self.entries.contains_key(*candidate))
            .unique()
            .collect();
        self.n_hits += candidates.len() - misses.len();

        let evaluated: Vec<(Candidate, Fitness)> = pool.install(|| {
            misses
                .into_par_iter()
                .map(|candidate| (candidate.clone(), evaluator.evaluate(candidate)))
                .collect()
        });
        self.entries.extend(evaluated);

        candidates
            .iter()
            .map(|candidate| self.entries[candidate])
            .collect()
    }
}
