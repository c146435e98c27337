use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::{
    core::{
        fitness::{Evaluator, Fitness},
        genetic::{Outcome, Termination},
        genome::Candidate,
        problem::Problem,
        step::Step,
        summary::Summary,
        working_mode::BatteryAction,
    },
    prelude::*,
    quantity::energy::WattHours,
};

/// Decoded best plan, ready for the consumer.
#[derive(Clone, Debug, Serialize)]
pub struct Plan {
    pub candidate: Candidate,
    pub fitness: Fitness,
    pub schedule: Vec<PlannedHour>,

    /// Forecast hour at which the appliance starts.
    pub appliance_start_hour: Option<usize>,

    pub costs: Summary,
    pub trajectory: Vec<Step>,
    pub statistics: SearchStatistics,
    pub warnings: Vec<Warning>,
}

/// Decisions for one forecast hour.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct PlannedHour {
    pub hour: usize,
    pub battery: BatteryAction,
    pub ev_charge_rate: f64,
    pub ev_charge: WattHours,
    pub appliance_running: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchStatistics {
    pub n_generations: usize,
    pub n_evaluations: usize,
    pub n_cache_hits: usize,
    pub termination: Termination,
}

/// Non-fatal issue the caller should know about before acting on the plan.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Warning {
    /// No fully feasible plan was found.
    Infeasible { violation: WattHours },

    /// The search was cut short by the timeout.
    TimedOut { n_generations: usize },
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Infeasible { violation } => {
                write!(f, "no feasible plan found, residual violation is {violation}")
            }
            Self::TimedOut { n_generations } => {
                write!(f, "search timed out after {n_generations} generations")
            }
        }
    }
}

impl Plan {
    /// Decode and re-simulate the best candidate of the search.
    pub fn extract(problem: &Problem, outcome: Outcome) -> Self {
        let candidate = outcome.best.candidate;
        let decisions = problem.layout.decode(&candidate);
        let simulation = Evaluator::new(problem).simulate(&candidate);

        let appliance_hours = decisions
            .appliance_start
            .zip(problem.appliance.as_ref())
            .map(|(start, appliance)| start..(start + appliance.duration_hours));
        let schedule = simulation
            .steps
            .iter()
            .zip(&decisions.hours)
            .enumerate()
            .map(|(offset, (step, decision))| PlannedHour {
                hour: step.hour,
                battery: decision.battery,
                ev_charge_rate: decision.ev_charge_rate,
                ev_charge: step.ev_charge,
                appliance_running: appliance_hours
                    .as_ref()
                    .is_some_and(|hours| hours.contains(&offset)),
            })
            .collect();

        let mut warnings = Vec::new();
        if !outcome.best.fitness.is_feasible() {
            let violation = outcome.best.fitness.violation;
            warn!(%violation, "no feasible plan found");
            warnings.push(Warning::Infeasible { violation });
        }
        if outcome.termination == Termination::TimedOut {
            warnings.push(Warning::TimedOut { n_generations: outcome.n_generations });
        }

        Self {
            candidate,
            fitness: outcome.best.fitness,
            schedule,
            appliance_start_hour: decisions
                .appliance_start
                .map(|start| problem.horizon.start_hour + start),
            costs: simulation.summary,
            trajectory: simulation.steps,
            statistics: SearchStatistics {
                n_generations: outcome.n_generations,
                n_evaluations: outcome.n_evaluations,
                n_cache_hits: outcome.n_cache_hits,
                termination: outcome.termination,
            },
            warnings,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.fitness.is_feasible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            appliance::ApplianceParameters,
            battery::BatteryParameters,
            genetic::Individual,
            problem::Horizon,
        },
        forecast::Forecast,
        quantity::{percent::Percent, power::Watts, price::WattHourPrice},
    };

    fn problem(earliest_start: usize) -> Problem {
        Problem::builder()
            .horizon(Horizon { prediction_hours: 6, optimization_hours: 4, start_hour: 2 })
            .forecast(Forecast {
                pv: vec![Watts::ZERO; 6],
                temperature: Vec::new(),
                pv_now: None,
                price: vec![WattHourPrice(0.0003); 6],
                load: vec![Watts(500.0); 6],
            })
            .battery(BatteryParameters::builder().capacity(WattHours(5000.0)).build())
            .initial_battery_soc(Percent(50.0))
            .appliance(
                ApplianceParameters::builder()
                    .energy(WattHours(1200.0))
                    .duration_hours(2)
                    .earliest_start(earliest_start)
                    .build(),
            )
            .build()
            .unwrap()
    }

    fn outcome(problem: &Problem, candidate: Candidate, termination: Termination) -> Outcome {
        let fitness = Evaluator::new(problem).evaluate(&candidate);
        Outcome {
            best: Individual { candidate, fitness },
            n_generations: 3,
            n_evaluations: 10,
            n_cache_hits: 2,
            termination,
        }
    }

    #[test]
    fn test_extract() {
        let problem = problem(0);
        let candidate = Candidate::from(vec![1, 0, 0, 1, 1]);
        let plan = Plan::extract(&problem, outcome(&problem, candidate, Termination::Completed));
        assert!(plan.warnings.is_empty());
        assert!(plan.is_feasible());
        assert_eq!(plan.appliance_start_hour, Some(3));
        let hours: Vec<_> = plan.schedule.iter().map(|hour| hour.hour).collect();
        assert_eq!(hours, [2, 3, 4, 5]);
        let running: Vec<_> = plan.schedule.iter().map(|hour| hour.appliance_running).collect();
        assert_eq!(running, [false, true, true, false]);
        assert_eq!(plan.schedule[0].battery, BatteryAction::Discharge);
        assert_eq!(plan.trajectory.len(), 4);
        assert_eq!(plan.statistics.n_cache_hits, 2);
    }

    /// Verify that an overrunning appliance surfaces as a warning instead of a failure.
    #[test]
    fn test_infeasible_warning() {
        let problem = problem(3);
        let candidate = Candidate::from(vec![0; problem.layout.len()]);
        let plan = Plan::extract(&problem, outcome(&problem, candidate, Termination::TimedOut));
        assert!(!plan.is_feasible());
        assert_eq!(
            plan.warnings,
            [
                Warning::Infeasible { violation: WattHours(600.0) },
                Warning::TimedOut { n_generations: 3 },
            ]
        );
        assert_eq!(
            plan.warnings[1].to_string(),
            "search timed out after 3 generations"
        );
    }
}
