use crate::{
    core::{
        genetic::{Search, SearchConfig},
        genome::Candidate,
        plan::Plan,
        problem::Problem,
        simulator::{Simulation, Simulator},
    },
    error::ConfigError,
    prelude::*,
};

/// Search for the cheapest plan.
///
/// Fails only on invalid search parameters or a start solution of a wrong length. Constraint
/// violations of the best plan found are reported as warnings inside the plan.
#[instrument(
    skip_all,
    name = "Optimizing…",
    fields(
        start_hour = problem.horizon.start_hour,
        optimization_hours = problem.horizon.optimization_hours,
    ),
)]
pub fn optimize(
    problem: &Problem,
    config: &SearchConfig,
    start_solution: Option<&Candidate>,
) -> Result<Plan, ConfigError> {
    if let Some(start_solution) = start_solution {
        problem.layout.validate(start_solution)?;
    }
    let outcome = Search::try_new(problem, config)?.run(start_solution);
    Ok(Plan::extract(problem, outcome))
}

/// Simulate a ready plan without searching.
pub fn simulate(problem: &Problem, candidate: &Candidate) -> Result<Simulation, ConfigError> {
    problem.layout.validate(candidate)?;
    Ok(Simulator::new(problem).simulate(candidate))
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::{
        core::{
            appliance::ApplianceParameters,
            battery::BatteryParameters,
            ev::EvParameters,
            fitness::Evaluator,
            fixtures,
            plan::Warning,
            problem::Horizon,
        },
        forecast::Forecast,
        quantity::{
            energy::WattHours,
            percent::Percent,
            power::Watts,
            price::WattHourPrice,
        },
    };

    fn search_config(seed: u64) -> SearchConfig {
        SearchConfig::builder()
            .population_size(60)
            .generations(200)
            .seed(seed)
            .workers(2)
            .build()
    }

    fn household_problem() -> Problem {
        Problem::builder()
            .horizon(fixtures::HORIZON)
            .forecast(fixtures::forecast())
            .battery(fixtures::battery())
            .initial_battery_soc(Percent(80.0))
            .ev(fixtures::ev())
            .initial_ev_soc(Percent(54.0))
            .feed_in_tariff(fixtures::FEED_IN_TARIFF)
            .penalty_factor(WattHourPrice(10.0))
            .build()
            .unwrap()
    }

    /// Overnight and daytime household with the hand-made start solution.
    #[test]
    fn test_household_beats_baseline() {
        let problem = household_problem();
        let start_solution = fixtures::start_solution(problem.layout.len());
        let start_fitness = Evaluator::new(&problem).evaluate(&start_solution);

        let plan = optimize(&problem, &search_config(42), Some(&start_solution)).unwrap();

        assert!(plan.fitness <= start_fitness);
        assert!(plan.is_feasible());
        assert!(plan.warnings.is_empty());
        assert!(plan.costs.net_cost() < plan.costs.baseline_cost);
        assert!(plan.costs.saving().0 > 0.0);
        assert_eq!(plan.schedule.len(), 24);
        assert_eq!(plan.schedule[0].hour, 10);
        for step in &plan.trajectory {
            assert!((0.0..=100.0).contains(&step.battery_soc_after.0));
            assert!(step.grid_import >= WattHours::ZERO);
            assert!(step.grid_export >= WattHours::ZERO);
            assert!(step.ev_charge >= WattHours::ZERO);
        }
    }

    #[test]
    fn test_reproducible_under_seed() {
        let problem = household_problem();
        let start_solution = fixtures::start_solution(problem.layout.len());
        let lhs = optimize(&problem, &search_config(7), Some(&start_solution)).unwrap();
        let rhs = optimize(&problem, &search_config(7), Some(&start_solution)).unwrap();
        assert_eq!(lhs.candidate, rhs.candidate);
        assert_eq!(lhs.trajectory, rhs.trajectory);
        assert_eq!(lhs.costs, rhs.costs);
    }

    /// Verify that the state of charge stays within bounds whenever no violation is reported.
    #[test]
    fn test_soc_within_bounds_when_feasible() {
        let mut problem = household_problem();
        problem.battery.min_soc = Percent(20.0);
        problem.battery.max_soc = Percent(90.0);
        let mut ev = problem.ev.take().unwrap();
        ev.parameters.min_soc = Percent(50.0);
        problem.ev = Some(ev);

        let simulator = Simulator::new(&problem);
        let mut rng = fastrand::Rng::with_seed(42);
        let idle = Candidate::from(vec![0; problem.layout.len()]);
        let candidates = std::iter::once(idle)
            .chain((0..500).map(|_| problem.layout.random(&mut rng)))
            .collect::<Vec<_>>();
        let mut n_feasible = 0;
        for candidate in &candidates {
            let simulation = simulator.simulate(candidate);
            if simulation.summary.violation > WattHours::ZERO {
                continue;
            }
            n_feasible += 1;
            for step in &simulation.steps {
                assert!((20.0 - 1e-9..=90.0 + 1e-9).contains(&step.battery_soc_after.0));
                assert!(step.ev_soc_after.unwrap().0 >= 50.0 - 1e-9);
            }
        }
        assert!(n_feasible > 0);
    }

    /// Deep price trough in hour 3 of an otherwise expensive night.
    #[test]
    fn test_price_trough() {
        let n_hours = 8;
        let trough = 3;
        let mut price = vec![WattHourPrice(0.0003); n_hours];
        price[trough] = WattHourPrice(0.00005);
        let problem = Problem::builder()
            .horizon(Horizon { prediction_hours: n_hours, optimization_hours: n_hours, start_hour: 0 })
            .forecast(Forecast {
                pv: vec![Watts::ZERO; n_hours],
                temperature: Vec::new(),
                pv_now: None,
                price,
                load: vec![Watts(500.0); n_hours],
            })
            .battery(
                BatteryParameters::builder()
                    .capacity(WattHours(5000.0))
                    .charging_efficiency(0.95)
                    .discharging_efficiency(0.95)
                    .max_charging_power(Watts(2500.0))
                    .max_discharging_power(Watts(1000.0))
                    .wear_cost(WattHourPrice(0.000001))
                    .build(),
            )
            .initial_battery_soc(Percent(0.0))
            .ev(EvParameters::builder()
                .capacity(WattHours(20000.0))
                .target_soc(Percent(60.0))
                .max_charging_power(Watts(4000.0))
                .charge_rates(vec![0.0, 0.5, 1.0])
                .build())
            .initial_ev_soc(Percent(50.0))
            .build()
            .unwrap();
        let config = SearchConfig::builder()
            .population_size(80)
            .generations(300)
            .seed(42)
            .workers(2)
            .build();

        let plan = optimize(&problem, &config, None).unwrap();

        assert!(plan.is_feasible());
        let grid_charge = |offset: usize| plan.trajectory[offset].battery_flow.charged_from_grid;
        let ev_charge = |offset: usize| plan.trajectory[offset].ev_charge;
        assert!(grid_charge(trough) > WattHours::ZERO);
        assert_eq!((0..n_hours).max_by_key(|offset| grid_charge(*offset)), Some(trough));
        assert!(ev_charge(trough) > WattHours::ZERO);
        assert_eq!(
            (0..n_hours).max_set_by_key(|offset| ev_charge(*offset)),
            [trough],
        );
    }

    /// Appliance which cannot finish before the window ends.
    #[test]
    fn test_appliance_overrun_is_a_warning() {
        let problem = Problem::builder()
            .horizon(fixtures::HORIZON)
            .forecast(fixtures::forecast())
            .battery(fixtures::battery())
            .initial_battery_soc(Percent(80.0))
            .appliance(
                ApplianceParameters::builder()
                    .energy(WattHours(937.0))
                    .duration_hours(6)
                    .earliest_start(20)
                    .build(),
            )
            .feed_in_tariff(fixtures::FEED_IN_TARIFF)
            .build()
            .unwrap();

        let plan = optimize(&problem, &search_config(1), None).unwrap();

        assert!(!plan.is_feasible());
        assert_eq!(plan.appliance_start_hour, Some(30));
        let violation = plan.fitness.violation;
        assert!(violation > WattHours(300.0));
        assert!(plan.warnings.contains(&Warning::Infeasible { violation }));
    }

    #[test]
    fn test_start_solution_length() {
        let problem = household_problem();
        let result = optimize(&problem, &search_config(1), Some(&fixtures::start_solution(99)));
        assert!(matches!(
            result,
            Err(ConfigError::StartSolutionLength { expected: 48, actual: 99 })
        ));
    }

    #[test]
    fn test_simulate() {
        let problem = household_problem();
        let simulation = simulate(&problem, &fixtures::start_solution(48)).unwrap();
        assert_eq!(simulation.steps.len(), 24);
        assert!(simulate(&problem, &fixtures::start_solution(47)).is_err());
    }
}
