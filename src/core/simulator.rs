use serde::Serialize;

use crate::{
    core::{
        genome::{Candidate, Decisions},
        problem::Problem,
        step::Step,
        summary::Summary,
    },
    quantity::{energy::WattHours, time::Hours},
};

/// Simulated trajectory and its summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Simulation {
    pub steps: Vec<Step>,
    pub summary: Summary,
}

/// Replays decisions hour by hour through the asset models.
///
/// Holds no mutable state, so a single instance can be shared across threads.
#[derive(Copy, Clone, derive_more::Constructor)]
pub struct Simulator<'a> {
    problem: &'a Problem,
}

impl Simulator<'_> {
    pub fn simulate(&self, candidate: &Candidate) -> Simulation {
        self.run(&self.problem.layout.decode(candidate))
    }

    /// Single forward pass over the optimization window.
    pub fn run(&self, decisions: &Decisions) -> Simulation {
        let problem = self.problem;
        let mut battery_state = problem.initial_battery_state;
        let mut ev_state = problem.ev.as_ref().map(|ev| ev.initial_state);
        let mut appliance_state =
            problem.appliance.as_ref().map(|appliance| appliance.initial_state());

        let mut summary = Summary::default();
        let mut steps = Vec::with_capacity(problem.horizon.optimization_hours);

        for (offset, ((hour, forecast), decision)) in
            problem.forecast.window(problem.horizon.window()).zip(&decisions.hours).enumerate()
        {
            let pv = forecast.pv * Hours::ONE;
            let load = forecast.load * Hours::ONE;
            let mut violation = WattHours::ZERO;
            let mut overrun = WattHours::ZERO;
            let mut losses = WattHours::ZERO;

            let appliance_consumption = match (&problem.appliance, decisions.appliance_start) {
                (Some(appliance), Some(start)) => {
                    let state = appliance_state.unwrap_or_else(|| appliance.initial_state());
                    let (drawn, next_state) = appliance.transition(state, start, offset);
                    appliance_state = Some(next_state);
                    drawn
                }
                _ => WattHours::ZERO,
            };

            let ev_charge = match (&problem.ev, ev_state) {
                (Some(ev), Some(state)) => {
                    let transition = ev.parameters.transition(state, decision.ev_charge_rate);
                    ev_state = Some(transition.state);
                    violation += transition.violation;
                    overrun += transition.overrun;
                    losses += transition.losses;
                    transition.drawn
                }
                _ => WattHours::ZERO,
            };

            // Positive is excess, negative is deficit:
            let balance = pv - load - appliance_consumption - ev_charge;

            let battery = problem.battery.transition(battery_state, decision.battery, balance);
            violation += battery.violation;
            overrun += battery.overrun;
            losses += battery.losses;

            let grid_import = (-balance).max(WattHours::ZERO) - battery.flow.discharged_to_load
                + battery.flow.charged_from_grid;
            let grid_export = balance.max(WattHours::ZERO) - battery.flow.charged_from_pv
                + battery.flow.discharged_to_grid;

            let import_cost = grid_import * forecast.price;
            let export_revenue = grid_export * problem.feed_in_tariff;
            let wear_cost = battery.throughput * problem.battery.wear_cost;

            summary.import_cost += import_cost;
            summary.export_revenue += export_revenue;
            summary.wear_cost += wear_cost;
            summary.baseline_cost += (-balance).max(WattHours::ZERO) * forecast.price
                - balance.max(WattHours::ZERO) * problem.feed_in_tariff;
            summary.grid_import += grid_import;
            summary.grid_export += grid_export;
            summary.losses += losses;
            summary.violation += violation;

            steps.push(Step {
                hour,
                price: forecast.price,
                pv,
                load,
                battery_action: decision.battery,
                battery_flow: battery.flow,
                battery_soc_before: battery_state.soc(&problem.battery),
                battery_soc_after: battery.state.soc(&problem.battery),
                ev_charge_rate: decision.ev_charge_rate,
                ev_charge,
                ev_soc_after: problem
                    .ev
                    .as_ref()
                    .zip(ev_state)
                    .map(|(ev, state)| state.soc(&ev.parameters)),
                appliance_consumption,
                appliance_remaining: appliance_state
                    .map_or(WattHours::ZERO, |state| state.remaining),
                grid_import,
                grid_export,
                losses,
                cost: import_cost - export_revenue + wear_cost,
                overrun,
                violation,
            });
            battery_state = battery.state;
        }

        // End-of-window requirements:
        if let Some(state) = appliance_state {
            summary.violation += state.remaining;
        }
        if let (Some(ev), Some(state)) = (&problem.ev, ev_state) {
            summary.violation += ev.parameters.target_shortfall(state);
        }
        // Relative to the initial charge, which the baseline keeps as well:
        summary.residual_value = (battery_state.residual_energy
            - problem.initial_battery_state.residual_energy)
            * problem.battery.residual_value;

        Simulation { steps, summary }
    }
}
