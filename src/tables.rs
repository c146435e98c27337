use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{plan::Plan, step::Step, summary::Summary},
    quantity::{cost::Cost, energy::WattHours, price::WattHourPrice},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

#[must_use]
pub fn build_steps_table(steps: &[Step]) -> Table {
    let mean_price = if steps.is_empty() {
        WattHourPrice::ZERO
    } else {
        WattHourPrice(steps.iter().map(|step| step.price.0).sum::<f64>() / steps.len() as f64)
    };

    let mut table = new_table();
    table.set_header(vec![
        "Hour", "Price", "PV", "Load", "Mode", "Before", "After", "EV", "Appliance", "Import",
        "Export", "Cost",
    ]);
    for step in steps {
        table.add_row(vec![
            Cell::new(step.hour).add_attribute(Attribute::Dim),
            Cell::new(step.price).fg(if step.price >= mean_price {
                Color::Red
            } else {
                Color::Green
            }),
            Cell::new(step.pv).set_alignment(CellAlignment::Right),
            Cell::new(step.load).set_alignment(CellAlignment::Right),
            Cell::new(step.battery_action).fg(step.battery_action.color()),
            Cell::new(step.battery_soc_before)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(step.battery_soc_after).set_alignment(CellAlignment::Right),
            Cell::new(step.ev_soc_after.map_or_else(String::new, |soc| soc.to_string()))
                .set_alignment(CellAlignment::Right)
                .fg(if step.ev_charge > WattHours::ZERO { Color::Green } else { Color::Reset }),
            Cell::new(step.appliance_consumption)
                .set_alignment(CellAlignment::Right)
                .fg(if step.appliance_consumption > WattHours::ZERO {
                    Color::DarkYellow
                } else {
                    Color::Reset
                }),
            Cell::new(step.grid_import).set_alignment(CellAlignment::Right),
            Cell::new(step.grid_export).set_alignment(CellAlignment::Right),
            Cell::new(step.cost).set_alignment(CellAlignment::Right).fg(
                if step.violation > WattHours::ZERO {
                    Color::Magenta
                } else if step.cost > Cost::ZERO {
                    Color::Red
                } else {
                    Color::Green
                },
            ),
        ]);
    }
    table
}

#[must_use]
pub fn build_summary_table(summary: &Summary) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Import", "Export", "Wear", "Residual", "Net", "Baseline", "Saving", "Violation",
    ]);
    table.add_row(vec![
        Cell::new(summary.import_cost).set_alignment(CellAlignment::Right),
        Cell::new(summary.export_revenue).set_alignment(CellAlignment::Right),
        Cell::new(summary.wear_cost).set_alignment(CellAlignment::Right),
        Cell::new(summary.residual_value).set_alignment(CellAlignment::Right),
        Cell::new(summary.net_cost()).set_alignment(CellAlignment::Right),
        Cell::new(summary.baseline_cost).set_alignment(CellAlignment::Right),
        Cell::new(summary.saving()).set_alignment(CellAlignment::Right).fg(
            if summary.saving() > Cost::ZERO { Color::Green } else { Color::Red },
        ),
        Cell::new(summary.violation).set_alignment(CellAlignment::Right).fg(
            if summary.violation > WattHours::ZERO { Color::Red } else { Color::Green },
        ),
    ]);
    table
}

#[must_use]
pub fn build_statistics_table(plan: &Plan) -> Table {
    let statistics = &plan.statistics;
    let mut table = new_table();
    table.set_header(vec!["Generations", "Evaluations", "Cache hits", "Termination", "Start"]);
    table.add_row(vec![
        Cell::new(statistics.n_generations),
        Cell::new(statistics.n_evaluations),
        Cell::new(statistics.n_cache_hits),
        Cell::new(statistics.termination),
        Cell::new(
            plan.appliance_start_hour.map_or_else(|| "-".to_string(), |hour| hour.to_string()),
        ),
    ]);
    table
}
