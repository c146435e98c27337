use serde::Serialize;

use crate::{
    core::{battery::BatteryFlow, working_mode::BatteryAction},
    quantity::{
        cost::Cost,
        energy::WattHours,
        percent::Percent,
        price::WattHourPrice,
    },
};

/// Simulated hour of the trajectory.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Step {
    /// Forecast hour.
    pub hour: usize,

    pub price: WattHourPrice,
    pub pv: WattHours,

    /// Household base load, without the EV and the appliance.
    pub load: WattHours,

    pub battery_action: BatteryAction,
    pub battery_flow: BatteryFlow,
    pub battery_soc_before: Percent,
    pub battery_soc_after: Percent,

    pub ev_charge_rate: f64,
    pub ev_charge: WattHours,
    pub ev_soc_after: Option<Percent>,

    pub appliance_consumption: WattHours,
    pub appliance_remaining: WattHours,

    pub grid_import: WattHours,
    pub grid_export: WattHours,

    /// Battery and EV conversion losses.
    pub losses: WattHours,

    /// Import cost minus export revenue plus the battery wear.
    pub cost: Cost,

    /// Battery and EV requests which did not fit into the state of charge window.
    pub overrun: WattHours,

    /// Overrun plus the state of charge breaches.
    pub violation: WattHours,
}
