use bon::Builder;
use enumset::EnumSet;
use serde::{Deserialize, Serialize};

use crate::{
    core::working_mode::BatteryAction,
    error::ConfigError,
    quantity::{
        energy::WattHours,
        percent::Percent,
        power::Watts,
        price::WattHourPrice,
        time::Hours,
    },
};

/// Static battery parameters.
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
pub struct BatteryParameters {
    pub capacity: WattHours,

    /// Minimally allowed state of charge.
    #[serde(default)]
    #[builder(default)]
    pub min_soc: Percent,

    /// Maximally allowed state of charge.
    #[serde(default = "default_max_soc")]
    #[builder(default = Percent::HUNDRED)]
    pub max_soc: Percent,

    #[serde(default = "default_efficiency")]
    #[builder(default = default_efficiency())]
    pub charging_efficiency: f64,

    #[serde(default = "default_efficiency")]
    #[builder(default = default_efficiency())]
    pub discharging_efficiency: f64,

    /// Defaults to the full capacity per hour.
    pub max_charging_power: Option<Watts>,

    /// Defaults to the full capacity per hour.
    pub max_discharging_power: Option<Watts>,

    /// Self-discharge, drained every hour regardless of the action.
    #[serde(default)]
    #[builder(default)]
    pub parasitic_load: Watts,

    /// Wear cost per watt-hour stored into or released from the cells.
    #[serde(default)]
    #[builder(default)]
    pub wear_cost: WattHourPrice,

    /// Value of a watt-hour left in the battery at the end of the window.
    #[serde(default)]
    #[builder(default)]
    pub residual_value: WattHourPrice,

    /// Whether a discharging battery may feed energy beyond the household demand into the grid.
    #[serde(default)]
    #[builder(default)]
    pub allow_export: bool,

    /// Actions the optimizer may choose from.
    #[serde(default = "default_actions")]
    #[builder(default = default_actions())]
    pub actions: Vec<BatteryAction>,
}

const fn default_max_soc() -> Percent {
    Percent::HUNDRED
}

const fn default_efficiency() -> f64 {
    0.88
}

fn default_actions() -> Vec<BatteryAction> {
    EnumSet::<BatteryAction>::all().iter().collect()
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct BatteryState {
    pub residual_energy: WattHours,
}

/// Energy flows at the battery terminals during one hour, all non-negative.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct BatteryFlow {
    pub charged_from_pv: WattHours,
    pub charged_from_grid: WattHours,
    pub discharged_to_load: WattHours,
    pub discharged_to_grid: WattHours,
}

impl BatteryFlow {
    pub fn charged(&self) -> WattHours {
        self.charged_from_pv + self.charged_from_grid
    }

    pub fn discharged(&self) -> WattHours {
        self.discharged_to_load + self.discharged_to_grid
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BatteryTransition {
    pub state: BatteryState,
    pub flow: BatteryFlow,

    /// Energy which went into or out of the cells.
    pub throughput: WattHours,

    /// Conversion losses.
    pub losses: WattHours,

    /// Requested grid charging or load discharging which the state of charge window cut off.
    pub overrun: WattHours,

    /// Overrun plus how far the residual energy ended up outside the allowed window.
    pub violation: WattHours,
}

impl BatteryParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::ensure_positive("battery.capacity", self.capacity.0)?;
        ConfigError::ensure_within("battery.min_soc", self.min_soc.0, 0.0, 100.0)?;
        ConfigError::ensure_within("battery.max_soc", self.max_soc.0, self.min_soc.0, 100.0)?;
        ConfigError::ensure_within(
            "battery.charging_efficiency",
            self.charging_efficiency,
            f64::MIN_POSITIVE,
            1.0,
        )?;
        ConfigError::ensure_within(
            "battery.discharging_efficiency",
            self.discharging_efficiency,
            f64::MIN_POSITIVE,
            1.0,
        )?;
        ConfigError::ensure_positive("battery.max_charging_power", self.max_charging_power().0)?;
        ConfigError::ensure_positive(
            "battery.max_discharging_power",
            self.max_discharging_power().0,
        )?;
        ConfigError::ensure_within(
            "battery.parasitic_load",
            self.parasitic_load.0,
            0.0,
            f64::MAX,
        )?;
        ConfigError::ensure_within("battery.wear_cost", self.wear_cost.0, 0.0, f64::MAX)?;
        ConfigError::ensure_within(
            "battery.residual_value",
            self.residual_value.0,
            0.0,
            f64::MAX,
        )?;
        if self.actions.is_empty() {
            return Err(ConfigError::EmptyAlphabet { field: "battery.actions" });
        }
        Ok(())
    }

    pub fn max_charging_power(&self) -> Watts {
        self.max_charging_power.unwrap_or(self.capacity / Hours::ONE)
    }

    pub fn max_discharging_power(&self) -> Watts {
        self.max_discharging_power.unwrap_or(self.capacity / Hours::ONE)
    }

    pub fn min_residual_energy(&self) -> WattHours {
        self.min_soc.of(self.capacity)
    }

    pub fn max_residual_energy(&self) -> WattHours {
        self.max_soc.of(self.capacity)
    }

    /// Run the battery for one hour.
    ///
    /// `balance` is the household energy balance without the battery: solar production minus
    /// demand, positive is excess. Excess solar energy is always stored first (up to the power and
    /// capacity limits). Discharging covers the deficit and, when export is allowed and nothing is
    /// charged from solar, feeds the rest of the discharging power into the grid.
    ///
    /// Grid charging asks for the full charging power, discharging asks for the deficit up to the
    /// discharging power. Whatever the state of charge window cuts off is the overrun.
    #[must_use]
    pub fn transition(
        &self,
        state: BatteryState,
        action: BatteryAction,
        balance: WattHours,
    ) -> BatteryTransition {
        let initial_residual_energy = state.residual_energy;
        let min_residual_energy = self.min_residual_energy();
        let max_residual_energy = self.max_residual_energy();
        let charging_limit = self.max_charging_power() * Hours::ONE;
        let discharging_limit = self.max_discharging_power() * Hours::ONE;

        // External energy which the cells can still absorb or deliver:
        let mut headroom = (max_residual_energy - initial_residual_energy).max(WattHours::ZERO)
            / self.charging_efficiency;
        let mut available = (initial_residual_energy - min_residual_energy).max(WattHours::ZERO)
            * self.discharging_efficiency;

        let mut flow = BatteryFlow::default();
        let mut overrun = WattHours::ZERO;
        if balance > WattHours::ZERO {
            flow.charged_from_pv = balance.min(charging_limit).min(headroom);
            headroom -= flow.charged_from_pv;
        }
        if action.is_grid_charge_enabled() {
            let requested = (charging_limit - flow.charged_from_pv).max(WattHours::ZERO);
            flow.charged_from_grid = requested.min(headroom).max(WattHours::ZERO);
            overrun += requested - flow.charged_from_grid;
        }
        if action.is_discharge_enabled() {
            let requested = (-balance).max(WattHours::ZERO).min(discharging_limit);
            flow.discharged_to_load = requested.min(available).max(WattHours::ZERO);
            overrun += requested - flow.discharged_to_load;
            available -= flow.discharged_to_load;
            if self.allow_export && flow.charged_from_pv == WattHours::ZERO {
                flow.discharged_to_grid = (discharging_limit - flow.discharged_to_load)
                    .min(available)
                    .max(WattHours::ZERO);
            }
        }

        let stored = flow.charged() * self.charging_efficiency;
        let released = flow.discharged() / self.discharging_efficiency;

        // The flows above respect the window, clamping only absorbs the rounding errors:
        let residual_energy = (initial_residual_energy + stored - released).clamp(
            min_residual_energy.min(initial_residual_energy),
            max_residual_energy.max(initial_residual_energy),
        );

        // Parasitic load may drain to the ground:
        let residual_energy = (residual_energy - self.parasitic_load * Hours::ONE)
            .max(WattHours::ZERO)
            .min(self.capacity);

        BatteryTransition {
            state: BatteryState { residual_energy },
            flow,
            throughput: stored + released,
            losses: (flow.charged() - stored) + (released - flow.discharged()),
            overrun,
            violation: overrun
                + (min_residual_energy - residual_energy).max(WattHours::ZERO)
                + (residual_energy - max_residual_energy).max(WattHours::ZERO),
        }
    }
}

impl BatteryState {
    pub fn soc(self, parameters: &BatteryParameters) -> Percent {
        self.residual_energy.percent_of(parameters.capacity)
    }
}
