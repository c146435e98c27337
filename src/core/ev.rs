use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    quantity::{energy::WattHours, percent::Percent, power::Watts, time::Hours},
};

/// Electric vehicle which only charges while parked at home.
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
pub struct EvParameters {
    pub capacity: WattHours,

    /// Charge which the car must keep at every hour.
    #[serde(default)]
    #[builder(default)]
    pub min_soc: Percent,

    /// Charge which the car must reach by the end of the window.
    pub target_soc: Option<Percent>,

    #[serde(default = "default_charging_efficiency")]
    #[builder(default = default_charging_efficiency())]
    pub charging_efficiency: f64,

    pub max_charging_power: Watts,

    /// Allowed charging rates as fractions of the maximum charging power.
    #[serde(default = "default_charge_rates")]
    #[builder(default = default_charge_rates())]
    pub charge_rates: Vec<f64>,
}

const fn default_charging_efficiency() -> f64 {
    0.95
}

fn default_charge_rates() -> Vec<f64> {
    vec![0.0, 1.0]
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct EvState {
    pub residual_energy: WattHours,
}

impl EvState {
    pub fn soc(self, parameters: &EvParameters) -> Percent {
        self.residual_energy.percent_of(parameters.capacity)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EvTransition {
    pub state: EvState,

    /// Energy drawn from the household bus.
    pub drawn: WattHours,

    pub losses: WattHours,

    /// Requested charge which did not fit into the capacity.
    pub overrun: WattHours,

    /// Overrun plus the shortfall against the minimal charge after the hour.
    pub violation: WattHours,
}

impl EvParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::ensure_positive("ev.capacity", self.capacity.0)?;
        ConfigError::ensure_within("ev.min_soc", self.min_soc.0, 0.0, 100.0)?;
        if let Some(target_soc) = self.target_soc {
            ConfigError::ensure_within("ev.target_soc", target_soc.0, 0.0, 100.0)?;
        }
        ConfigError::ensure_within(
            "ev.charging_efficiency",
            self.charging_efficiency,
            f64::MIN_POSITIVE,
            1.0,
        )?;
        ConfigError::ensure_positive("ev.max_charging_power", self.max_charging_power.0)?;
        if self.charge_rates.is_empty() {
            return Err(ConfigError::EmptyAlphabet { field: "ev.charge_rates" });
        }
        for rate in &self.charge_rates {
            ConfigError::ensure_within("ev.charge_rates", *rate, 0.0, 1.0)?;
        }
        Ok(())
    }

    pub fn min_residual_energy(&self) -> WattHours {
        self.min_soc.of(self.capacity)
    }

    /// Charge at the specified rate for one hour.
    #[must_use]
    pub fn transition(&self, state: EvState, rate: f64) -> EvTransition {
        let requested = self.max_charging_power * Hours::ONE * rate.clamp(0.0, 1.0);
        let headroom =
            (self.capacity - state.residual_energy).max(WattHours::ZERO) / self.charging_efficiency;
        let drawn = requested.min(headroom);
        let stored = drawn * self.charging_efficiency;
        let residual_energy =
            (state.residual_energy + stored).min(self.capacity.max(state.residual_energy));
        EvTransition {
            state: EvState { residual_energy },
            drawn,
            losses: drawn - stored,
            overrun: requested - drawn,
            violation: (requested - drawn)
                + (self.min_residual_energy() - residual_energy).max(WattHours::ZERO),
        }
    }

    /// Shortfall against the target charge at the end of the window.
    pub fn target_shortfall(&self, state: EvState) -> WattHours {
        self.target_soc.map_or(WattHours::ZERO, |target_soc| {
            (target_soc.of(self.capacity) - state.residual_energy).max(WattHours::ZERO)
        })
    }
}
