//! TOML configuration of a single optimization run.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::{
    core::{
        appliance::ApplianceParameters,
        battery::BatteryParameters,
        ev::EvParameters,
        genetic::SearchConfig,
        genome::Candidate,
        problem::{Horizon, Problem},
    },
    error::ConfigError,
    forecast::Forecast,
    prelude::*,
    quantity::{percent::Percent, price::WattHourPrice},
};

#[derive(Deserialize)]
pub struct Config {
    /// Cost of one watt-hour of constraint violation.
    #[serde(default = "default_penalty_factor")]
    pub penalty_factor: WattHourPrice,

    pub horizon: Horizon,

    #[serde(default)]
    pub grid: GridConfig,

    pub battery: BatteryConfig,
    pub ev: Option<EvConfig>,
    pub appliance: Option<ApplianceParameters>,
    pub forecast: Forecast,

    #[serde(default)]
    pub search: SearchConfig,

    /// Known plausible plan to seed the search with.
    pub start_solution: Option<Candidate>,
}

const fn default_penalty_factor() -> WattHourPrice {
    WattHourPrice(10.0)
}

#[derive(Default, Deserialize)]
pub struct GridConfig {
    /// Price paid for exported energy.
    #[serde(default)]
    pub feed_in_tariff: WattHourPrice,
}

#[derive(Deserialize)]
pub struct BatteryConfig {
    pub initial_soc: Percent,

    #[serde(flatten)]
    pub parameters: BatteryParameters,
}

#[derive(Deserialize)]
pub struct EvConfig {
    pub initial_soc: Percent,

    #[serde(flatten)]
    pub parameters: EvParameters,
}

/// Everything a run needs, validated.
pub struct Setup {
    pub problem: Problem,
    pub search: SearchConfig,
    pub start_solution: Option<Candidate>,
}

impl Config {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;
        debug!(prediction_hours = config.horizon.prediction_hours, "loaded");
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Validate the configuration eagerly, before any search begins.
    pub fn try_into_setup(self) -> Result<Setup, ConfigError> {
        let (ev, initial_ev_soc) = match self.ev {
            Some(ev) => (Some(ev.parameters), Some(ev.initial_soc)),
            None => (None, None),
        };
        let problem = Problem::builder()
            .horizon(self.horizon)
            .forecast(self.forecast)
            .battery(self.battery.parameters)
            .initial_battery_soc(self.battery.initial_soc)
            .maybe_ev(ev)
            .maybe_initial_ev_soc(initial_ev_soc)
            .maybe_appliance(self.appliance)
            .feed_in_tariff(self.grid.feed_in_tariff)
            .penalty_factor(self.penalty_factor)
            .build()?;
        self.search.validate()?;
        if let Some(start_solution) = &self.start_solution {
            problem.layout.validate(start_solution)?;
        }
        Ok(Setup { problem, search: self.search, start_solution: self.start_solution })
    }
}
