use std::ops::Range;

use bon::bon;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        appliance::ApplianceParameters,
        battery::{BatteryParameters, BatteryState},
        ev::{EvParameters, EvState},
        genome::Layout,
    },
    error::ConfigError,
    forecast::Forecast,
    quantity::{percent::Percent, price::WattHourPrice},
};

/// Forecast length and the optimization window within it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    /// Length of every forecast series.
    pub prediction_hours: usize,

    /// Number of hours to make decisions for.
    pub optimization_hours: usize,

    /// Forecast hour of the first decision.
    #[serde(default)]
    pub start_hour: usize,
}

impl Horizon {
    pub const fn end_hour(&self) -> usize {
        self.start_hour + self.optimization_hours
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.optimization_hours == 0 {
            return Err(ConfigError::NonPositive { field: "horizon.optimization_hours", value: 0.0 });
        }
        if self.end_hour() > self.prediction_hours {
            return Err(ConfigError::WindowOutOfRange {
                start_hour: self.start_hour,
                end_hour: self.end_hour(),
                prediction_hours: self.prediction_hours,
            });
        }
        Ok(())
    }

    /// Forecast hours of the optimization window.
    pub const fn window(&self) -> Range<usize> {
        self.start_hour..self.end_hour()
    }
}

/// Electric vehicle together with its charge at the start of the window.
#[derive(Clone, Debug)]
pub struct Ev {
    pub parameters: EvParameters,
    pub initial_state: EvState,
}

/// Validated, immutable optimization inputs.
#[derive(Clone, Debug)]
pub struct Problem {
    pub horizon: Horizon,
    pub forecast: Forecast,
    pub battery: BatteryParameters,
    pub initial_battery_state: BatteryState,
    pub ev: Option<Ev>,
    pub appliance: Option<ApplianceParameters>,
    pub feed_in_tariff: WattHourPrice,

    /// Cost of one violating watt-hour.
    pub penalty_factor: WattHourPrice,

    pub layout: Layout,
}

#[bon]
impl Problem {
    #[builder]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        horizon: Horizon,
        forecast: Forecast,
        battery: BatteryParameters,
        initial_battery_soc: Percent,
        ev: Option<EvParameters>,
        initial_ev_soc: Option<Percent>,
        appliance: Option<ApplianceParameters>,
        #[builder(default)] feed_in_tariff: WattHourPrice,
        #[builder(default = WattHourPrice(10.0))] penalty_factor: WattHourPrice,
    ) -> Result<Self, ConfigError> {
        horizon.validate()?;
        forecast.validate(horizon.prediction_hours)?;
        battery.validate()?;
        ConfigError::ensure_within("battery.initial_soc", initial_battery_soc.0, 0.0, 100.0)?;
        let ev = match ev {
            Some(parameters) => {
                parameters.validate()?;
                let initial_soc = initial_ev_soc.unwrap_or_default();
                ConfigError::ensure_within("ev.initial_soc", initial_soc.0, 0.0, 100.0)?;
                let initial_state = EvState { residual_energy: initial_soc.of(parameters.capacity) };
                Some(Ev { parameters, initial_state })
            }
            None => None,
        };
        if let Some(appliance) = &appliance {
            appliance.validate(horizon.optimization_hours)?;
        }
        ConfigError::ensure_within("grid.feed_in_tariff", feed_in_tariff.0, 0.0, f64::MAX)?;
        ConfigError::ensure_positive("penalty_factor", penalty_factor.0)?;

        let layout = Layout::try_new(
            horizon.optimization_hours,
            battery.actions.clone(),
            ev.as_ref().map(|ev| ev.parameters.charge_rates.clone()),
            appliance.as_ref().map(|appliance| {
                // Starting later would overrun the window.
                let latest_start = horizon.optimization_hours - appliance.duration_hours;
                appliance.earliest_start..(latest_start.max(appliance.earliest_start) + 1)
            }),
        )?;
        let initial_battery_state =
            BatteryState { residual_energy: initial_battery_soc.of(battery.capacity) };

        Ok(Self {
            horizon,
            forecast,
            battery,
            initial_battery_state,
            ev,
            appliance,
            feed_in_tariff,
            penalty_factor,
            layout,
        })
    }
}
