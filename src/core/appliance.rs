use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, quantity::energy::WattHours};

/// Deferrable appliance which must run once for a fixed number of consecutive hours.
#[derive(Clone, Debug, Serialize, Deserialize, bon::Builder)]
pub struct ApplianceParameters {
    /// Total energy of one run.
    pub energy: WattHours,

    pub duration_hours: usize,

    /// Earliest start, relative to the optimization window.
    #[serde(default)]
    #[builder(default)]
    pub earliest_start: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ApplianceState {
    /// Energy which the run still needs.
    pub remaining: WattHours,
}

impl ApplianceParameters {
    pub fn validate(&self, optimization_hours: usize) -> Result<(), ConfigError> {
        ConfigError::ensure_positive("appliance.energy", self.energy.0)?;
        if self.duration_hours == 0 {
            return Err(ConfigError::NonPositive { field: "appliance.duration_hours", value: 0.0 });
        }
        if self.duration_hours > optimization_hours {
            return Err(ConfigError::ApplianceTooLong {
                duration_hours: self.duration_hours,
                optimization_hours,
            });
        }
        if self.earliest_start >= optimization_hours {
            return Err(ConfigError::ApplianceStartOutOfRange {
                earliest_start: self.earliest_start,
                optimization_hours,
            });
        }
        Ok(())
    }

    pub const fn initial_state(&self) -> ApplianceState {
        ApplianceState { remaining: self.energy }
    }

    /// Energy drawn per running hour.
    pub fn hourly_energy(&self) -> WattHours {
        self.energy / self.duration_hours as f64
    }

    /// Run for the window-relative `hour`, given the chosen window-relative `start`.
    ///
    /// Returns the energy drawn during the hour together with the next state.
    #[must_use]
    pub fn transition(
        &self,
        state: ApplianceState,
        start: usize,
        hour: usize,
    ) -> (WattHours, ApplianceState) {
        let end = start + self.duration_hours;
        let drawn = if !(start..end).contains(&hour) {
            WattHours::ZERO
        } else if hour + 1 == end {
            state.remaining
        } else {
            self.hourly_energy().min(state.remaining)
        };
        (drawn, ApplianceState { remaining: state.remaining - drawn })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn parameters() -> ApplianceParameters {
        ApplianceParameters::builder().energy(WattHours(937.0)).duration_hours(3).build()
    }

    #[test]
    fn test_full_run() {
        let parameters = parameters();
        let mut state = parameters.initial_state();
        let mut drawn = Vec::new();
        for hour in 0..6 {
            let (energy, next_state) = parameters.transition(state, 2, hour);
            drawn.push(energy.0);
            state = next_state;
        }
        assert_eq!(drawn[0], 0.0);
        assert_eq!(drawn[1], 0.0);
        assert_abs_diff_eq!(drawn[2], 937.0 / 3.0);
        assert_abs_diff_eq!(drawn.iter().sum::<f64>(), 937.0);
        assert_eq!(drawn[5], 0.0);
        assert_eq!(state.remaining, WattHours::ZERO);
    }

    /// Verify that a run cut off by the window end leaves energy behind.
    #[test]
    fn test_overrun() {
        let parameters = parameters();
        let mut state = parameters.initial_state();
        for hour in 0..4 {
            state = parameters.transition(state, 2, hour).1;
        }
        assert_abs_diff_eq!(state.remaining.0, 937.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_validate() {
        assert!(parameters().validate(24).is_ok());
        assert!(matches!(
            parameters().validate(2),
            Err(ConfigError::ApplianceTooLong { duration_hours: 3, optimization_hours: 2 })
        ));
        let mut parameters = parameters();
        parameters.earliest_start = 24;
        assert!(matches!(
            parameters.validate(24),
            Err(ConfigError::ApplianceStartOutOfRange { earliest_start: 24, .. })
        ));
    }
}
