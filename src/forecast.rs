use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    quantity::{power::Watts, price::WattHourPrice, temperature::Celsius},
};

/// Hourly forecast for the whole prediction horizon.
///
/// Hour 0 of every series is the start of the forecast. The bundle is immutable once validated.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Forecast {
    /// Solar production.
    pub pv: Vec<Watts>,

    /// Informational only, not used by the asset models.
    #[serde(default)]
    pub temperature: Vec<Celsius>,

    /// Grid import price.
    pub price: Vec<WattHourPrice>,

    /// Household base load.
    pub load: Vec<Watts>,

    /// Measured solar production, replaces the forecast of the first optimized hour.
    #[serde(default)]
    pub pv_now: Option<Watts>,
}

/// Forecast values of a single hour.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ForecastHour {
    pub pv: Watts,
    pub temperature: Option<Celsius>,
    pub price: WattHourPrice,
    pub load: Watts,
}

impl Forecast {
    /// Check that all the series cover exactly the prediction horizon and contain finite values.
    ///
    /// The temperature series may be left empty since it is informational.
    pub fn validate(&self, prediction_hours: usize) -> Result<(), ConfigError> {
        Self::validate_series("pv", &self.pv, prediction_hours, Watts::is_finite)?;
        Self::validate_series("price", &self.price, prediction_hours, WattHourPrice::is_finite)?;
        Self::validate_series("load", &self.load, prediction_hours, Watts::is_finite)?;
        if let Some(pv_now) = self.pv_now
            && !(pv_now.is_finite() && pv_now >= Watts::ZERO)
        {
            return Err(ConfigError::OutOfRange {
                field: "forecast.pv_now",
                value: pv_now.0,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if !self.temperature.is_empty() {
            Self::validate_series(
                "temperature",
                &self.temperature,
                prediction_hours,
                Celsius::is_finite,
            )?;
        }
        Ok(())
    }

    fn validate_series<T: Copy>(
        series: &'static str,
        values: &[T],
        expected: usize,
        is_finite: fn(T) -> bool,
    ) -> Result<(), ConfigError> {
        if values.len() != expected {
            return Err(ConfigError::SeriesLength { series, expected, actual: values.len() });
        }
        match values.iter().position(|value| !is_finite(*value)) {
            Some(hour) => Err(ConfigError::NonFinite { series, hour }),
            None => Ok(()),
        }
    }

    pub const fn len(&self) -> usize {
        self.price.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.price.is_empty()
    }

    /// Values at the specified forecast hour.
    ///
    /// # Panics
    ///
    /// Panics if the hour is outside the validated horizon.
    pub fn hour(&self, hour: usize) -> ForecastHour {
        ForecastHour {
            pv: self.pv[hour],
            temperature: self.temperature.get(hour).copied(),
            price: self.price[hour],
            load: self.load[hour],
        }
    }

    /// Iterate over the hours of the specified window together with their absolute indices.
    ///
    /// The first hour uses the measured solar production when there is one.
    pub fn window(&self, hours: Range<usize>) -> impl Iterator<Item = (usize, ForecastHour)> + '_ {
        let first_hour = hours.start;
        hours.map(move |hour| {
            let mut values = self.hour(hour);
            if hour == first_hour
                && let Some(pv_now) = self.pv_now
            {
                values.pv = pv_now;
            }
            (hour, values)
        })
    }
}
