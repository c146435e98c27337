use thiserror::Error;

/// Rejected configuration.
///
/// Detected eagerly before any search starts: a problem which passes validation never fails later,
/// constraint breaches during the simulation are penalised instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("forecast series `{series}` has {actual} values, expected {expected}")]
    SeriesLength { series: &'static str, expected: usize, actual: usize },

    #[error("forecast series `{series}` has a non-finite value at hour {hour}")]
    NonFinite { series: &'static str, hour: usize },

    #[error(
        "optimization window {start_hour}..{end_hour} does not fit into the {prediction_hours}-hour forecast"
    )]
    WindowOutOfRange { start_hour: usize, end_hour: usize, prediction_hours: usize },

    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("`{field}` must be within {min}..={max}, got {value}")]
    OutOfRange { field: &'static str, value: f64, min: f64, max: f64 },

    #[error(
        "appliance runs for {duration_hours} hours which is longer than the {optimization_hours}-hour optimization window"
    )]
    ApplianceTooLong { duration_hours: usize, optimization_hours: usize },

    #[error(
        "appliance earliest start {earliest_start} is outside the {optimization_hours}-hour optimization window"
    )]
    ApplianceStartOutOfRange { earliest_start: usize, optimization_hours: usize },

    #[error("`{field}` must contain at least one option")]
    EmptyAlphabet { field: &'static str },

    #[error("start solution has {actual} symbols, expected {expected}")]
    StartSolutionLength { expected: usize, actual: usize },

    #[error("invalid search parameter `{field}`: {reason}")]
    Search { field: &'static str, reason: &'static str },

    #[error("failed to build the worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl ConfigError {
    pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<(), Self> {
        if value > 0.0 && value.is_finite() { Ok(()) } else { Err(Self::NonPositive { field, value }) }
    }

    pub(crate) fn ensure_within(
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), Self> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(Self::OutOfRange { field, value, min, max })
        }
    }
}
