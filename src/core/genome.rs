use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{core::working_mode::BatteryAction, error::ConfigError};

/// Encoded control plan: a fixed-length sequence of decision symbols.
///
/// Never mutated after evaluation, hence usable as a cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::From)]
#[serde(transparent)]
pub struct Candidate(Vec<u32>);

impl Candidate {
    pub fn symbols(&self) -> &[u32] {
        &self.0
    }

    pub(crate) fn symbols_mut(&mut self) -> &mut [u32] {
        &mut self.0
    }

    pub const fn len(&self) -> usize {
        self.0.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decisions of a single hour.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct HourDecision {
    pub battery: BatteryAction,

    /// Fraction of the maximum EV charging power, zero without an EV.
    pub ev_charge_rate: f64,
}

/// Fully decoded candidate.
#[derive(Clone, Debug, PartialEq)]
pub struct Decisions {
    pub hours: Vec<HourDecision>,

    /// Appliance start relative to the optimization window.
    pub appliance_start: Option<usize>,
}

/// Genome layout: which segment encodes what and how many symbols each position admits.
///
/// Positions `0..n_hours` are the battery actions, then `n_hours` EV charge rate indices if there is
/// an EV, then a single appliance start offset if there is an appliance.
#[derive(Clone, Debug)]
pub struct Layout {
    n_hours: usize,
    battery_actions: Vec<BatteryAction>,
    ev_charge_rates: Option<Vec<f64>>,
    appliance_starts: Option<Range<usize>>,
}

impl Layout {
    pub fn try_new(
        n_hours: usize,
        battery_actions: Vec<BatteryAction>,
        ev_charge_rates: Option<Vec<f64>>,
        appliance_starts: Option<Range<usize>>,
    ) -> Result<Self, ConfigError> {
        if battery_actions.is_empty() {
            return Err(ConfigError::EmptyAlphabet { field: "battery.actions" });
        }
        if ev_charge_rates.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigError::EmptyAlphabet { field: "ev.charge_rates" });
        }
        if appliance_starts.as_ref().is_some_and(Range::is_empty) {
            return Err(ConfigError::EmptyAlphabet { field: "appliance.earliest_start" });
        }
        Ok(Self { n_hours, battery_actions, ev_charge_rates, appliance_starts })
    }

    pub const fn n_hours(&self) -> usize {
        self.n_hours
    }

    /// Genome length.
    pub const fn len(&self) -> usize {
        let ev_len = if self.ev_charge_rates.is_some() { self.n_hours } else { 0 };
        let appliance_len = if self.appliance_starts.is_some() { 1 } else { 0 };
        self.n_hours + ev_len + appliance_len
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct symbols at the position.
    pub fn alphabet_size(&self, index: usize) -> u32 {
        let size = if index < self.n_hours {
            self.battery_actions.len()
        } else if let Some(rates) = self.ev_charge_rates.as_ref()
            && index < 2 * self.n_hours
        {
            rates.len()
        } else {
            self.appliance_starts.as_ref().map_or(1, |starts| starts.len())
        };
        u32::try_from(size).unwrap_or(u32::MAX)
    }

    /// Check the length of an externally supplied candidate.
    pub fn validate(&self, candidate: &Candidate) -> Result<(), ConfigError> {
        if candidate.len() == self.len() {
            Ok(())
        } else {
            Err(ConfigError::StartSolutionLength { expected: self.len(), actual: candidate.len() })
        }
    }

    /// Draw a uniformly random candidate.
    pub fn random(&self, rng: &mut fastrand::Rng) -> Candidate {
        Candidate((0..self.len()).map(|index| rng.u32(0..self.alphabet_size(index))).collect())
    }

    /// Decode the candidate into decisions.
    ///
    /// Total: symbols are reduced modulo the alphabet size, and missing symbols read as zero.
    pub fn decode(&self, candidate: &Candidate) -> Decisions {
        let symbol = |index: usize| {
            let symbol = candidate.symbols().get(index).copied().unwrap_or_default();
            (symbol % self.alphabet_size(index)) as usize
        };
        let hours = (0..self.n_hours)
            .map(|hour| HourDecision {
                battery: self.battery_actions[symbol(hour)],
                ev_charge_rate: self
                    .ev_charge_rates
                    .as_ref()
                    .map_or(0.0, |rates| rates[symbol(self.n_hours + hour)]),
            })
            .collect();
        let appliance_start =
            self.appliance_starts.as_ref().map(|starts| starts.start + symbol(self.len() - 1));
        Decisions { hours, appliance_start }
    }
}
