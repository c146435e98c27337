use std::fmt::{Display, Formatter};

use comfy_table::Color;
use serde::{Deserialize, Serialize};

/// Battery decision for a single hour.
///
/// Charging from the grid and discharging are mutually exclusive by construction.
#[derive(Debug, Hash, Serialize, Deserialize, enumset::EnumSetType)]
#[serde(rename_all = "kebab-case")]
pub enum BatteryAction {
    /// Only excess solar power charging without discharging.
    Hold,

    /// Charge on excess solar power, compensate on insufficient solar power.
    Discharge,

    /// Charge at full power: excess solar power first, then from the grid.
    GridCharge,
}

impl Display for BatteryAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hold => write!(f, "Hold"),
            Self::Discharge => write!(f, "Discharge"),
            Self::GridCharge => write!(f, "Grid charge"),
        }
    }
}

impl BatteryAction {
    pub const fn color(self) -> Color {
        match self {
            Self::GridCharge => Color::Green,
            Self::Discharge => Color::Blue,
            Self::Hold => Color::Reset,
        }
    }

    pub const fn is_discharge_enabled(self) -> bool {
        matches!(self, Self::Discharge)
    }

    pub const fn is_grid_charge_enabled(self) -> bool {
        matches!(self, Self::GridCharge)
    }
}
