use serde::Serialize;

use crate::quantity::{cost::Cost, energy::WattHours};

/// Aggregated simulation results, also the cost breakdown of a plan.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub import_cost: Cost,
    pub export_revenue: Cost,
    pub wear_cost: Cost,

    /// Value of the energy left in the battery by the end of the window.
    pub residual_value: Cost,

    /// Net cost of the same demand without the battery.
    pub baseline_cost: Cost,

    pub grid_import: WattHours,
    pub grid_export: WattHours,
    pub losses: WattHours,

    /// Total constraint violation, zero for a feasible plan.
    pub violation: WattHours,
}

impl Summary {
    pub fn net_cost(&self) -> Cost {
        self.import_cost - self.export_revenue + self.wear_cost - self.residual_value
    }

    pub fn saving(&self) -> Cost {
        // Expected to be positive, otherwise the battery only makes things worse.
        self.baseline_cost - self.net_cost()
    }
}
