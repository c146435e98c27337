use std::ops::Div;

use crate::quantity::{percent::Percent, power::Watts, time::Hours};

quantity!(WattHours, "Wh", 0);

impl WattHours {
    /// Share of the specified capacity.
    pub fn percent_of(self, capacity: Self) -> Percent {
        Percent(self.0 / capacity.0 * 100.0)
    }
}

impl Div<Hours> for WattHours {
    type Output = Watts;

    fn div(self, hours: Hours) -> Self::Output {
        Watts(self.0 / hours.0)
    }
}
