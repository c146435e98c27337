use crate::quantity::energy::WattHours;

quantity!(
    /// State-of-charge percentage, normally within `0..=100`.
    Percent,
    "%",
    1
);

impl Percent {
    pub const HUNDRED: Self = Self(100.0);

    /// Energy which corresponds to this share of the capacity.
    pub fn of(self, capacity: WattHours) -> WattHours {
        capacity * (self.0 / 100.0)
    }
}
