use crate::quantity::{energy::WattHours, time::Hours};

quantity!(Watts, "W", 0);

implement_mul!(Watts, Hours, WattHours);
