use crate::quantity::{energy::WattHours, price::WattHourPrice};

quantity!(Cost, "€", 4);

implement_mul!(WattHourPrice, WattHours, Cost);
