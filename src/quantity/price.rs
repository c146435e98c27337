quantity!(
    /// Energy price or tariff per watt-hour.
    WattHourPrice,
    "€/Wh",
    7
);
