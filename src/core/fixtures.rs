//! Two-day household forecast shared by the end-to-end tests.

use crate::{
    core::{battery::BatteryParameters, ev::EvParameters, genome::Candidate, problem::Horizon},
    forecast::Forecast,
    quantity::{
        energy::WattHours,
        power::Watts,
        price::WattHourPrice,
        temperature::Celsius,
    },
};

const PV: [f64; 48] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 8.05, 352.91, 728.51, 930.28, 1043.25, 1106.74, 1161.69,
    6018.82, 5519.07, 3969.88, 3017.96, 1943.07, 1007.17, 319.67, 7.88, 0.0, 0.0, 0.0, 0.0, 0.0,
    0.0, 0.0, 0.0, 0.0, 5.04, 335.59, 705.32, 1121.12, 1604.79, 2157.38, 1433.25, 5718.49,
    4553.96, 3027.55, 2574.46, 1720.4, 963.4, 383.3, 0.0, 0.0, 0.0,
];

const TEMPERATURE: [f64; 48] = [
    18.3, 17.8, 16.9, 16.2, 15.6, 15.1, 14.6, 14.2, 14.3, 14.8, 15.7, 16.7, 17.4, 18.0, 18.6,
    19.2, 19.1, 18.7, 18.5, 17.7, 16.2, 14.6, 13.6, 13.0, 12.6, 12.2, 11.7, 11.6, 11.3, 11.0,
    10.7, 10.2, 11.4, 14.4, 16.4, 18.3, 19.5, 20.7, 21.9, 22.7, 23.1, 23.1, 22.8, 21.8, 20.2,
    19.1, 18.0, 17.4,
];

const PRICE: [f64; 24] = [
    0.0003384, 0.0003318, 0.0003284, 0.0003283, 0.0003289, 0.0003334, 0.0003290, 0.0003302,
    0.0003042, 0.0002430, 0.0002280, 0.0002212, 0.0002093, 0.0001879, 0.0001838, 0.0002004,
    0.0002198, 0.0002270, 0.0002997, 0.0003195, 0.0003081, 0.0002969, 0.0002921, 0.0002780,
];

const LOAD: [f64; 48] = [
    676.71, 876.19, 527.13, 468.88, 531.38, 517.95, 483.15, 472.28, 1011.68, 995.00, 1053.07,
    1063.91, 1320.56, 1132.03, 1163.67, 1176.82, 1216.22, 1103.78, 1129.12, 1178.71, 1050.98,
    988.56, 912.38, 704.61, 516.37, 868.05, 694.34, 608.79, 556.31, 488.89, 506.91, 804.89,
    1141.98, 1056.97, 992.46, 1155.99, 827.01, 1257.98, 1232.67, 871.26, 860.88, 1158.03,
    1222.72, 1221.04, 949.99, 987.01, 733.99, 592.97,
];

/// Binary plan prepared by hand for the 24-hour window.
const START_SOLUTION: [u32; 99] = [
    1, 1, 1, 1, 0, 1, 0, 0, 1, 1, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 0, 0, 0,
    0, 1, 0, 0, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1,
];

pub const HORIZON: Horizon = Horizon { prediction_hours: 48, optimization_hours: 24, start_hour: 10 };

pub fn forecast() -> Forecast {
    Forecast {
        pv: PV.into_iter().map(Watts).collect(),
        temperature: TEMPERATURE.into_iter().map(Celsius).collect(),
        pv_now: None,
        // The day-ahead prices repeat for the second day:
        price: PRICE.into_iter().chain(PRICE).map(WattHourPrice).collect(),
        load: LOAD.into_iter().map(Watts).collect(),
    }
}

pub fn battery() -> BatteryParameters {
    BatteryParameters::builder()
        .capacity(WattHours(26400.0))
        .wear_cost(WattHourPrice(0.0001))
        .build()
}

pub fn ev() -> EvParameters {
    EvParameters::builder()
        .capacity(WattHours(60000.0))
        .charging_efficiency(0.95)
        .max_charging_power(Watts(11040.0))
        .build()
}

pub const FEED_IN_TARIFF: WattHourPrice = WattHourPrice(0.00007);

/// Leading part of the hand-made plan which fits the genome of the given length.
pub fn start_solution(len: usize) -> Candidate {
    Candidate::from(START_SOLUTION[..len].to_vec())
}
