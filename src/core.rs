pub mod appliance;
pub mod battery;
pub mod ev;
pub mod fitness;
pub mod genetic;
pub mod genome;
pub mod optimizer;
pub mod plan;
pub mod problem;
pub mod simulator;
pub mod step;
pub mod summary;
pub mod working_mode;

#[cfg(test)]
mod fixtures;
